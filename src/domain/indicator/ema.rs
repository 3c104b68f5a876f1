//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes (emitted at index n-1),
//! then EMA[i] = (C[i] - EMA[i-1]) * k + EMA[i-1].
//! Output length: len - n + 1, or empty when len < n or n == 0.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, SeriesPoint};
use crate::domain::ohlcv::Candle;

pub fn calculate_ema(candles: &[Candle], period: usize) -> IndicatorSeries {
    let closes: Vec<SeriesPoint> = candles
        .iter()
        .map(|c| SeriesPoint::new(c.time, c.close))
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values: ema_of_points(&closes, period),
    }
}

/// EMA over an already-derived series (used for the MACD signal line).
pub fn ema_of_points(points: &[SeriesPoint], period: usize) -> Vec<SeriesPoint> {
    if period == 0 || points.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(points.len() - period + 1);

    let seed: f64 = points[..period].iter().map(|p| p.value).sum::<f64>() / period as f64;
    let mut ema = seed;
    values.push(SeriesPoint::new(points[period - 1].time, ema));

    for point in &points[period..] {
        ema = (point.value - ema) * k + ema;
        values.push(SeriesPoint::new(point.time, ema));
    }

    values
}
