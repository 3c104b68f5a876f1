//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), emitted from index n-1 onward.
//! Output length: len - n + 1, or empty when len < n or n == 0.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, SeriesPoint};
use crate::domain::ohlcv::Candle;

pub fn calculate_sma(candles: &[Candle], period: usize) -> IndicatorSeries {
    let closes: Vec<SeriesPoint> = candles
        .iter()
        .map(|c| SeriesPoint::new(c.time, c.close))
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: sma_of_points(&closes, period),
    }
}

/// SMA over an already-derived series, keeping each window's last timestamp.
pub fn sma_of_points(points: &[SeriesPoint], period: usize) -> Vec<SeriesPoint> {
    if period == 0 || points.len() < period {
        return Vec::new();
    }

    points
        .windows(period)
        .map(|window| {
            let sum: f64 = window.iter().map(|p| p.value).sum();
            SeriesPoint::new(window[period - 1].time, sum / period as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_candles(prices: &[f64]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle::new(i as i64, close, close, close, close))
            .collect()
    }

    #[test]
    fn sma_length_and_alignment() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&candles, 3);

        assert_eq!(series.len(), 3);
        assert_eq!(series.values[0].time, 2);
        assert_eq!(series.values[2].time, 4);
    }

    #[test]
    fn sma_values() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&candles, 3);

        assert_relative_eq!(series.values[0].value, 20.0);
        assert_relative_eq!(series.values[1].value, 30.0);
        assert_relative_eq!(series.values[2].value, 40.0);
    }

    #[test]
    fn sma_period_1_is_identity() {
        let candles = make_candles(&[1.5, 2.5, 3.5]);
        let series = calculate_sma(&candles, 1);

        let values: Vec<f64> = series.values.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn sma_exact_window() {
        let candles = make_candles(&[2.0, 4.0, 6.0]);
        let series = calculate_sma(&candles, 3);

        assert_eq!(series.len(), 1);
        assert_relative_eq!(series.values[0].value, 4.0);
    }

    #[test]
    fn sma_insufficient_data() {
        let candles = make_candles(&[10.0, 20.0]);
        assert!(calculate_sma(&candles, 3).is_empty());
    }

    #[test]
    fn sma_period_0() {
        let candles = make_candles(&[10.0, 20.0]);
        assert!(calculate_sma(&candles, 0).is_empty());
    }

    #[test]
    fn sma_empty_candles() {
        assert!(calculate_sma(&[], 3).is_empty());
    }

    #[test]
    fn sma_indicator_type() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        assert_eq!(calculate_sma(&candles, 5).indicator_type, IndicatorType::Sma(5));
    }

    #[test]
    fn sma_of_points_keeps_source_times() {
        let points = vec![
            SeriesPoint::new(100, 1.0),
            SeriesPoint::new(200, 3.0),
            SeriesPoint::new(300, 5.0),
        ];
        let out = sma_of_points(&points, 2);
        assert_eq!(out, vec![SeriesPoint::new(200, 2.0), SeriesPoint::new(300, 4.0)]);
    }
}
