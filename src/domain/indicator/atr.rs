//! Average True Range indicator.
//!
//! TR[i] = max(H[i]-L[i], |H[i]-C[i-1]|, |L[i]-C[i-1]|) for i >= 1.
//! - `calculate_atr`: plain mean of TR over each window of n values.
//! - `calculate_atr_wilder`: same seed, then ATR = (prev * (n-1) + TR) / n.
//!
//! A window of TR ending at TR index j is stamped with the time of bar j+1.
//! Output length: len - n, or empty when len <= n.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, SeriesPoint};
use crate::domain::ohlcv::Candle;

pub const DEFAULT_PERIOD: usize = 14;

fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .collect()
}

pub fn calculate_atr(candles: &[Candle], period: usize) -> IndicatorSeries {
    let tr_values = true_ranges(candles);
    if period == 0 || tr_values.len() < period {
        return IndicatorSeries::empty(IndicatorType::Atr(period));
    }

    let values = tr_values
        .windows(period)
        .enumerate()
        .map(|(start, window)| {
            let atr = window.iter().sum::<f64>() / period as f64;
            SeriesPoint::new(candles[start + period].time, atr)
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

pub fn calculate_atr_wilder(candles: &[Candle], period: usize) -> IndicatorSeries {
    let tr_values = true_ranges(candles);
    if period == 0 || tr_values.len() < period {
        return IndicatorSeries::empty(IndicatorType::AtrWilder(period));
    }

    let mut values = Vec::with_capacity(tr_values.len() - period + 1);
    let mut atr = tr_values[..period].iter().sum::<f64>() / period as f64;
    values.push(SeriesPoint::new(candles[period].time, atr));

    for (j, tr) in tr_values.iter().enumerate().skip(period) {
        atr = (atr * (period - 1) as f64 + tr) / period as f64;
        values.push(SeriesPoint::new(candles[j + 1].time, atr));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::AtrWilder(period),
        values,
    }
}
