//! RSI (Relative Strength Index) indicator.
//!
//! Two variants share the gain/loss split over consecutive closes:
//! - `calculate_rsi`: simple RSI. Average gain/loss is the plain mean over each
//!   window of `n` changes, recomputed per window.
//! - `calculate_rsi_wilder`: Wilder's smoothing,
//!   avg = (prev_avg * (n-1) + current) / n after a simple-mean seed.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! The value for the window of changes ending at change index i is stamped with
//! the time of bar i+1. Output length: len - n, or empty when len <= n.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, SeriesPoint};
use crate::domain::ohlcv::Candle;

pub const DEFAULT_PERIOD: usize = 14;

/// Relative strength substituted when the window has no losses in the simple
/// variant. RSI then reads 100 - 100/101 ≈ 99.0099, never 100.
pub const ZERO_LOSS_RS: f64 = 100.0;

fn split_changes(candles: &[Candle]) -> (Vec<f64>, Vec<f64>) {
    candles
        .windows(2)
        .map(|pair| {
            let change = pair[1].close - pair[0].close;
            let gain = if change > 0.0 { change } else { 0.0 };
            let loss = if change < 0.0 { -change } else { 0.0 };
            (gain, loss)
        })
        .unzip()
}

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}

pub fn calculate_rsi(candles: &[Candle], period: usize) -> IndicatorSeries {
    if period == 0 || candles.len() < 2 {
        return IndicatorSeries::empty(IndicatorType::Rsi(period));
    }

    let (gains, losses) = split_changes(candles);
    if gains.len() < period {
        return IndicatorSeries::empty(IndicatorType::Rsi(period));
    }

    let values = gains
        .windows(period)
        .zip(losses.windows(period))
        .enumerate()
        .map(|(start, (gain_window, loss_window))| {
            let end = start + period - 1;
            let avg_gain = gain_window.iter().sum::<f64>() / period as f64;
            let avg_loss = loss_window.iter().sum::<f64>() / period as f64;

            let rs = if avg_loss == 0.0 {
                ZERO_LOSS_RS
            } else {
                avg_gain / avg_loss
            };
            SeriesPoint::new(candles[end + 1].time, 100.0 - (100.0 / (1.0 + rs)))
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

/// Textbook RSI; a window without losses reads exactly 100.
pub fn calculate_rsi_wilder(candles: &[Candle], period: usize) -> IndicatorSeries {
    if period == 0 || candles.len() < 2 {
        return IndicatorSeries::empty(IndicatorType::RsiWilder(period));
    }

    let (gains, losses) = split_changes(candles);
    if gains.len() < period {
        return IndicatorSeries::empty(IndicatorType::RsiWilder(period));
    }

    let mut values = Vec::with_capacity(gains.len() - period + 1);
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    for i in (period - 1)..gains.len() {
        if i >= period {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        }
        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            rsi_from(avg_gain, avg_loss)
        };
        values.push(SeriesPoint::new(candles[i + 1].time, rsi));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::RsiWilder(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_candles(prices: &[f64]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle::new(1_000 + i as i64 * 60, close, close, close, close))
            .collect()
    }

    #[test]
    fn rsi_empty_candles() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_single_candle() {
        let candles = make_candles(&[100.0]);
        assert!(calculate_rsi(&candles, 14).is_empty());
    }

    #[test]
    fn rsi_zero_period() {
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        assert!(calculate_rsi(&candles, 0).is_empty());
    }

    #[test]
    fn rsi_length_and_alignment() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + (i % 5) as f64 * 2.0).collect();
        let candles = make_candles(&prices);
        let series = calculate_rsi(&candles, 14);

        // 15 bars → 14 changes → one full window
        assert_eq!(series.len(), 1);
        assert_eq!(series.values[0].time, candles[14].time);

        let series = calculate_rsi(&candles[..14], 14);
        assert!(series.is_empty());
    }

    #[test]
    fn rsi_all_gains_hits_sentinel_ceiling() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&make_candles(&prices), 14);

        let ceiling = 100.0 - 100.0 / 101.0;
        for point in &series.values {
            assert_relative_eq!(point.value, ceiling, epsilon = 1e-12);
            assert!(point.value < 100.0);
        }
        assert_relative_eq!(ceiling, 99.00990099009901, epsilon = 1e-12);
    }

    #[test]
    fn rsi_flat_series_uses_sentinel_too() {
        let series = calculate_rsi(&make_candles(&[50.0; 20]), 14);
        assert_eq!(series.len(), 6);
        for point in &series.values {
            assert!(point.value.is_finite());
            assert_relative_eq!(point.value, 100.0 - 100.0 / 101.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&make_candles(&prices), 14);
        assert_relative_eq!(series.values[0].value, 0.0);
    }

    #[test]
    fn rsi_known_calculation() {
        // changes +2, -1, +3 → avg gain 5/3, avg loss 1/3 → RS 5
        let series = calculate_rsi(&make_candles(&[10.0, 12.0, 11.0, 14.0]), 3);
        assert_eq!(series.len(), 1);
        assert_relative_eq!(series.values[0].value, 100.0 - 100.0 / 6.0, epsilon = 1e-10);
    }

    #[test]
    fn rsi_windows_are_not_smoothed() {
        // windows [+1,-1] and [-1,+1] both give RS 1
        let series = calculate_rsi(&make_candles(&[1.0, 2.0, 1.0, 2.0]), 2);
        assert_eq!(series.len(), 2);
        assert_relative_eq!(series.values[0].value, 50.0);
        assert_relative_eq!(series.values[1].value, 50.0);
    }

    #[test]
    fn rsi_in_range() {
        let prices: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let series = calculate_rsi(&make_candles(&prices), 14);

        for point in &series.values {
            assert!(point.value >= 0.0 && point.value <= 100.0, "RSI {} out of range", point.value);
        }
    }

    #[test]
    fn rsi_indicator_type() {
        let candles = make_candles(&[100.0]);
        assert_eq!(calculate_rsi(&candles, 14).indicator_type, IndicatorType::Rsi(14));
        assert_eq!(
            calculate_rsi_wilder(&candles, 14).indicator_type,
            IndicatorType::RsiWilder(14)
        );
    }

    #[test]
    fn rsi_wilder_seed_matches_simple() {
        let candles = make_candles(&[10.0, 12.0, 11.0, 14.0]);
        let simple = calculate_rsi(&candles, 3);
        let wilder = calculate_rsi_wilder(&candles, 3);

        assert_eq!(wilder.len(), simple.len());
        assert_relative_eq!(wilder.values[0].value, simple.values[0].value);
    }

    #[test]
    fn rsi_wilder_smoothing() {
        let series = calculate_rsi_wilder(&make_candles(&[10.0, 12.0, 11.0, 14.0, 13.0]), 3);

        // avg gain (5/3*2 + 0)/3 = 10/9, avg loss (1/3*2 + 1)/3 = 5/9 → RS 2
        assert_eq!(series.len(), 2);
        assert_relative_eq!(series.values[1].value, 100.0 - 100.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn rsi_wilder_all_gains_is_100() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi_wilder(&make_candles(&prices), 14);
        for point in &series.values {
            assert_relative_eq!(point.value, 100.0);
        }
    }
}
