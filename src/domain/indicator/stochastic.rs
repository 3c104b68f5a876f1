//! Stochastic oscillator.
//!
//! Raw %K[i] = 100 * (C[i] - LL) / (HH - LL) over the last `period` bars,
//! or `FLAT_RANGE_K` when HH == LL.
//! %K = SMA(raw %K, smooth_k), %D = SMA(%K, smooth_d).
//!
//! Default parameters: period=14, smooth_k=3, smooth_d=3
//! %K starts at index (period-1)+(smooth_k-1); %D a further smooth_d-1 later.

use crate::domain::indicator::{sma_of_points, SeriesPoint};
use crate::domain::ohlcv::Candle;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_SMOOTH_K: usize = 3;
pub const DEFAULT_SMOOTH_D: usize = 3;

/// Raw %K reported for a window whose highest high equals its lowest low.
pub const FLAT_RANGE_K: f64 = 50.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticOutput {
    pub k: Vec<SeriesPoint>,
    pub d: Vec<SeriesPoint>,
}

fn raw_k(candles: &[Candle], period: usize) -> Vec<SeriesPoint> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }

    candles
        .windows(period)
        .map(|window| {
            let highest = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let last = &window[period - 1];

            let k = if highest == lowest {
                FLAT_RANGE_K
            } else {
                (last.close - lowest) / (highest - lowest) * 100.0
            };
            SeriesPoint::new(last.time, k)
        })
        .collect()
}

pub fn calculate_stochastic(
    candles: &[Candle],
    period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> StochasticOutput {
    let raw = raw_k(candles, period);
    let k = sma_of_points(&raw, smooth_k);
    let d = sma_of_points(&k, smooth_d);

    StochasticOutput { k, d }
}
