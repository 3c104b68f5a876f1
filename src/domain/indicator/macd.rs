//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow), matched by timestamp
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line, colour-tagged by sign
//!
//! Default parameters: fast=12, slow=26, signal=9
//! The MACD line starts where the slow EMA starts (index slow-1); the signal
//! and histogram start signal-1 points later.

use std::collections::HashMap;

use crate::domain::indicator::{calculate_ema, ema_of_points, HistogramPoint, SeriesPoint};
use crate::domain::ohlcv::Candle;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdOutput {
    pub macd: Vec<SeriesPoint>,
    pub signal: Vec<SeriesPoint>,
    pub histogram: Vec<HistogramPoint>,
}

pub fn calculate_macd(
    candles: &[Candle],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdOutput {
    if candles.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return MacdOutput::default();
    }

    let ema_fast = calculate_ema(candles, fast);
    let ema_slow = calculate_ema(candles, slow);

    let fast_by_time: HashMap<i64, f64> =
        ema_fast.values.iter().map(|p| (p.time, p.value)).collect();

    let macd: Vec<SeriesPoint> = ema_slow
        .values
        .iter()
        .filter_map(|slow_point| {
            fast_by_time
                .get(&slow_point.time)
                .map(|fast_value| SeriesPoint::new(slow_point.time, fast_value - slow_point.value))
        })
        .collect();

    let signal = ema_of_points(&macd, signal_period);

    let macd_by_time: HashMap<i64, f64> = macd.iter().map(|p| (p.time, p.value)).collect();
    let histogram = signal
        .iter()
        .filter_map(|signal_point| {
            macd_by_time
                .get(&signal_point.time)
                .map(|line| HistogramPoint::new(signal_point.time, line - signal_point.value))
        })
        .collect();

    MacdOutput {
        macd,
        signal,
        histogram,
    }
}

pub fn calculate_macd_default(candles: &[Candle]) -> MacdOutput {
    calculate_macd(candles, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
