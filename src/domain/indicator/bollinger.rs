//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//! The multiplier is carried in hundredths so it stays non-negative and hashable.
//!
//! Default parameters: period=20, multiplier=2.0
//! All three bands start at index period-1 and have equal length.

use crate::domain::indicator::{calculate_sma, SeriesPoint};
use crate::domain::ohlcv::Candle;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<SeriesPoint>,
    pub middle: Vec<SeriesPoint>,
    pub lower: Vec<SeriesPoint>,
}

pub fn calculate_bollinger(
    candles: &[Candle],
    period: usize,
    stddev_mult_x100: u32,
) -> BollingerBands {
    let middle = calculate_sma(candles, period).values;
    if middle.is_empty() {
        return BollingerBands::default();
    }

    let mult = stddev_mult_x100 as f64 / 100.0;
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (window, mid) in candles.windows(period).zip(&middle) {
        let variance: f64 = window
            .iter()
            .map(|c| {
                let diff = c.close - mid.value;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;

        let stddev = variance.sqrt();
        upper.push(SeriesPoint::new(mid.time, mid.value + mult * stddev));
        lower.push(SeriesPoint::new(mid.time, mid.value - mult * stddev));
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
