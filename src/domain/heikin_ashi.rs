//! Heikin-Ashi candle transform.
//!
//! HA-Close = (O + H + L + C) / 4
//! HA-Open  = (prev HA-Open + prev HA-Close) / 2, or (O + C) / 2 for the first bar
//! HA-High  = max(H, HA-Open, HA-Close), the raw high for the first bar
//! HA-Low   = min(L, HA-Open, HA-Close), the raw low for the first bar
//!
//! Each candle depends on the previous HA candle, so the series is built
//! strictly left to right.

use serde::Serialize;

use crate::domain::ohlcv::Candle;

/// A body larger than this fraction of the candle's range marks a strong trend.
pub const STRONG_TREND_BODY_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeikinAshiCandle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl HeikinAshiCandle {
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Body exceeds `STRONG_TREND_BODY_RATIO` of the range. A zero-range
    /// candle is never a strong trend.
    pub fn has_strong_trend(&self) -> bool {
        let body = (self.close - self.open).abs();
        let total_range = self.high - self.low;
        if total_range == 0.0 {
            return false;
        }
        body / total_range > STRONG_TREND_BODY_RATIO
    }
}

pub fn convert_to_heikin_ashi(candles: &[Candle]) -> Vec<HeikinAshiCandle> {
    let Some(first) = candles.first() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(candles.len());
    let mut prev = HeikinAshiCandle {
        time: first.time,
        open: (first.open + first.close) / 2.0,
        high: first.high,
        low: first.low,
        close: first.average_price(),
    };
    out.push(prev);

    for candle in &candles[1..] {
        let close = candle.average_price();
        let open = (prev.open + prev.close) / 2.0;
        prev = HeikinAshiCandle {
            time: candle.time,
            open,
            high: candle.high.max(open).max(close),
            low: candle.low.min(open).min(close),
            close,
        };
        out.push(prev);
    }

    out
}
