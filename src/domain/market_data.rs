//! Synthetic OHLCV market data.
//!
//! A `MarketContext` owns everything the generator mutates: the last simulated
//! price per symbol and the random source. Two contexts never share state, and
//! a context built with `with_seed` replays the same series.
//!
//! Each simulated bar is a biased random walk step:
//!   drift = (r - drift_center) * vol
//!   close = open + drift + (r - 0.5) * vol
//!   high  = max(open, close) + r * vol * wick_factor
//!   low   = min(open, close) - r * vol * wick_factor
//! where every `r` is a fresh uniform draw in [0, 1). Prices are rounded to the
//! pair's precision on output; rounding is monotonic so high/low still bound
//! the body.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::instrument::{Symbol, Timeframe};
use crate::domain::ohlcv::Candle;

/// Centre of the drift draw. Values below 0.5 bias the walk upward.
pub const DEFAULT_DRIFT_CENTER: f64 = 0.48;
pub const DEFAULT_WICK_FACTOR: f64 = 0.5;
pub const DEFAULT_TICK_FACTOR: f64 = 0.3;
/// A feed tick opens a new candle when its draw exceeds this threshold.
pub const DEFAULT_NEW_CANDLE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_HISTORY_COUNT: usize = 200;

const VOLUME_BASE: f64 = 500.0;
const VOLUME_RANGE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub drift_center: f64,
    pub wick_factor: f64,
    pub tick_factor: f64,
    pub new_candle_threshold: f64,
    pub history_count: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            drift_center: DEFAULT_DRIFT_CENTER,
            wick_factor: DEFAULT_WICK_FACTOR,
            tick_factor: DEFAULT_TICK_FACTOR,
            new_candle_threshold: DEFAULT_NEW_CANDLE_THRESHOLD,
            history_count: DEFAULT_HISTORY_COUNT,
        }
    }
}

/// Outcome of one live-feed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedUpdate {
    /// The in-progress candle moved; replaces the previous last candle.
    Updated(Candle),
    /// The previous candle completed; append this one.
    NewCandle(Candle),
}

impl FeedUpdate {
    pub fn candle(&self) -> &Candle {
        match self {
            FeedUpdate::Updated(c) | FeedUpdate::NewCandle(c) => c,
        }
    }

    pub fn is_new_candle(&self) -> bool {
        matches!(self, FeedUpdate::NewCandle(_))
    }

    /// Applies the update to a candle series held by the caller.
    pub fn apply_to(&self, series: &mut Vec<Candle>) {
        match *self {
            FeedUpdate::Updated(c) => match series.last_mut() {
                Some(last) => *last = c,
                None => series.push(c),
            },
            FeedUpdate::NewCandle(c) => series.push(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
    pub spread: f64,
}

pub struct MarketContext {
    config: GeneratorConfig,
    prices: HashMap<Symbol, f64>,
    rng: StdRng,
}

struct BarDraw {
    close: f64,
    high: f64,
    low: f64,
    volume: f64,
}

impl MarketContext {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: GeneratorConfig, rng: StdRng) -> Self {
        let prices = Symbol::ALL.iter().map(|s| (*s, s.base_rate())).collect();
        Self { config, prices, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Latest simulated (unrounded) mid price, falling back to the base rate.
    pub fn current_price(&self, symbol: Symbol) -> f64 {
        self.prices
            .get(&symbol)
            .copied()
            .unwrap_or_else(|| symbol.base_rate())
    }

    pub fn set_price(&mut self, symbol: Symbol, price: f64) {
        self.prices.insert(symbol, price);
    }

    pub fn bid_ask(&self, symbol: Symbol) -> Quote {
        let mid = self.current_price(symbol);
        let spread = if symbol.is_jpy() { 0.02 } else { 0.0002 };
        Quote {
            bid: symbol.round_price(mid - spread / 2.0),
            ask: symbol.round_price(mid + spread / 2.0),
            spread,
        }
    }

    fn draw_bar(&mut self, symbol: Symbol, open: f64) -> BarDraw {
        let vol = symbol.volatility();
        let drift = (self.rng.r#gen::<f64>() - self.config.drift_center) * vol;
        let close = open + drift + (self.rng.r#gen::<f64>() - 0.5) * vol;
        let high = open.max(close) + self.rng.r#gen::<f64>() * vol * self.config.wick_factor;
        let low = open.min(close) - self.rng.r#gen::<f64>() * vol * self.config.wick_factor;
        let volume = (self.rng.r#gen::<f64>() * VOLUME_RANGE + VOLUME_BASE).round();
        BarDraw {
            close,
            high,
            low,
            volume,
        }
    }

    fn rounded(symbol: Symbol, time: i64, open: f64, bar: &BarDraw) -> Candle {
        Candle::new(
            time,
            symbol.round_price(open),
            symbol.round_price(bar.high),
            symbol.round_price(bar.low),
            symbol.round_price(bar.close),
        )
        .with_volume(bar.volume)
    }

    /// Generates `count` completed bars ending one interval before `now`.
    /// The walk starts from the pair's base rate; afterwards the context's
    /// current price is the last unrounded close.
    pub fn generate_historical(
        &mut self,
        symbol: Symbol,
        timeframe: Timeframe,
        count: usize,
        now: DateTime<Utc>,
    ) -> Vec<Candle> {
        let interval_ms = timeframe.interval_ms();
        let now_ms = now.timestamp_millis();
        let mut price = symbol.base_rate();
        let mut candles = Vec::with_capacity(count);

        for k in (1..=count as i64).rev() {
            let time = (now_ms - k * interval_ms).div_euclid(1000);
            let open = price;
            let bar = self.draw_bar(symbol, open);
            candles.push(Self::rounded(symbol, time, open, &bar));
            price = bar.close;
        }

        self.prices.insert(symbol, price);
        log::debug!(
            "generated {} {} candles for {}, last price {}",
            candles.len(),
            timeframe,
            symbol,
            price
        );
        candles
    }

    /// A completed bar following `last`, opening at its close.
    pub fn next_candle(&mut self, symbol: Symbol, last: &Candle, timeframe: Timeframe) -> Candle {
        let open = last.close;
        let bar = self.draw_bar(symbol, open);
        self.prices.insert(symbol, bar.close);

        let time = last.time + timeframe.interval_ms() / 1000;
        Self::rounded(symbol, time, open, &bar)
    }

    /// Moves the close of an in-progress bar and widens its high/low to
    /// include it. Time, open and volume are kept.
    pub fn update_candle(&mut self, symbol: Symbol, current: &Candle) -> Candle {
        let vol = symbol.volatility();
        let delta = (self.rng.r#gen::<f64>() - 0.5) * vol * self.config.tick_factor;
        let close = current.close + delta;
        let high = current.high.max(close);
        let low = current.low.min(close);
        self.prices.insert(symbol, close);

        Candle {
            close: symbol.round_price(close),
            high: symbol.round_price(high),
            low: symbol.round_price(low),
            ..*current
        }
    }

    /// One live-feed step: either completes `last` and opens a new bar or
    /// updates `last` in place.
    pub fn tick(&mut self, symbol: Symbol, last: &Candle, timeframe: Timeframe) -> FeedUpdate {
        if self.rng.r#gen::<f64>() > self.config.new_candle_threshold {
            FeedUpdate::NewCandle(self.next_candle(symbol, last, timeframe))
        } else {
            FeedUpdate::Updated(self.update_candle(symbol, last))
        }
    }
}
