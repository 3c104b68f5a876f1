//! Tradable FX pairs and chart timeframes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    #[serde(rename = "EUR/USD")]
    EurUsd,
    #[serde(rename = "GBP/USD")]
    GbpUsd,
    #[serde(rename = "USD/JPY")]
    UsdJpy,
    #[serde(rename = "AUD/USD")]
    AudUsd,
    #[serde(rename = "USD/CHF")]
    UsdChf,
    #[serde(rename = "EUR/JPY")]
    EurJpy,
    #[serde(rename = "GBP/JPY")]
    GbpJpy,
    #[serde(rename = "EUR/GBP")]
    EurGbp,
}

impl Symbol {
    pub const ALL: [Symbol; 8] = [
        Symbol::EurUsd,
        Symbol::GbpUsd,
        Symbol::UsdJpy,
        Symbol::AudUsd,
        Symbol::UsdChf,
        Symbol::EurJpy,
        Symbol::GbpJpy,
        Symbol::EurGbp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::EurUsd => "EUR/USD",
            Symbol::GbpUsd => "GBP/USD",
            Symbol::UsdJpy => "USD/JPY",
            Symbol::AudUsd => "AUD/USD",
            Symbol::UsdChf => "USD/CHF",
            Symbol::EurJpy => "EUR/JPY",
            Symbol::GbpJpy => "GBP/JPY",
            Symbol::EurGbp => "EUR/GBP",
        }
    }

    /// Starting mid price for a fresh simulation.
    pub fn base_rate(&self) -> f64 {
        match self {
            Symbol::EurUsd => 1.0850,
            Symbol::GbpUsd => 1.2650,
            Symbol::UsdJpy => 149.50,
            Symbol::AudUsd => 0.6550,
            Symbol::UsdChf => 0.8850,
            Symbol::EurJpy => 162.20,
            Symbol::GbpJpy => 189.10,
            Symbol::EurGbp => 0.8580,
        }
    }

    /// Per-bar price noise scale used by the generator.
    pub fn volatility(&self) -> f64 {
        match self {
            Symbol::EurUsd => 0.0005,
            Symbol::GbpUsd => 0.0008,
            Symbol::UsdJpy => 0.05,
            Symbol::AudUsd => 0.0006,
            Symbol::UsdChf => 0.0004,
            Symbol::EurJpy => 0.08,
            Symbol::GbpJpy => 0.10,
            Symbol::EurGbp => 0.0004,
        }
    }

    pub fn is_jpy(&self) -> bool {
        self.as_str().contains("JPY")
    }

    /// Decimal places prices of this pair are quoted with.
    pub fn price_decimals(&self) -> i32 {
        if self.is_jpy() { 2 } else { 4 }
    }

    pub fn pip_size(&self) -> f64 {
        if self.is_jpy() { 0.01 } else { 0.0001 }
    }

    /// Rounds a price to the pair's quoting precision.
    pub fn round_price(&self, price: f64) -> f64 {
        let scale = 10f64.powi(self.price_decimals());
        (price * scale).round() / scale
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = String;

    /// Accepts `EUR/USD`, `eurusd` or `EUR_USD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_uppercase();
        Symbol::ALL
            .into_iter()
            .find(|sym| sym.as_str().replace('/', "") == wanted)
            .ok_or_else(|| format!("unknown symbol '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1D")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1D",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1 Minute",
            Timeframe::M5 => "5 Minutes",
            Timeframe::M15 => "15 Minutes",
            Timeframe::H1 => "1 Hour",
            Timeframe::H4 => "4 Hours",
            Timeframe::D1 => "1 Day",
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.minutes() * 60 * 1000
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown timeframe '{}'", s))
    }
}
