//! Order validation, sizing, P/L maths and mock execution.
//!
//! All sizes are in standard lots of `CONTRACT_SIZE` units of the base
//! currency, traded at 1:`LEVERAGE`.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::AlphamindError;
use crate::domain::instrument::Symbol;
use crate::domain::journal::{JournalEntry, JournalStatus};
use crate::domain::market_data::MarketContext;
use crate::ports::journal_port::JournalPort;

pub const MIN_LOT_SIZE: f64 = 0.01;
pub const MAX_LOT_SIZE: f64 = 10.0;
pub const CONTRACT_SIZE: f64 = 100_000.0;
pub const LEVERAGE: f64 = 100.0;
/// A single order may tie up at most this fraction of the balance as margin.
pub const MAX_MARGIN_FRACTION: f64 = 0.5;

const TRADE_ID_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "long" => Ok(Side::Buy),
            "sell" | "short" => Ok(Side::Sell),
            other => Err(format!("unknown side '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeParams {
    pub symbol: Symbol,
    pub side: Side,
    pub lot_size: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

fn below_or_above(side: &Side, for_stop: bool) -> &'static str {
    match (side, for_stop) {
        (Side::Buy, true) | (Side::Sell, false) => "below",
        (Side::Sell, true) | (Side::Buy, false) => "above",
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeRejection {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("minimum lot size is {}", MIN_LOT_SIZE)]
    LotTooSmall,

    #[error("maximum lot size is {}", MAX_LOT_SIZE)]
    LotTooLarge,

    #[error("stop loss must be {} entry price for {} orders", below_or_above(.0, true), .0)]
    StopLossWrongSide(Side),

    #[error("take profit must be {} entry price for {} orders", below_or_above(.0, false), .0)]
    TakeProfitWrongSide(Side),

    #[error("insufficient margin: {required:.2} required, {available:.2} allowed")]
    InsufficientMargin { required: f64, available: f64 },
}

pub fn required_margin(lot_size: f64, price: f64) -> f64 {
    lot_size * CONTRACT_SIZE * price / LEVERAGE
}

/// Checks an order against the current price and account balance, reporting
/// every violation rather than the first.
pub fn validate_trade(
    params: &TradeParams,
    current_price: f64,
    balance: f64,
) -> Result<(), Vec<TradeRejection>> {
    let mut rejections = Vec::new();

    if !params.lot_size.is_finite() {
        rejections.push(TradeRejection::NotFinite("lot size"));
    } else if params.lot_size < MIN_LOT_SIZE {
        rejections.push(TradeRejection::LotTooSmall);
    } else if params.lot_size > MAX_LOT_SIZE {
        rejections.push(TradeRejection::LotTooLarge);
    }

    match params.stop_loss {
        Some(sl) if !sl.is_finite() => rejections.push(TradeRejection::NotFinite("stop loss")),
        Some(sl) => {
            let wrong = match params.side {
                Side::Buy => sl >= current_price,
                Side::Sell => sl <= current_price,
            };
            if wrong {
                rejections.push(TradeRejection::StopLossWrongSide(params.side));
            }
        }
        None => {}
    }

    match params.take_profit {
        Some(tp) if !tp.is_finite() => rejections.push(TradeRejection::NotFinite("take profit")),
        Some(tp) => {
            let wrong = match params.side {
                Side::Buy => tp <= current_price,
                Side::Sell => tp >= current_price,
            };
            if wrong {
                rejections.push(TradeRejection::TakeProfitWrongSide(params.side));
            }
        }
        None => {}
    }

    let required = required_margin(params.lot_size, current_price);
    let available = balance * MAX_MARGIN_FRACTION;
    if params.lot_size.is_finite() && required > available {
        rejections.push(TradeRejection::InsufficientMargin {
            required,
            available,
        });
    }

    if rejections.is_empty() {
        Ok(())
    } else {
        Err(rejections)
    }
}

/// Lot size that risks `risk_percent` of `balance` over a stop of
/// `stop_loss_pips`. Capped at `MAX_LOT_SIZE`, rounded to 2 decimals.
/// A non-positive stop distance sizes to 0.
pub fn position_size(symbol: Symbol, risk_percent: f64, balance: f64, stop_loss_pips: f64) -> f64 {
    if stop_loss_pips <= 0.0 {
        return 0.0;
    }
    let risk_amount = balance * (risk_percent / 100.0);
    let lots = risk_amount / (stop_loss_pips * symbol.pip_size() * CONTRACT_SIZE);
    (lots.min(MAX_LOT_SIZE) * 100.0).round() / 100.0
}

pub fn profit_loss(entry_price: f64, current_price: f64, lot_size: f64, side: Side) -> f64 {
    let diff = match side {
        Side::Buy => current_price - entry_price,
        Side::Sell => entry_price - current_price,
    };
    diff * lot_size * CONTRACT_SIZE
}

/// Reward distance over risk distance; 0 when the stop sits on the entry.
pub fn risk_reward(entry_price: f64, stop_loss: f64, take_profit: f64) -> f64 {
    let risk = (entry_price - stop_loss).abs();
    let reward = (take_profit - entry_price).abs();
    if risk == 0.0 {
        return 0.0;
    }
    reward / risk
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: String,
    pub symbol: Symbol,
    pub side: Side,
    pub lot_size: f64,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub open_time: DateTime<Utc>,
}

impl Trade {
    pub fn journal_entry(&self) -> JournalEntry {
        JournalEntry {
            id: self.id.clone(),
            date: self.open_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            timestamp: self.open_time.timestamp_millis(),
            symbol: self.symbol.to_string(),
            side: self.side,
            entry_price: self.entry_price,
            exit_price: None,
            lot_size: self.lot_size,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            pips: None,
            profit: None,
            profit_percent: None,
            layers: 1,
            duration: None,
            strategy: None,
            status: JournalStatus::Open,
            notes: None,
            broker: None,
        }
    }
}

/// `trade_<unix ms>_<9 lowercase alphanumerics>`
pub fn next_trade_id<R: Rng>(rng: &mut R, now_ms: i64) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(TRADE_ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("trade_{}_{}", now_ms, suffix)
}

/// Fills an order at the context's current price and records it in the
/// journal as an open, single-layer entry.
pub fn execute_trade(
    ctx: &mut MarketContext,
    params: &TradeParams,
    balance: f64,
    journal: &dyn JournalPort,
    now: DateTime<Utc>,
) -> Result<Trade, AlphamindError> {
    let entry_price = ctx.current_price(params.symbol);
    validate_trade(params, entry_price, balance).map_err(|rejections| {
        AlphamindError::TradeRejected {
            reasons: rejections.iter().map(|r| r.to_string()).collect(),
        }
    })?;

    let trade = Trade {
        id: next_trade_id(ctx.rng(), now.timestamp_millis()),
        symbol: params.symbol,
        side: params.side,
        lot_size: params.lot_size,
        entry_price,
        stop_loss: params.stop_loss,
        take_profit: params.take_profit,
        open_time: now,
    };

    journal.append(&trade.journal_entry())?;
    log::info!(
        "opened {} {} {} lots at {}",
        trade.side,
        trade.symbol,
        trade.lot_size,
        trade.entry_price
    );
    Ok(trade)
}
