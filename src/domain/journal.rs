//! Trade journal records and their statistics.
//!
//! Entries serialize with camelCase keys and the trade side under `type`, so
//! an exported journal reads the same as the dashboard's local storage dump.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::AlphamindError;
use crate::domain::instrument::Symbol;
use crate::domain::trade::{profit_loss, Side};
use crate::ports::journal_port::JournalPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    Open,
    Closed,
    Cancelled,
}

impl JournalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalStatus::Open => "open",
            JournalStatus::Closed => "closed",
            JournalStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JournalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(JournalStatus::Open),
            "closed" => Ok(JournalStatus::Closed),
            "cancelled" => Ok(JournalStatus::Cancelled),
            other => Err(format!("unknown journal status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    /// Human-readable open time.
    pub date: String,
    /// Open time in unix milliseconds.
    pub timestamp: i64,
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: Side,
    pub entry_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    pub lot_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pips: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_percent: Option<f64>,
    pub layers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub status: JournalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
}

impl JournalEntry {
    /// Pip size for the entry's symbol string. Unknown symbols fall back to
    /// the JPY rule.
    pub fn pip_size(&self) -> f64 {
        match self.symbol.parse::<Symbol>() {
            Ok(symbol) => symbol.pip_size(),
            Err(_) if self.symbol.to_ascii_uppercase().contains("JPY") => 0.01,
            Err(_) => 0.0001,
        }
    }
}

/// Partial update of a journal entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JournalUpdate {
    pub exit_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub pips: Option<f64>,
    pub profit: Option<f64>,
    pub profit_percent: Option<f64>,
    pub layers: Option<u32>,
    pub duration: Option<String>,
    pub strategy: Option<String>,
    pub status: Option<JournalStatus>,
    pub notes: Option<String>,
    pub broker: Option<String>,
}

impl JournalUpdate {
    /// The update that closes `entry` at `exit_price`: realised profit, signed
    /// pips, and the time held.
    pub fn close(entry: &JournalEntry, exit_price: f64, now: DateTime<Utc>) -> Self {
        let profit = profit_loss(entry.entry_price, exit_price, entry.lot_size, entry.side);
        let price_move = match entry.side {
            Side::Buy => exit_price - entry.entry_price,
            Side::Sell => entry.entry_price - exit_price,
        };
        let pips = (price_move / entry.pip_size() * 10.0).round() / 10.0;
        let held_ms = now.timestamp_millis() - entry.timestamp;

        Self {
            exit_price: Some(exit_price),
            pips: Some(pips),
            profit: Some(profit),
            duration: Some(format_duration(held_ms)),
            status: Some(JournalStatus::Closed),
            ..Self::default()
        }
    }

    pub fn apply(&self, entry: &mut JournalEntry) {
        fn set<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut entry.exit_price, &self.exit_price);
        set(&mut entry.stop_loss, &self.stop_loss);
        set(&mut entry.take_profit, &self.take_profit);
        set(&mut entry.pips, &self.pips);
        set(&mut entry.profit, &self.profit);
        set(&mut entry.profit_percent, &self.profit_percent);
        set(&mut entry.duration, &self.duration);
        set(&mut entry.strategy, &self.strategy);
        set(&mut entry.notes, &self.notes);
        set(&mut entry.broker, &self.broker);
        if let Some(layers) = self.layers {
            entry.layers = layers;
        }
        if let Some(status) = self.status {
            entry.status = status;
        }
    }
}

fn format_duration(ms: i64) -> String {
    let minutes = ms.max(0) / 60_000;
    let (days, hours, minutes) = (minutes / 1440, minutes / 60 % 24, minutes % 60);
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage, 0..=100.
    pub win_rate: f64,
    pub total_profit: f64,
    pub avg_win: f64,
    /// Positive magnitude of the average losing trade.
    pub avg_loss: f64,
    /// Gross wins over gross losses; 0 when there are no losses.
    pub profit_factor: f64,
    pub largest_win: f64,
    /// Most negative profit, or 0 when nothing lost.
    pub largest_loss: f64,
}

impl JournalStats {
    /// Statistics over closed entries that carry a profit. Open, cancelled
    /// and unpriced entries are ignored; break-even trades count toward the
    /// total but neither side.
    pub fn compute(entries: &[JournalEntry]) -> Self {
        let profits: Vec<f64> = entries
            .iter()
            .filter(|e| e.status == JournalStatus::Closed)
            .filter_map(|e| e.profit)
            .collect();

        if profits.is_empty() {
            return Self::default();
        }

        let wins: Vec<f64> = profits.iter().copied().filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = profits.iter().copied().filter(|p| *p < 0.0).collect();

        let gross_win: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum::<f64>().abs();

        Self {
            total_trades: profits.len(),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate: wins.len() as f64 / profits.len() as f64 * 100.0,
            total_profit: profits.iter().sum(),
            avg_win: if wins.is_empty() {
                0.0
            } else {
                gross_win / wins.len() as f64
            },
            avg_loss: if losses.is_empty() {
                0.0
            } else {
                gross_loss / losses.len() as f64
            },
            profit_factor: if gross_loss > 0.0 {
                gross_win / gross_loss
            } else {
                0.0
            },
            largest_win: wins.iter().copied().fold(0.0, f64::max),
            largest_loss: losses.iter().copied().fold(0.0, f64::min),
        }
    }
}

pub fn export_json(entries: &[JournalEntry]) -> Result<String, AlphamindError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Parses an exported journal. Anything other than a JSON array of entries
/// is rejected.
pub fn import_json(data: &str) -> Result<Vec<JournalEntry>, AlphamindError> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    if !value.is_array() {
        return Err(AlphamindError::Serialization {
            reason: "journal import expects a JSON array".into(),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// Replaces the store's contents with an imported journal. On error the store
/// is left unchanged.
pub fn import_into(store: &dyn JournalPort, data: &str) -> Result<usize, AlphamindError> {
    let entries = import_json(data)?;
    store.replace_all(&entries)?;
    log::info!("imported {} journal entries", entries.len());
    Ok(entries.len())
}
