//! Configuration validation.
//!
//! Turns raw `[generator]`, `[indicators]`, `[journal]` and `[account]`
//! lookups into typed settings, rejecting out-of-range values with
//! `ConfigInvalid`.

use crate::domain::error::AlphamindError;
use crate::domain::indicator::IndicatorType;
use crate::domain::market_data::GeneratorConfig;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_BALANCE: f64 = 10_000.0;
pub const DEFAULT_JOURNAL_PATH: &str = "alphamind-journal.json";
pub const DEFAULT_SQLITE_JOURNAL_PATH: &str = "alphamind-journal.db";
pub const DEFAULT_POOL_SIZE: u32 = 4;
pub const DEFAULT_INDICATORS: &str = "SMA(20), RSI(14), MACD(12,26,9), BOLLINGER(20,2)";

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AlphamindError {
    AlphamindError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn unit_interval(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, AlphamindError> {
    let value = config.get_double("generator", key, default);
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid("generator", key, format!("{} must be between 0 and 1", key)));
    }
    Ok(value)
}

fn non_negative(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, AlphamindError> {
    let value = config.get_double("generator", key, default);
    if !(value >= 0.0) {
        return Err(invalid("generator", key, format!("{} must be non-negative", key)));
    }
    Ok(value)
}

pub fn generator_config(config: &dyn ConfigPort) -> Result<GeneratorConfig, AlphamindError> {
    let defaults = GeneratorConfig::default();

    let history_count = config.get_int("generator", "history_count", defaults.history_count as i64);
    if history_count < 0 {
        return Err(invalid(
            "generator",
            "history_count",
            "history_count must be non-negative",
        ));
    }

    Ok(GeneratorConfig {
        drift_center: unit_interval(config, "drift_center", defaults.drift_center)?,
        wick_factor: non_negative(config, "wick_factor", defaults.wick_factor)?,
        tick_factor: non_negative(config, "tick_factor", defaults.tick_factor)?,
        new_candle_threshold: unit_interval(
            config,
            "new_candle_threshold",
            defaults.new_candle_threshold,
        )?,
        history_count: history_count as usize,
    })
}

/// `[generator] seed`, if set. A value that is not an unsigned integer is
/// rejected rather than ignored.
pub fn generator_seed(config: &dyn ConfigPort) -> Result<Option<u64>, AlphamindError> {
    match config.get_string("generator", "seed") {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid("generator", "seed", "seed must be an unsigned integer")),
    }
}

/// Splits a comma list of indicator specs, ignoring commas inside
/// parentheses: `SMA(20), MACD(12,26,9)` is two items.
pub fn split_indicator_list(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in list.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(list[start..].trim());
    items.retain(|s| !s.is_empty());
    items
}

pub fn default_indicators(config: &dyn ConfigPort) -> Result<Vec<IndicatorType>, AlphamindError> {
    let list = config
        .get_string("indicators", "default")
        .unwrap_or_else(|| DEFAULT_INDICATORS.to_string());

    split_indicator_list(&list)
        .into_iter()
        .map(|spec| {
            spec.parse::<IndicatorType>()
                .map_err(|e| invalid("indicators", "default", format!("{}: {}", spec, e)))
        })
        .collect()
}

pub fn account_balance(config: &dyn ConfigPort) -> Result<f64, AlphamindError> {
    let value = config.get_double("account", "balance", DEFAULT_BALANCE);
    if !(value > 0.0) {
        return Err(invalid("account", "balance", "balance must be positive"));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalSettings {
    pub backend: JournalBackend,
    pub path: String,
    /// Connection pool size; only the sqlite backend pools.
    pub pool_size: u32,
}

pub fn journal_settings(config: &dyn ConfigPort) -> Result<JournalSettings, AlphamindError> {
    let backend = match config
        .get_string("journal", "backend")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        None | Some("json") => JournalBackend::Json,
        Some("sqlite") if cfg!(feature = "sqlite") => JournalBackend::Sqlite,
        Some("sqlite") => {
            return Err(invalid(
                "journal",
                "backend",
                "sqlite support was not compiled in",
            ))
        }
        Some(other) => {
            return Err(invalid(
                "journal",
                "backend",
                format!("unknown backend '{}', expected json or sqlite", other),
            ))
        }
    };

    let path = match config.get_string("journal", "path") {
        Some(p) if !p.trim().is_empty() => p.trim().to_string(),
        Some(_) => {
            return Err(invalid("journal", "path", "path must not be empty"));
        }
        None => match backend {
            JournalBackend::Json => DEFAULT_JOURNAL_PATH.to_string(),
            JournalBackend::Sqlite => DEFAULT_SQLITE_JOURNAL_PATH.to_string(),
        },
    };

    let pool_size = config.get_int("journal", "pool_size", DEFAULT_POOL_SIZE as i64);
    if !(1..=64).contains(&pool_size) {
        return Err(invalid(
            "journal",
            "pool_size",
            "pool_size must be between 1 and 64",
        ));
    }

    Ok(JournalSettings {
        backend,
        path,
        pool_size: pool_size as u32,
    })
}
