//! Core domain types and logic.

pub mod ohlcv;
pub mod instrument;
pub mod indicator;
pub mod indicator_helpers;
pub mod heikin_ashi;
pub mod market_data;
pub mod trade;
pub mod journal;
pub mod config_validation;
pub mod error;
