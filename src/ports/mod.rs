//! Port traits the domain talks to.

pub mod candle_port;
pub mod config_port;
pub mod journal_port;
