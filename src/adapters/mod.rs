//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_journal_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_journal_adapter;
