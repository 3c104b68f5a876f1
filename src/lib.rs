//! alphamind: technical indicators, Heikin-Ashi candles and a synthetic FX
//! market feed, with mock trade execution and a trade journal.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], command-line front end in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
