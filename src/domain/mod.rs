//! Core domain types and the trading decision pipeline.

pub mod account;
pub mod config_validation;
pub mod controller;
pub mod error;
pub mod indicator;
pub mod ladder;
pub mod ohlcv;
pub mod risk;
pub mod signal;
pub mod sizing;
pub mod snapshot;
