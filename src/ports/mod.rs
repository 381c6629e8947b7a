//! Port traits for the external collaborators of the trading core.

pub mod config_port;
pub mod exchange_port;
pub mod market_data_port;
pub mod predictor_port;
