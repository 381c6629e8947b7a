//! Concrete adapter implementations for ports.

pub mod csv_feed;
pub mod csv_predictor;
pub mod file_config_adapter;
pub mod paper_gateway;
