//! Concrete adapter implementations for ports.

pub mod credential_store;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod simulated_market;
