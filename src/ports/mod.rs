//! Port traits: the seams between the domain and its collaborators.

pub mod auth_port;
pub mod config_port;
pub mod market_data_port;
