//! Core domain types and logic.

pub mod analytics;
pub mod config_validation;
pub mod error;
pub mod instrument;
pub mod portfolio;
pub mod valuation;
