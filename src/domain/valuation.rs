//! Valuation points: one NAV observation at an instant.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationPoint {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl ValuationPoint {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        ValuationPoint { value, timestamp }
    }

    /// Build a point stamped "now", but never earlier than `previous`.
    ///
    /// Keeps a history non-decreasing in time even if the wall clock steps back.
    pub fn after(value: f64, previous: Option<&ValuationPoint>) -> Self {
        let now = Utc::now();
        let timestamp = match previous {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };
        ValuationPoint { value, timestamp }
    }
}
