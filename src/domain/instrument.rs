//! A tracked instrument: NAV history plus buy/sell thresholds.

use std::fmt;

use tracing::debug;

use super::valuation::ValuationPoint;

/// Threshold-driven signal on the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recommendation::Buy => "BUY",
            Recommendation::Sell => "SELL",
            Recommendation::Hold => "HOLD",
        };
        f.write_str(label)
    }
}

/// Evaluate the threshold rule for `value`. A threshold of 0 (or below) is unset.
///
/// BUY is checked first, so an overlapping configuration resolves to BUY.
pub fn threshold_signal(value: f64, buy_threshold: f64, sell_threshold: f64) -> Recommendation {
    if buy_threshold > 0.0 && value <= buy_threshold {
        Recommendation::Buy
    } else if sell_threshold > 0.0 && value >= sell_threshold {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    name: String,
    symbol: String,
    current_value: f64,
    history: Vec<ValuationPoint>,
    buy_threshold: f64,
    sell_threshold: f64,
}

impl Instrument {
    /// A fresh instrument with no valuations and no thresholds.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Instrument {
            name: name.into(),
            symbol: symbol.into(),
            current_value: 0.0,
            history: Vec::new(),
            buy_threshold: 0.0,
            sell_threshold: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn buy_threshold(&self) -> f64 {
        self.buy_threshold
    }

    pub fn sell_threshold(&self) -> f64 {
        self.sell_threshold
    }

    /// Set the current value and log it to the history.
    pub fn set_current_value(&mut self, value: f64) {
        debug!(instrument = %self.name, value, "valuation recorded");
        self.current_value = value;
        self.append_valuation(value);
    }

    /// Append a point without touching the current value (backfill seeds).
    pub fn append_valuation(&mut self, value: f64) {
        let point = ValuationPoint::after(value, self.history.last());
        self.history.push(point);
    }

    pub fn set_buy_threshold(&mut self, value: f64) {
        self.buy_threshold = value;
    }

    pub fn set_sell_threshold(&mut self, value: f64) {
        self.sell_threshold = value;
    }

    /// Owned copy of the history, oldest first.
    pub fn history(&self) -> Vec<ValuationPoint> {
        self.history.clone()
    }

    pub fn history_slice(&self) -> &[ValuationPoint] {
        &self.history
    }

    pub fn latest(&self) -> Option<&ValuationPoint> {
        self.history.last()
    }

    pub fn recommendation(&self) -> Recommendation {
        threshold_signal(self.current_value, self.buy_threshold, self.sell_threshold)
    }

    pub(crate) fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    pub(crate) fn matches_symbol(&self, symbol: &str) -> bool {
        self.symbol.to_lowercase() == symbol.to_lowercase()
    }
}
