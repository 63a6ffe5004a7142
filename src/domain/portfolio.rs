//! Portfolio: the set of tracked instruments, unique by name and by symbol.

use tracing::{debug, info};

use super::error::NavError;
use super::instrument::{Instrument, Recommendation};
use crate::ports::market_data_port::MarketDataSource;

/// Recommendation counts across a non-empty portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortfolioSummary {
    pub total: usize,
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    instruments: Vec<Instrument>,
}

impl Portfolio {
    pub fn new() -> Self {
        Portfolio {
            instruments: Vec::new(),
        }
    }

    /// Track a new instrument at `initial_value`.
    pub fn add(
        &mut self,
        name: &str,
        symbol: &str,
        initial_value: f64,
    ) -> Result<&mut Instrument, NavError> {
        self.add_seeded(name, symbol, initial_value, &[])
    }

    /// Track a new instrument and append `backfill` after its initial point.
    ///
    /// The backfill is appended verbatim; `current_value` stays `initial_value`.
    pub fn add_seeded(
        &mut self,
        name: &str,
        symbol: &str,
        initial_value: f64,
        backfill: &[f64],
    ) -> Result<&mut Instrument, NavError> {
        self.ensure_unique(name, symbol)?;

        let mut instrument = Instrument::new(name, symbol);
        instrument.set_current_value(initial_value);
        for &value in backfill {
            instrument.append_valuation(value);
        }

        info!(
            name,
            symbol,
            initial_value,
            backfill = backfill.len(),
            "instrument added"
        );
        self.instruments.push(instrument);
        let last = self.instruments.len() - 1;
        Ok(&mut self.instruments[last])
    }

    /// Track a new instrument whose opening value and backfill come from `source`.
    pub fn add_from_source(
        &mut self,
        name: &str,
        symbol: &str,
        source: &mut dyn MarketDataSource,
    ) -> Result<&mut Instrument, NavError> {
        self.ensure_unique(name, symbol)?;
        let initial = source.initial_value();
        let backfill = source.backfill(initial);
        self.add_seeded(name, symbol, initial, &backfill)
    }

    fn ensure_unique(&self, name: &str, symbol: &str) -> Result<(), NavError> {
        let clash = self
            .instruments
            .iter()
            .any(|i| i.matches_name(name) || i.matches_symbol(symbol));
        if clash {
            return Err(NavError::DuplicateInstrument {
                name: name.to_string(),
                symbol: symbol.to_string(),
            });
        }
        Ok(())
    }

    /// Remove every instrument whose name matches. Returns whether any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.instruments.len();
        self.instruments.retain(|i| !i.matches_name(name));
        let removed = self.instruments.len() != before;
        if removed {
            info!(name, "instrument removed");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.matches_name(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Instrument> {
        self.instruments.iter_mut().find(|i| i.matches_name(name))
    }

    pub fn get_by_symbol(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.matches_symbol(symbol))
    }

    pub fn require(&self, name: &str) -> Result<&Instrument, NavError> {
        self.get(name).ok_or_else(|| NavError::InstrumentNotFound {
            name: name.to_string(),
        })
    }

    pub fn require_mut(&mut self, name: &str) -> Result<&mut Instrument, NavError> {
        self.get_mut(name).ok_or_else(|| NavError::InstrumentNotFound {
            name: name.to_string(),
        })
    }

    pub fn set_current_value(&mut self, name: &str, value: f64) -> Result<(), NavError> {
        self.require_mut(name)?.set_current_value(value);
        Ok(())
    }

    pub fn set_buy_threshold(&mut self, name: &str, value: f64) -> Result<(), NavError> {
        self.require_mut(name)?.set_buy_threshold(value);
        Ok(())
    }

    pub fn set_sell_threshold(&mut self, name: &str, value: f64) -> Result<(), NavError> {
        self.require_mut(name)?.set_sell_threshold(value);
        Ok(())
    }

    /// Pull one fresh valuation for every instrument from `source`.
    pub fn refresh_all(&mut self, source: &mut dyn MarketDataSource) {
        for instrument in &mut self.instruments {
            let next = source.next_value(instrument.current_value());
            instrument.set_current_value(next);
        }
        debug!(count = self.instruments.len(), "portfolio refreshed");
    }

    /// Snapshot of every instrument in insertion order.
    pub fn all(&self) -> Vec<Instrument> {
        self.instruments.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Count instruments by current recommendation. `None` when empty.
    pub fn summary(&self) -> Option<PortfolioSummary> {
        if self.instruments.is_empty() {
            return None;
        }

        let total = self.instruments.len();
        let mut buy = 0usize;
        let mut sell = 0usize;
        for instrument in &self.instruments {
            match instrument.recommendation() {
                Recommendation::Buy => buy += 1,
                Recommendation::Sell => sell += 1,
                Recommendation::Hold => {}
            }
        }

        Some(PortfolioSummary {
            total,
            buy,
            sell,
            hold: total - buy - sell,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        initial: f64,
        backfill: Vec<f64>,
        step: f64,
    }

    impl MarketDataSource for FixedSource {
        fn initial_value(&mut self) -> f64 {
            self.initial
        }

        fn backfill(&mut self, _initial: f64) -> Vec<f64> {
            self.backfill.clone()
        }

        fn next_value(&mut self, current: f64) -> f64 {
            current + self.step
        }
    }

    fn sample_portfolio() -> Portfolio {
        let mut portfolio = Portfolio::new();
        portfolio.add("Acme", "ACME", 100.0).unwrap();
        portfolio.add("Globex", "GBX", 250.0).unwrap();
        portfolio
    }

    #[test]
    fn new_portfolio_is_empty() {
        let portfolio = Portfolio::new();
        assert!(portfolio.is_empty());
        assert_eq!(portfolio.len(), 0);
        assert!(portfolio.all().is_empty());
    }

    #[test]
    fn add_records_initial_valuation() {
        let mut portfolio = Portfolio::new();
        let inst = portfolio.add("Acme", "ACME", 100.0).unwrap();
        assert_eq!(inst.current_value(), 100.0);
        assert_eq!(inst.history().len(), 1);
        assert_eq!(portfolio.len(), 1);
    }

    #[test]
    fn add_rejects_duplicate_name_case_insensitively() {
        let mut portfolio = sample_portfolio();
        let err = portfolio.add("ACME", "NEW", 1.0).unwrap_err();
        assert!(matches!(err, NavError::DuplicateInstrument { .. }));
        assert_eq!(portfolio.len(), 2);
    }

    #[test]
    fn add_rejects_duplicate_symbol_case_insensitively() {
        let mut portfolio = sample_portfolio();
        let err = portfolio.add("Initech", "gbx", 1.0).unwrap_err();
        assert!(matches!(err, NavError::DuplicateInstrument { .. }));
        assert_eq!(portfolio.len(), 2);
        assert!(portfolio.get("Initech").is_none());
    }

    #[test]
    fn add_seeded_appends_backfill_verbatim() {
        let mut portfolio = Portfolio::new();
        let inst = portfolio
            .add_seeded("Acme", "ACME", 100.0, &[98.0, 97.5, 103.0])
            .unwrap();
        let values: Vec<f64> = inst.history().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![100.0, 98.0, 97.5, 103.0]);
        assert_eq!(inst.current_value(), 100.0);
    }

    #[test]
    fn add_from_source_uses_source_values() {
        let mut portfolio = Portfolio::new();
        let mut source = FixedSource {
            initial: 500.0,
            backfill: vec![510.0, 505.0],
            step: 1.0,
        };
        let inst = portfolio.add_from_source("Acme", "ACME", &mut source).unwrap();
        assert_eq!(inst.current_value(), 500.0);
        assert_eq!(inst.history().len(), 3);
    }

    #[test]
    fn add_from_source_duplicate_leaves_state_alone() {
        let mut portfolio = sample_portfolio();
        let mut source = FixedSource {
            initial: 1.0,
            backfill: vec![],
            step: 0.0,
        };
        assert!(portfolio.add_from_source("acme", "X", &mut source).is_err());
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.get("Acme").unwrap().history().len(), 1);
    }

    #[test]
    fn remove_is_case_insensitive() {
        let mut portfolio = sample_portfolio();
        assert!(portfolio.remove("acme"));
        assert!(portfolio.get("Acme").is_none());
        assert_eq!(portfolio.len(), 1);
    }

    #[test]
    fn remove_missing_returns_false() {
        let mut portfolio = sample_portfolio();
        assert!(!portfolio.remove("Initech"));
        assert_eq!(portfolio.len(), 2);
    }

    #[test]
    fn get_is_case_insensitive() {
        let portfolio = sample_portfolio();
        assert_eq!(portfolio.get("GLOBEX").unwrap().symbol(), "GBX");
        assert_eq!(portfolio.get_by_symbol("acme").unwrap().name(), "Acme");
        assert!(portfolio.get("Nobody").is_none());
    }

    #[test]
    fn require_reports_not_found() {
        let portfolio = sample_portfolio();
        match portfolio.require("Nobody") {
            Err(NavError::InstrumentNotFound { name }) => assert_eq!(name, "Nobody"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn addressed_writes() {
        let mut portfolio = sample_portfolio();
        portfolio.set_current_value("acme", 90.0).unwrap();
        portfolio.set_buy_threshold("acme", 95.0).unwrap();
        portfolio.set_sell_threshold("acme", 200.0).unwrap();

        let inst = portfolio.get("Acme").unwrap();
        assert_eq!(inst.current_value(), 90.0);
        assert_eq!(inst.history().len(), 2);
        assert_eq!(inst.recommendation(), Recommendation::Buy);

        assert!(portfolio.set_current_value("Nobody", 1.0).is_err());
        assert!(portfolio.set_buy_threshold("Nobody", 1.0).is_err());
    }

    #[test]
    fn refresh_all_ticks_every_instrument() {
        let mut portfolio = sample_portfolio();
        let mut source = FixedSource {
            initial: 0.0,
            backfill: vec![],
            step: 2.5,
        };
        portfolio.refresh_all(&mut source);

        assert_eq!(portfolio.get("Acme").unwrap().current_value(), 102.5);
        assert_eq!(portfolio.get("Globex").unwrap().current_value(), 252.5);
        assert!(portfolio.iter().all(|i| i.history().len() == 2));
    }

    #[test]
    fn all_is_a_snapshot_in_insertion_order() {
        let mut portfolio = sample_portfolio();
        let snapshot = portfolio.all();
        portfolio.set_current_value("Acme", 1.0).unwrap();

        let names: Vec<&str> = snapshot.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Acme", "Globex"]);
        assert_eq!(snapshot[0].current_value(), 100.0);
    }

    #[test]
    fn summary_empty_is_none() {
        assert_eq!(Portfolio::new().summary(), None);
    }

    #[test]
    fn summary_all_hold() {
        let portfolio = sample_portfolio();
        assert_eq!(
            portfolio.summary(),
            Some(PortfolioSummary {
                total: 2,
                buy: 0,
                sell: 0,
                hold: 2,
            })
        );
    }

    #[test]
    fn summary_counts_signals() {
        let mut portfolio = sample_portfolio();
        portfolio.add("Initech", "INTC", 40.0).unwrap();
        portfolio.set_buy_threshold("Acme", 120.0).unwrap();
        portfolio.set_sell_threshold("Globex", 200.0).unwrap();

        let summary = portfolio.summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.buy, 1);
        assert_eq!(summary.sell, 1);
        assert_eq!(summary.hold, 1);
    }
}
