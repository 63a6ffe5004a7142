//! Simulated market data: a seedable random walk standing in for a feed.
//!
//! initial:  U[min_nav, max_nav)
//! backfill: n ~ U{backfill_min..=backfill_max} points, each the previous
//!           value times U[1 - backfill_step, 1 + backfill_step)
//! refresh:  current * U[1 - refresh_step, 1 + refresh_step)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::config_validation::{
    DEFAULT_BACKFILL_MAX, DEFAULT_BACKFILL_MIN, DEFAULT_BACKFILL_STEP, DEFAULT_MAX_NAV,
    DEFAULT_MIN_NAV, DEFAULT_REFRESH_STEP,
};
use crate::domain::error::NavError;
use crate::ports::market_data_port::MarketDataSource;

/// Ranges for the simulated walk. Checked by [`MarketSettings::validate`]
/// when a [`SimulatedMarket`] is built.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSettings {
    pub min_nav: f64,
    pub max_nav: f64,
    pub backfill_min: usize,
    pub backfill_max: usize,
    pub backfill_step: f64,
    pub refresh_step: f64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        MarketSettings {
            min_nav: DEFAULT_MIN_NAV,
            max_nav: DEFAULT_MAX_NAV,
            backfill_min: DEFAULT_BACKFILL_MIN as usize,
            backfill_max: DEFAULT_BACKFILL_MAX as usize,
            backfill_step: DEFAULT_BACKFILL_STEP,
            refresh_step: DEFAULT_REFRESH_STEP,
        }
    }
}

impl MarketSettings {
    /// `0 < min_nav < max_nav`, `backfill_min <= backfill_max`, steps in `[0, 1)`.
    pub fn validate(&self) -> Result<(), NavError> {
        let invalid = |key: &str, reason: &str| NavError::ConfigInvalid {
            section: "market".to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if !(self.min_nav.is_finite() && self.min_nav > 0.0) {
            return Err(invalid("min_nav", "min_nav must be positive"));
        }
        if !(self.max_nav.is_finite() && self.max_nav > self.min_nav) {
            return Err(invalid("max_nav", "max_nav must be greater than min_nav"));
        }
        if self.backfill_max < self.backfill_min {
            return Err(invalid(
                "backfill_max",
                "backfill_max must be at least backfill_min",
            ));
        }
        for (key, step) in [
            ("backfill_step", self.backfill_step),
            ("refresh_step", self.refresh_step),
        ] {
            if !(0.0..1.0).contains(&step) {
                return Err(invalid(key, "step must be in [0, 1)"));
            }
        }
        Ok(())
    }
}

pub struct SimulatedMarket<R = StdRng> {
    settings: MarketSettings,
    rng: R,
}

impl SimulatedMarket<StdRng> {
    pub fn seeded(settings: MarketSettings, seed: u64) -> Result<Self, NavError> {
        Self::new(settings, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(settings: MarketSettings) -> Result<Self, NavError> {
        Self::new(settings, StdRng::from_entropy())
    }
}

impl<R: Rng> SimulatedMarket<R> {
    pub fn new(settings: MarketSettings, rng: R) -> Result<Self, NavError> {
        settings.validate()?;
        Ok(SimulatedMarket { settings, rng })
    }

    pub fn settings(&self) -> &MarketSettings {
        &self.settings
    }

    fn fluctuate(&mut self, value: f64, step: f64) -> f64 {
        if step <= 0.0 {
            return value;
        }
        value * self.rng.gen_range((1.0 - step)..(1.0 + step))
    }
}

impl<R: Rng> MarketDataSource for SimulatedMarket<R> {
    fn initial_value(&mut self) -> f64 {
        self.rng
            .gen_range(self.settings.min_nav..self.settings.max_nav)
    }

    fn backfill(&mut self, initial: f64) -> Vec<f64> {
        let count = self
            .rng
            .gen_range(self.settings.backfill_min..=self.settings.backfill_max);
        let step = self.settings.backfill_step;

        let mut values = Vec::with_capacity(count);
        let mut base = initial;
        for _ in 0..count {
            base = self.fluctuate(base, step);
            values.push(base);
        }
        values
    }

    fn next_value(&mut self, current: f64) -> f64 {
        let step = self.settings.refresh_step;
        self.fluctuate(current, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_value_in_range() {
        let mut market = SimulatedMarket::seeded(MarketSettings::default(), 1).unwrap();
        for _ in 0..500 {
            let v = market.initial_value();
            assert!((50.0..5000.0).contains(&v));
        }
    }

    #[test]
    fn backfill_length_and_steps() {
        let mut market = SimulatedMarket::seeded(MarketSettings::default(), 2).unwrap();
        for _ in 0..50 {
            let values = market.backfill(1000.0);
            assert!((10..=20).contains(&values.len()));

            let mut prev = 1000.0;
            for v in values {
                let ratio = v / prev;
                assert!(ratio >= 0.9 - 1e-12 && ratio < 1.1 + 1e-12, "ratio {ratio}");
                prev = v;
            }
        }
    }

    #[test]
    fn next_value_within_refresh_step() {
        let mut market = SimulatedMarket::seeded(MarketSettings::default(), 3).unwrap();
        for _ in 0..500 {
            let v = market.next_value(200.0);
            assert!(v >= 190.0 - 1e-9 && v <= 210.0 + 1e-9);
        }
    }

    #[test]
    fn zero_step_is_flat() {
        let settings = MarketSettings {
            backfill_min: 3,
            backfill_max: 3,
            backfill_step: 0.0,
            refresh_step: 0.0,
            ..MarketSettings::default()
        };
        let mut market = SimulatedMarket::seeded(settings, 4).unwrap();
        assert_eq!(market.backfill(10.0), vec![10.0, 10.0, 10.0]);
        assert_eq!(market.next_value(10.0), 10.0);
    }

    #[test]
    fn same_seed_same_walk() {
        let mut a = SimulatedMarket::seeded(MarketSettings::default(), 9).unwrap();
        let mut b = SimulatedMarket::seeded(MarketSettings::default(), 9).unwrap();
        let ia = a.initial_value();
        assert_eq!(ia, b.initial_value());
        assert_eq!(a.backfill(ia), b.backfill(ia));
    }

    #[test]
    fn degenerate_settings_are_rejected() {
        let cases = [
            (
                MarketSettings {
                    min_nav: 10.0,
                    max_nav: 10.0,
                    ..MarketSettings::default()
                },
                "max_nav",
            ),
            (
                MarketSettings {
                    min_nav: f64::NAN,
                    ..MarketSettings::default()
                },
                "min_nav",
            ),
            (
                MarketSettings {
                    backfill_min: 5,
                    backfill_max: 4,
                    ..MarketSettings::default()
                },
                "backfill_max",
            ),
            (
                MarketSettings {
                    refresh_step: 1.0,
                    ..MarketSettings::default()
                },
                "refresh_step",
            ),
        ];
        for (settings, expected) in cases {
            match SimulatedMarket::seeded(settings, 1) {
                Err(NavError::ConfigInvalid { key, .. }) => assert_eq!(key, expected),
                Err(other) => panic!("unexpected error: {other}"),
                Ok(_) => panic!("expected {expected} to be rejected"),
            }
        }
    }
}
