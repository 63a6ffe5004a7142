//! Market data source port trait.
//!
//! Supplies valuations for instruments the engine does not observe directly:
//! an opening NAV, a synthetic backfill, and refresh ticks.

pub trait MarketDataSource {
    /// Opening NAV for a newly tracked instrument.
    fn initial_value(&mut self) -> f64;

    /// Backfill values to append after `initial`, oldest first.
    fn backfill(&mut self, initial: f64) -> Vec<f64>;

    /// Next observed NAV given the current one.
    fn next_value(&mut self, current: f64) -> f64;
}
