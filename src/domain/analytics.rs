//! Analytics over an instrument's NAV history.
//!
//! Trend:      (last - first) / first * 100 over the whole window
//! Volatility: mean |h[i] - h[i-1]|
//! Projection: current * U[0.95, 1.05), change clamped to ±15%, floored at 1.0
//!
//! The projection is a bounded random walk, not a forecast. Volatility feeds
//! the risk label only.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::error::NavError;
use super::instrument::{Instrument, Recommendation, threshold_signal};
use super::portfolio::Portfolio;
use super::valuation::ValuationPoint;

/// Returned by [`volatility`] when there are fewer than two points.
pub const FALLBACK_VOLATILITY: f64 = 0.1;
pub const PROJECTION_FACTOR_MIN: f64 = 0.95;
pub const PROJECTION_FACTOR_MAX: f64 = 1.05;
pub const MAX_PROJECTED_CHANGE: f64 = 0.15;
pub const MIN_PROJECTED_VALUE: f64 = 1.0;
pub const CONFIDENCE_FLOOR: u8 = 60;
pub const CONFIDENCE_SPAN: u8 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    InsufficientData,
    StrongUp,
    MildUp,
    Sideways,
    MildDown,
    StrongDown,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::InsufficientData => "insufficient data for trend analysis",
            Trend::StrongUp => "strong upward trend",
            Trend::MildUp => "mild upward trend",
            Trend::Sideways => "sideways/consolidation",
            Trend::MildDown => "mild downward trend",
            Trend::StrongDown => "strong downward trend",
        };
        f.write_str(label)
    }
}

/// Signal derived from the projected change, graded by strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    StrongBuy,
    Buy,
    Hold,
    WeakSell,
    Sell,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Signal::StrongBuy => "STRONG BUY",
            Signal::Buy => "BUY",
            Signal::Hold => "HOLD",
            Signal::WeakSell => "WEAK SELL",
            Signal::Sell => "SELL",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW RISK - stable price movement",
            RiskLevel::Moderate => "MODERATE RISK - normal market fluctuation",
            RiskLevel::High => "HIGH RISK - significant volatility",
            RiskLevel::VeryHigh => "VERY HIGH RISK - extreme volatility",
        };
        f.write_str(label)
    }
}

/// Cosmetic "key factor" attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketFactor {
    MarketVolatility,
    EconomicIndicators,
    SectorPerformance,
    CompanyFundamentals,
    TechnicalAnalysis,
    GlobalMarketTrends,
}

impl MarketFactor {
    pub const ALL: [MarketFactor; 6] = [
        MarketFactor::MarketVolatility,
        MarketFactor::EconomicIndicators,
        MarketFactor::SectorPerformance,
        MarketFactor::CompanyFundamentals,
        MarketFactor::TechnicalAnalysis,
        MarketFactor::GlobalMarketTrends,
    ];
}

impl fmt::Display for MarketFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketFactor::MarketVolatility => "market volatility",
            MarketFactor::EconomicIndicators => "economic indicators",
            MarketFactor::SectorPerformance => "sector performance",
            MarketFactor::CompanyFundamentals => "company fundamentals",
            MarketFactor::TechnicalAnalysis => "technical analysis",
            MarketFactor::GlobalMarketTrends => "global market trends",
        };
        f.write_str(label)
    }
}

/// A threshold the projected value would reach before the current value does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdNote {
    BuyThresholdAhead,
    SellThresholdAhead,
}

impl fmt::Display for ThresholdNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdNote::BuyThresholdAhead => {
                f.write_str("note: projected NAV may reach your buy threshold")
            }
            ThresholdNote::SellThresholdAhead => {
                f.write_str("note: projected NAV may reach your sell threshold")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub signal: Signal,
    /// (projected - current) / current * 100
    pub change_pct: f64,
    pub notes: Vec<ThresholdNote>,
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.change_pct;
        match self.signal {
            Signal::StrongBuy => write!(f, "STRONG BUY - expected growth of {pct:.1}%")?,
            Signal::Buy => write!(f, "BUY - moderate growth expected ({pct:.1}%)")?,
            Signal::Sell => write!(f, "SELL - expected decline of {:.1}%", pct.abs())?,
            Signal::WeakSell => {
                write!(f, "WEAK SELL - minor decline expected ({:.1}%)", pct.abs())?
            }
            Signal::Hold => f.write_str("HOLD - sideways movement expected")?,
        }
        for note in &self.notes {
            write!(f, "\n  {note}")?;
        }
        Ok(())
    }
}

/// Everything the engine says about one instrument, field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub name: String,
    pub symbol: String,
    pub current_value: f64,
    pub trend: Trend,
    pub volatility: f64,
    pub projected_value: f64,
    pub confidence_pct: u8,
    pub market_factor: MarketFactor,
    pub advice: Advice,
    pub risk: RiskLevel,
}

impl AnalysisReport {
    pub fn recommendation(&self) -> Signal {
        self.advice.signal
    }

    pub fn recommendation_detail(&self) -> String {
        self.advice.to_string()
    }
}

pub fn classify_trend(history: &[ValuationPoint]) -> Trend {
    let (first, last) = match (history.first(), history.last()) {
        (Some(first), Some(last)) if history.len() >= 2 => (first.value, last.value),
        _ => return Trend::InsufficientData,
    };
    if first <= 0.0 || !first.is_finite() {
        return Trend::InsufficientData;
    }

    let change = (last - first) / first * 100.0;
    if change > 5.0 {
        Trend::StrongUp
    } else if change > 1.0 {
        Trend::MildUp
    } else if change < -5.0 {
        Trend::StrongDown
    } else if change < -1.0 {
        Trend::MildDown
    } else {
        Trend::Sideways
    }
}

pub fn volatility(history: &[ValuationPoint]) -> f64 {
    if history.len() < 2 {
        return FALLBACK_VOLATILITY;
    }
    let total: f64 = history
        .windows(2)
        .map(|pair| (pair[1].value - pair[0].value).abs())
        .sum();
    total / (history.len() - 1) as f64
}

/// Absolute bands; a 10.00 instrument and a 5000.00 one share them.
pub fn risk_level(history: &[ValuationPoint]) -> RiskLevel {
    let v = volatility(history);
    if v < 10.0 {
        RiskLevel::Low
    } else if v < 25.0 {
        RiskLevel::Moderate
    } else if v < 50.0 {
        RiskLevel::High
    } else {
        RiskLevel::VeryHigh
    }
}

pub fn recommend(current: f64, projected: f64, buy_threshold: f64, sell_threshold: f64) -> Advice {
    let change_pct = if current > 0.0 {
        (projected - current) / current * 100.0
    } else {
        0.0
    };

    let signal = if change_pct > 3.0 {
        Signal::StrongBuy
    } else if change_pct > 1.0 {
        Signal::Buy
    } else if change_pct < -3.0 {
        Signal::Sell
    } else if change_pct < -1.0 {
        Signal::WeakSell
    } else {
        Signal::Hold
    };

    let now = threshold_signal(current, buy_threshold, sell_threshold);
    let mut notes = Vec::new();
    if buy_threshold > 0.0 && projected <= buy_threshold && now != Recommendation::Buy {
        notes.push(ThresholdNote::BuyThresholdAhead);
    }
    if sell_threshold > 0.0 && projected >= sell_threshold && now != Recommendation::Sell {
        notes.push(ThresholdNote::SellThresholdAhead);
    }

    Advice {
        signal,
        change_pct,
        notes,
    }
}

/// Stateful half of the analytics: everything that draws random numbers.
///
/// The generator is injected so that tests (and `[analytics] seed`) can pin it.
#[derive(Debug)]
pub struct AnalyticsEngine<R = StdRng> {
    rng: R,
}

impl AnalyticsEngine<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> AnalyticsEngine<R> {
    pub fn new(rng: R) -> Self {
        AnalyticsEngine { rng }
    }

    pub fn classify_trend(&self, history: &[ValuationPoint]) -> Trend {
        classify_trend(history)
    }

    pub fn volatility(&self, history: &[ValuationPoint]) -> f64 {
        volatility(history)
    }

    pub fn risk_level(&self, history: &[ValuationPoint]) -> RiskLevel {
        risk_level(history)
    }

    pub fn recommend(
        &self,
        current: f64,
        projected: f64,
        buy_threshold: f64,
        sell_threshold: f64,
    ) -> Advice {
        recommend(current, projected, buy_threshold, sell_threshold)
    }

    /// Next-period NAV: a bounded random step from `current`.
    ///
    /// `history` only contributes a logged volatility; it does not widen or
    /// narrow the step.
    ///
    /// A non-finite `current` cannot be stepped; it is only floored.
    pub fn project_next_value(&mut self, current: f64, history: &[ValuationPoint]) -> f64 {
        if !current.is_finite() {
            return current.max(MIN_PROJECTED_VALUE);
        }
        let factor = self
            .rng
            .gen_range(PROJECTION_FACTOR_MIN..PROJECTION_FACTOR_MAX);
        let raw = current * factor;

        let max_change = current.abs() * MAX_PROJECTED_CHANGE;
        let change = (raw - current).clamp(-max_change, max_change);
        let projected = (current + change).max(MIN_PROJECTED_VALUE);

        debug!(
            current,
            factor,
            projected,
            volatility = volatility(history),
            "projected next value"
        );
        projected
    }

    /// Illustrative confidence in `[60, 95)`; ignores every input.
    pub fn confidence_level(&mut self) -> u8 {
        CONFIDENCE_FLOOR + self.rng.gen_range(0..CONFIDENCE_SPAN)
    }

    pub fn market_factor(&mut self) -> MarketFactor {
        let idx = self.rng.gen_range(0..MarketFactor::ALL.len());
        MarketFactor::ALL[idx]
    }

    pub fn full_report(
        &mut self,
        instrument: Option<&Instrument>,
    ) -> Result<AnalysisReport, NavError> {
        let instrument = instrument.ok_or_else(|| NavError::InvalidInstrument {
            reason: "no instrument supplied".to_string(),
        })?;
        let current = instrument.current_value();
        if !current.is_finite() {
            return Err(NavError::InvalidInstrument {
                reason: format!("{} has a non-finite current value", instrument.name()),
            });
        }

        let history = instrument.history_slice();
        let trend = classify_trend(history);
        let projected_value = self.project_next_value(current, history);
        let confidence_pct = self.confidence_level();
        let market_factor = self.market_factor();
        let advice = recommend(
            current,
            projected_value,
            instrument.buy_threshold(),
            instrument.sell_threshold(),
        );

        Ok(AnalysisReport {
            name: instrument.name().to_string(),
            symbol: instrument.symbol().to_string(),
            current_value: current,
            trend,
            volatility: volatility(history),
            projected_value,
            confidence_pct,
            market_factor,
            advice,
            risk: risk_level(history),
        })
    }

    /// [`full_report`](Self::full_report) for the instrument called `name`.
    pub fn report_for(
        &mut self,
        portfolio: &Portfolio,
        name: &str,
    ) -> Result<AnalysisReport, NavError> {
        let instrument = portfolio.require(name)?;
        self.full_report(Some(instrument))
    }
}
