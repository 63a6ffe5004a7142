#![allow(dead_code)]

use chrono::Utc;
use navwatch::domain::portfolio::Portfolio;
use navwatch::domain::valuation::ValuationPoint;
use navwatch::ports::market_data_port::MarketDataSource;
use std::collections::VecDeque;
use std::io::Write;

/// Market source that replays scripted values.
pub struct ScriptedSource {
    pub initials: VecDeque<f64>,
    pub backfill: Vec<f64>,
    pub ticks: VecDeque<f64>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            initials: VecDeque::new(),
            backfill: Vec::new(),
            ticks: VecDeque::new(),
        }
    }

    pub fn with_initials(mut self, values: &[f64]) -> Self {
        self.initials.extend(values.iter().copied());
        self
    }

    pub fn with_backfill(mut self, values: &[f64]) -> Self {
        self.backfill = values.to_vec();
        self
    }

    pub fn with_ticks(mut self, values: &[f64]) -> Self {
        self.ticks.extend(values.iter().copied());
        self
    }
}

impl MarketDataSource for ScriptedSource {
    fn initial_value(&mut self) -> f64 {
        self.initials.pop_front().unwrap_or(100.0)
    }

    fn backfill(&mut self, _initial: f64) -> Vec<f64> {
        self.backfill.clone()
    }

    fn next_value(&mut self, current: f64) -> f64 {
        self.ticks.pop_front().unwrap_or(current)
    }
}

pub fn series(values: &[f64]) -> Vec<ValuationPoint> {
    let t = Utc::now();
    values.iter().map(|&v| ValuationPoint::new(v, t)).collect()
}

pub fn history_values(portfolio: &Portfolio, name: &str) -> Vec<f64> {
    portfolio
        .get(name)
        .unwrap()
        .history()
        .iter()
        .map(|p| p.value)
        .collect()
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub const HOLDINGS_CSV: &str = "name,symbol,nav,buy_threshold,sell_threshold\n\
    Acme,ACME,100,,\n\
    Globex,GBX,250,,240\n\
    Initech,INTC,40,45,\n\
    Acme,ACME,106,,\n";
