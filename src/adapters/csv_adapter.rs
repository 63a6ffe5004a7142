//! CSV valuation log loader.
//!
//! Columns: `name,symbol,nav,buy_threshold,sell_threshold` (header required).
//! The first row for a name adds the instrument at that NAV; later rows set
//! its current value and must repeat its symbol. Blank threshold cells leave
//! the threshold unchanged.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::error::{NavError, parse_amount};
use crate::domain::portfolio::Portfolio;

/// One parsed line of the valuation log.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationRow {
    pub name: String,
    pub symbol: String,
    pub nav: f64,
    pub buy_threshold: Option<f64>,
    pub sell_threshold: Option<f64>,
}

pub fn read_rows(content: &str) -> Result<Vec<ValuationRow>, NavError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut rows = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        // header is line 1
        let line = idx + 2;
        let record = result.map_err(|e| NavError::Csv {
            reason: format!("line {line}: {e}"),
        })?;

        let column = |i: usize, label: &str| -> Result<String, NavError> {
            match record.get(i) {
                Some(v) => Ok(v.to_string()),
                None => Err(NavError::Csv {
                    reason: format!("line {line}: missing {label} column"),
                }),
            }
        };
        let optional = |i: usize, label: &str| -> Result<Option<f64>, NavError> {
            match record.get(i) {
                Some(v) if !v.is_empty() => {
                    parse_amount(&format!("{label} (line {line})"), v).map(Some)
                }
                _ => Ok(None),
            }
        };

        let name = column(0, "name")?;
        if name.is_empty() {
            return Err(NavError::Csv {
                reason: format!("line {line}: empty name"),
            });
        }
        let symbol = column(1, "symbol")?;
        let nav = parse_amount(&format!("nav (line {line})"), &column(2, "nav")?)?;

        rows.push(ValuationRow {
            name,
            symbol,
            nav,
            buy_threshold: optional(3, "buy_threshold")?,
            sell_threshold: optional(4, "sell_threshold")?,
        });
    }

    Ok(rows)
}

/// Replay `rows` into `portfolio`.
///
/// Rows are applied to a staged copy, so a failing row leaves `portfolio` untouched.
pub fn apply_rows(portfolio: &mut Portfolio, rows: &[ValuationRow]) -> Result<(), NavError> {
    let mut staged = portfolio.clone();
    for row in rows {
        if let Some(existing) = staged.get(&row.name) {
            if !existing.matches_symbol(&row.symbol) {
                return Err(NavError::Csv {
                    reason: format!(
                        "{} is tracked as {} but a later row uses {}",
                        existing.name(),
                        existing.symbol(),
                        row.symbol
                    ),
                });
            }
            staged.set_current_value(&row.name, row.nav)?;
        } else {
            staged.add(&row.name, &row.symbol, row.nav)?;
        }
        if let Some(buy) = row.buy_threshold {
            staged.set_buy_threshold(&row.name, buy)?;
        }
        if let Some(sell) = row.sell_threshold {
            staged.set_sell_threshold(&row.name, sell)?;
        }
    }
    *portfolio = staged;
    Ok(())
}

pub fn load_portfolio<P: AsRef<Path>>(path: P) -> Result<Portfolio, NavError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| NavError::Csv {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let rows = read_rows(&content)?;
    debug!(file = %path.display(), rows = rows.len(), "valuation log parsed");

    let mut portfolio = Portfolio::new();
    apply_rows(&mut portfolio, &rows)?;
    info!(
        file = %path.display(),
        instruments = portfolio.len(),
        "portfolio loaded"
    );
    Ok(portfolio)
}
