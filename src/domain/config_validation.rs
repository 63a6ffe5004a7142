//! Configuration validation.
//!
//! Checks every navwatch key before the CLI builds anything from it. Absent
//! optional keys fall back to defaults; present keys must be well formed.

use crate::domain::error::NavError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_MIN_NAV: f64 = 50.0;
pub const DEFAULT_MAX_NAV: f64 = 5000.0;
pub const DEFAULT_BACKFILL_MIN: i64 = 10;
pub const DEFAULT_BACKFILL_MAX: i64 = 20;
pub const DEFAULT_BACKFILL_STEP: f64 = 0.10;
pub const DEFAULT_REFRESH_STEP: f64 = 0.05;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), NavError> {
    validate_analytics_config(config)?;
    validate_market_config(config)?;
    validate_auth_config(config)?;
    Ok(())
}

pub fn validate_analytics_config(config: &dyn ConfigPort) -> Result<(), NavError> {
    parse_seed(config).map(|_| ())
}

/// `[analytics] seed` as a u64, or `None` when unset.
pub fn parse_seed(config: &dyn ConfigPort) -> Result<Option<u64>, NavError> {
    match config.get_string("analytics", "seed") {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| NavError::ConfigInvalid {
                section: "analytics".to_string(),
                key: "seed".to_string(),
                reason: format!("seed must be a non-negative integer, got {s:?}"),
            }),
    }
}

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), NavError> {
    validate_nav_range(config)?;
    validate_backfill_range(config)?;
    validate_step(config, "backfill_step", DEFAULT_BACKFILL_STEP)?;
    validate_step(config, "refresh_step", DEFAULT_REFRESH_STEP)?;
    Ok(())
}

fn require_number(config: &dyn ConfigPort, key: &str) -> Result<(), NavError> {
    if let Some(raw) = config.get_string("market", key) {
        if raw.trim().parse::<f64>().is_err() {
            return Err(NavError::ConfigInvalid {
                section: "market".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be a number"),
            });
        }
    }
    Ok(())
}

fn require_integer(config: &dyn ConfigPort, key: &str) -> Result<(), NavError> {
    if let Some(raw) = config.get_string("market", key) {
        if raw.trim().parse::<i64>().is_err() {
            return Err(NavError::ConfigInvalid {
                section: "market".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be a whole number"),
            });
        }
    }
    Ok(())
}

fn validate_nav_range(config: &dyn ConfigPort) -> Result<(), NavError> {
    require_number(config, "min_nav")?;
    require_number(config, "max_nav")?;

    let min_nav = config.get_double("market", "min_nav", DEFAULT_MIN_NAV);
    let max_nav = config.get_double("market", "max_nav", DEFAULT_MAX_NAV);
    if min_nav <= 0.0 {
        return Err(NavError::ConfigInvalid {
            section: "market".to_string(),
            key: "min_nav".to_string(),
            reason: "min_nav must be positive".to_string(),
        });
    }
    if max_nav <= min_nav {
        return Err(NavError::ConfigInvalid {
            section: "market".to_string(),
            key: "max_nav".to_string(),
            reason: "max_nav must be greater than min_nav".to_string(),
        });
    }
    Ok(())
}

fn validate_backfill_range(config: &dyn ConfigPort) -> Result<(), NavError> {
    require_integer(config, "backfill_min")?;
    require_integer(config, "backfill_max")?;

    let min = config.get_int("market", "backfill_min", DEFAULT_BACKFILL_MIN);
    let max = config.get_int("market", "backfill_max", DEFAULT_BACKFILL_MAX);
    if min < 0 {
        return Err(NavError::ConfigInvalid {
            section: "market".to_string(),
            key: "backfill_min".to_string(),
            reason: "backfill_min must be non-negative".to_string(),
        });
    }
    if max < min {
        return Err(NavError::ConfigInvalid {
            section: "market".to_string(),
            key: "backfill_max".to_string(),
            reason: "backfill_max must be at least backfill_min".to_string(),
        });
    }
    Ok(())
}

fn validate_step(config: &dyn ConfigPort, key: &str, default: f64) -> Result<(), NavError> {
    require_number(config, key)?;
    let value = config.get_double("market", key, default);
    if value < 0.0 || value >= 1.0 {
        return Err(NavError::ConfigInvalid {
            section: "market".to_string(),
            key: key.to_string(),
            reason: format!("{key} must be in [0, 1)"),
        });
    }
    Ok(())
}

pub fn validate_auth_config(config: &dyn ConfigPort) -> Result<(), NavError> {
    for user in config.keys("auth") {
        match config.get_string("auth", &user) {
            Some(hash) if hash.trim().starts_with('$') => {}
            _ => {
                return Err(NavError::ConfigInvalid {
                    section: "auth".to_string(),
                    key: user,
                    reason: "expected a PHC password hash (see hash-password)".to_string(),
                });
            }
        }
    }
    Ok(())
}
