//! Configuration validation.
//!
//! Checks every known key before a signal or backtest runs. Missing keys
//! are fine (defaults apply); present keys must parse and be in range.

use crate::domain::error::ConfluenceError;
use crate::ports::config_port::ConfigPort;

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    validate_sentiment(config)?;
    validate_max_risk(config)?;
    validate_min_candles(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    validate_signal_config(config)?;
    validate_initial_balance(config)?;
    validate_warmup(config)?;
    validate_exit_horizon(config)?;
    validate_lookback(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ConfluenceError {
    ConfluenceError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Reads a float that must parse when present.
fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, ConfluenceError> {
    if !config.has_key(section, key) {
        return Ok(None);
    }
    let value = config.get_double(section, key, f64::NAN);
    if value.is_nan() {
        return Err(invalid(section, key, "must be a number"));
    }
    Ok(Some(value))
}

/// Reads an integer that must parse when present.
fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, ConfluenceError> {
    if !config.has_key(section, key) {
        return Ok(None);
    }
    let sentinel = i64::MIN;
    let value = config.get_int(section, key, sentinel);
    if value == sentinel {
        return Err(invalid(section, key, "must be an integer"));
    }
    Ok(Some(value))
}

fn validate_sentiment(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(v) = read_double(config, "signal", "sentiment")? {
        if !(0.0..=100.0).contains(&v) {
            return Err(invalid("signal", "sentiment", "sentiment must be between 0 and 100"));
        }
    }
    Ok(())
}

fn validate_max_risk(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(v) = read_double(config, "signal", "max_risk_percent")? {
        if v <= 0.0 || v > 100.0 {
            return Err(invalid(
                "signal",
                "max_risk_percent",
                "max_risk_percent must be in (0, 100]",
            ));
        }
    }
    Ok(())
}

fn validate_min_candles(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(v) = read_int(config, "signal", "min_candles")? {
        if v < 1 {
            return Err(invalid("signal", "min_candles", "min_candles must be at least 1"));
        }
    }
    Ok(())
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(v) = read_double(config, "backtest", "initial_balance")? {
        if v <= 0.0 || !v.is_finite() {
            return Err(invalid(
                "backtest",
                "initial_balance",
                "initial_balance must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_warmup(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(v) = read_int(config, "backtest", "warmup")? {
        if v < 1 {
            return Err(invalid("backtest", "warmup", "warmup must be at least 1"));
        }
    }
    Ok(())
}

fn validate_exit_horizon(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(v) = read_int(config, "backtest", "exit_horizon")? {
        if v < 1 {
            return Err(invalid(
                "backtest",
                "exit_horizon",
                "exit_horizon must be at least 1",
            ));
        }
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    if let Some(v) = read_int(config, "data", "lookback_days")? {
        if v < 1 || v > i64::from(u32::MAX) {
            return Err(invalid("data", "lookback_days", "lookback_days must be positive"));
        }
    }
    Ok(())
}
