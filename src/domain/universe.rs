//! Symbol universe for multi-symbol scans.
//!
//! Parses symbol lists from the command line or configuration and loads the
//! candle history of each, skipping symbols without enough data.

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::Candle;
use crate::ports::data_port::CandlePort;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

impl From<UniverseError> for ConfluenceError {
    fn from(err: UniverseError) -> Self {
        ConfluenceError::ConfigInvalid {
            section: "data".into(),
            key: "symbols".into(),
            reason: err.to_string(),
        }
    }
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// A symbol whose history was loaded successfully.
#[derive(Debug, Clone)]
pub struct LoadedSymbol {
    pub symbol: String,
    pub candles: Vec<Candle>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Unavailable(String),
    NoData,
    InsufficientBars { bars: usize },
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct Universe {
    pub loaded: Vec<LoadedSymbol>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Loads every symbol's candles. Fails only when nothing usable remains.
pub fn load_universe(
    port: &dyn CandlePort,
    symbols: &[String],
    lookback_days: Option<u32>,
    min_candles: usize,
) -> Result<Universe, ConfluenceError> {
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        let reason = match port.fetch_candles(symbol, lookback_days) {
            Err(e) => SkipReason::Unavailable(e.to_string()),
            Ok(candles) if candles.is_empty() => SkipReason::NoData,
            Ok(candles) if candles.len() < min_candles => SkipReason::InsufficientBars {
                bars: candles.len(),
            },
            Ok(candles) => {
                info!(%symbol, bars = candles.len(), "loaded");
                loaded.push(LoadedSymbol {
                    symbol: symbol.clone(),
                    candles,
                });
                continue;
            }
        };
        warn!(%symbol, ?reason, "skipping symbol");
        skipped.push(SkippedSymbol {
            symbol: symbol.clone(),
            reason,
        });
    }

    if loaded.is_empty() {
        return Err(ConfluenceError::InsufficientData {
            symbol: "all".to_string(),
            bars: 0,
            minimum: min_candles,
        });
    }

    if !skipped.is_empty() {
        info!(
            scanned = loaded.len(),
            requested = symbols.len(),
            "some symbols were skipped"
        );
    }

    Ok(Universe { loaded, skipped })
}
