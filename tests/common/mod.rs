#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use confluence::domain::error::ConfluenceError;
pub use confluence::domain::ohlcv::Candle;
use confluence::ports::data_port::CandlePort;
use std::collections::HashMap;

pub struct MockCandlePort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockCandlePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl CandlePort for MockCandlePort {
    fn fetch_candles(
        &self,
        symbol: &str,
        _lookback_days: Option<u32>,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ConfluenceError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, ConfluenceError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Daily candles with highs and lows 0.5% either side of each close.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: start_time() + Duration::days(i as i64),
            open: close,
            high: close * 1.005,
            low: close * 0.995,
            close,
            volume: 1_000.0,
        })
        .collect()
}

/// `n` closes compounding by `step` per bar from 100.
pub fn compounding_closes(n: usize, step: f64) -> Vec<f64> {
    (0..n).map(|i| 100.0 * (1.0 + step).powi(i as i32)).collect()
}

pub fn rising_candles(n: usize) -> Vec<Candle> {
    candles_from_closes(&compounding_closes(n, 0.01))
}

pub fn falling_candles(n: usize) -> Vec<Candle> {
    candles_from_closes(&compounding_closes(n, -0.01))
}

pub fn flat_candles(n: usize) -> Vec<Candle> {
    candles_from_closes(&vec![100.0; n])
}

/// Writes candles in the CSV layout the file adapter reads.
pub fn candles_to_csv(candles: &[Candle]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.timestamp.format("%Y-%m-%d"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        ));
    }
    out
}
