//! CSV file candle adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row and the
//! columns `timestamp,open,high,low,close,volume`. Timestamps are RFC 3339
//! or plain `YYYY-MM-DD` dates (midnight UTC).

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::Candle;
use crate::ports::data_port::CandlePort;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn data_error(reason: String) -> ConfluenceError {
    ConfluenceError::Data { reason }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ConfluenceError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| data_error(format!("invalid timestamp: {raw}")))
}

fn parse_number(record: &csv::StringRecord, idx: usize, column: &str) -> Result<f64, ConfluenceError> {
    record
        .get(idx)
        .ok_or_else(|| data_error(format!("missing {column} column")))?
        .trim()
        .parse()
        .map_err(|e| data_error(format!("invalid {column} value: {e}")))
}

impl CandlePort for CsvAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        lookback_days: Option<u32>,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {e}")))?;

            let raw_ts = record
                .get(0)
                .ok_or_else(|| data_error("missing timestamp column".into()))?;

            candles.push(Candle {
                timestamp: parse_timestamp(raw_ts)?,
                open: parse_number(&record, 1, "open")?,
                high: parse_number(&record, 2, "high")?,
                low: parse_number(&record, 3, "low")?,
                close: parse_number(&record, 4, "close")?,
                volume: parse_number(&record, 5, "volume")?,
            });
        }

        candles.sort_by_key(|c| c.timestamp);
        if let Some(pair) = candles.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(data_error(format!(
                "duplicate timestamp {} in {}",
                pair[0].timestamp,
                path.display()
            )));
        }

        if let (Some(days), Some(last)) = (lookback_days, candles.last()) {
            let cutoff = last.timestamp - Duration::days(i64::from(days));
            candles.retain(|c| c.timestamp >= cutoff);
        }

        Ok(candles)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ConfluenceError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {e}")))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
