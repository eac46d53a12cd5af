//! Candle history access port.

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::Candle;

pub trait CandlePort {
    /// Candles for `symbol` covering the last `lookback_days` before the most
    /// recent candle, oldest first. `None` returns the full history.
    fn fetch_candles(
        &self,
        symbol: &str,
        lookback_days: Option<u32>,
    ) -> Result<Vec<Candle>, ConfluenceError>;

    fn list_symbols(&self) -> Result<Vec<String>, ConfluenceError>;
}
