//! Average True Range.
//!
//! Simple mean of the trailing `period` true ranges, where each true range
//! needs the previous close. Returns 0 with fewer than `period + 1` candles.

use crate::domain::ohlcv::Candle;

pub const DEFAULT_PERIOD: usize = 14;

pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period + 1 {
        return 0.0;
    }

    let window = &candles[candles.len() - (period + 1)..];
    let total: f64 = window
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .sum();
    total / period as f64
}
