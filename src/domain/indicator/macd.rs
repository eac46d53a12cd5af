//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(12) - EMA(26)
//! Signal Line = EMA(9) of the MACD line, where the line is re-derived for
//! every prefix of at least 26 closes
//! Histogram = MACD Line - Signal Line
//!
//! With fewer than 26 closes there is no line history, so the signal equals
//! the line and the histogram is 0.

use serde::{Deserialize, Serialize};

use super::ema::{ema, ema_series};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macd {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn macd(closes: &[f64]) -> Macd {
    let value = ema(closes, DEFAULT_FAST) - ema(closes, DEFAULT_SLOW);

    if closes.len() < DEFAULT_SLOW {
        return Macd {
            value,
            signal: value,
            histogram: 0.0,
        };
    }

    let fast = ema_series(closes, DEFAULT_FAST);
    let slow = ema_series(closes, DEFAULT_SLOW);
    let line: Vec<f64> = (DEFAULT_SLOW - 1..closes.len())
        .map(|i| fast[i] - slow[i])
        .collect();

    let signal = ema(&line, DEFAULT_SIGNAL);
    Macd {
        value,
        signal,
        histogram: value - signal,
    }
}
