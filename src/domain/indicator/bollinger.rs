//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - %B: (price - lower) / (upper - lower)
//!
//! StdDev is the population standard deviation of the trailing window.
//! Below `period` closes the bands are a synthetic ±2% around the last close
//! with %B = 0.5. Zero-width bands also report %B = 0.5.

use serde::{Deserialize, Serialize};

use super::ema::sma;
use super::stddev::population_stddev;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

const SYNTHETIC_BAND_PCT: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub percent_b: f64,
}

impl Bollinger {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

pub fn bollinger_bands(closes: &[f64], period: usize, multiplier: f64) -> Bollinger {
    let price = closes.last().copied().unwrap_or(0.0);

    if period == 0 || closes.len() < period {
        return Bollinger {
            upper: price * (1.0 + SYNTHETIC_BAND_PCT),
            middle: price,
            lower: price * (1.0 - SYNTHETIC_BAND_PCT),
            percent_b: 0.5,
        };
    }

    let window = &closes[closes.len() - period..];
    let middle = sma(closes, period);
    let band = multiplier * population_stddev(window);
    let upper = middle + band;
    let lower = middle - band;

    let width = upper - lower;
    let percent_b = if width > 0.0 {
        (price - lower) / width
    } else {
        0.5
    };

    Bollinger {
        upper,
        middle,
        lower,
        percent_b,
    }
}
