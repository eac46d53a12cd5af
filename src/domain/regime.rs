//! Market regime classification.
//!
//! Decision table, first match wins:
//! 1. ADX > 40: strong trend. Bullish needs ema9 > ema21 > ema50 and
//!    price > ema200 (bearish mirrors it). Strength min(100, 2·ADX),
//!    confidence 85.
//! 2. ADX > 25: weak trend. Direction from the ema9/ema21/ema50 ordering
//!    only. Strength 2·ADX, confidence 70.
//! 3. Band width / price > 10% or ATR / price > 3%: volatile, neutral,
//!    strength 30, confidence 50.
//! 4. Otherwise ranging, neutral, strength 20, confidence 60.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::bias::Bias;
use crate::domain::indicator::IndicatorSnapshot;

const STRONG_TREND_ADX: f64 = 40.0;
const WEAK_TREND_ADX: f64 = 25.0;
const VOLATILE_BAND_WIDTH: f64 = 0.10;
const VOLATILE_ATR: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeType {
    StrongTrend,
    WeakTrend,
    Ranging,
    Volatile,
}

impl fmt::Display for RegimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimeType::StrongTrend => write!(f, "strong trend"),
            RegimeType::WeakTrend => write!(f, "weak trend"),
            RegimeType::Ranging => write!(f, "ranging"),
            RegimeType::Volatile => write!(f, "volatile"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    #[serde(rename = "type")]
    pub regime_type: RegimeType,
    pub direction: Bias,
    pub strength: f64,
    pub confidence: f64,
}

pub fn classify_regime(ind: &IndicatorSnapshot, price: f64) -> Regime {
    let stacked_up = ind.ema9 > ind.ema21 && ind.ema21 > ind.ema50;
    let stacked_down = ind.ema9 < ind.ema21 && ind.ema21 < ind.ema50;

    if ind.adx > STRONG_TREND_ADX {
        let direction = if stacked_up && price > ind.ema200 {
            Bias::Bullish
        } else if stacked_down && price < ind.ema200 {
            Bias::Bearish
        } else {
            Bias::Neutral
        };
        return Regime {
            regime_type: RegimeType::StrongTrend,
            direction,
            strength: (ind.adx * 2.0).min(100.0),
            confidence: 85.0,
        };
    }

    if ind.adx > WEAK_TREND_ADX {
        let direction = if stacked_up {
            Bias::Bullish
        } else if stacked_down {
            Bias::Bearish
        } else {
            Bias::Neutral
        };
        return Regime {
            regime_type: RegimeType::WeakTrend,
            direction,
            strength: ind.adx * 2.0,
            confidence: 70.0,
        };
    }

    let (band_width, atr_ratio) = if price > 0.0 {
        (ind.bollinger.width() / price, ind.atr / price)
    } else {
        (0.0, 0.0)
    };

    if band_width > VOLATILE_BAND_WIDTH || atr_ratio > VOLATILE_ATR {
        return Regime {
            regime_type: RegimeType::Volatile,
            direction: Bias::Neutral,
            strength: 30.0,
            confidence: 50.0,
        };
    }

    Regime {
        regime_type: RegimeType::Ranging,
        direction: Bias::Neutral,
        strength: 20.0,
        confidence: 60.0,
    }
}
