//! Weighted confluence scoring.
//!
//! Seven technical dimensions each produce a `(signal, score)` pair with
//! `score` in [-100, 100]. The composite score is the weight-averaged factor
//! score. Weights are fixed and sum to 100.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::bias::Bias;
use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::regime::{Regime, RegimeType};

pub const RSI_WEIGHT: u32 = 15;
pub const MACD_WEIGHT: u32 = 20;
pub const BOLLINGER_WEIGHT: u32 = 10;
pub const EMA_WEIGHT: u32 = 25;
pub const VOLUME_WEIGHT: u32 = 10;
pub const REGIME_WEIGHT: u32 = 15;
pub const SENTIMENT_WEIGHT: u32 = 5;

pub const FACTOR_WEIGHTS: [u32; 7] = [
    RSI_WEIGHT,
    MACD_WEIGHT,
    BOLLINGER_WEIGHT,
    EMA_WEIGHT,
    VOLUME_WEIGHT,
    REGIME_WEIGHT,
    SENTIMENT_WEIGHT,
];

/// Sentiment used when the index is unavailable.
pub const NEUTRAL_SENTIMENT: f64 = 50.0;

const DIRECTIONAL_SCORE: f64 = 30.0;
const MIN_AGREEING_FACTORS: usize = 4;
const HIGH_VOLUME_RATIO: f64 = 2.0;
const LOW_VOLUME_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
            Direction::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceFactor {
    pub name: String,
    pub signal: Bias,
    pub weight: u32,
    pub score: f64,
    pub description: String,
}

impl ConfluenceFactor {
    fn new(name: &str, weight: u32, signal: Bias, score: f64, description: String) -> Self {
        Self {
            name: name.to_string(),
            signal,
            weight,
            score,
            description,
        }
    }

    /// Contribution to the weighted sum, before normalisation.
    pub fn weighted_score(&self) -> f64 {
        self.score * self.weight as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceScore {
    pub score: f64,
    pub direction: Direction,
    pub confidence: f64,
    pub bullish_count: usize,
    pub bearish_count: usize,
    pub factors: Vec<ConfluenceFactor>,
}

/// Maps a raw index to [0, 100]; non-finite input falls back to neutral.
pub fn normalize_sentiment(index: f64) -> f64 {
    if index.is_finite() {
        index.clamp(0.0, 100.0)
    } else {
        NEUTRAL_SENTIMENT
    }
}

pub fn score_confluence(
    ind: &IndicatorSnapshot,
    regime: &Regime,
    price: f64,
    sentiment: f64,
) -> ConfluenceScore {
    let rsi = rsi_factor(ind.rsi);
    let macd = macd_factor(ind);
    let bollinger = bollinger_factor(ind.bollinger.percent_b);
    let ema = ema_factor(ind, price);
    let regime_f = regime_factor(regime);

    let price_bias: f64 = [&rsi, &macd, &bollinger, &ema, &regime_f]
        .iter()
        .map(|f| f.weighted_score())
        .sum();
    let volume = volume_factor(ind.volume_ratio, price_bias);
    let sentiment = sentiment_factor(normalize_sentiment(sentiment));

    let factors = vec![rsi, macd, bollinger, ema, volume, regime_f, sentiment];

    let total_weight: u32 = factors.iter().map(|f| f.weight).sum();
    let weighted: f64 = factors.iter().map(ConfluenceFactor::weighted_score).sum();
    let score = (weighted / total_weight as f64).clamp(-100.0, 100.0);

    let mut bullish_count = 0;
    let mut bearish_count = 0;
    for factor in &factors {
        match factor.signal {
            Bias::Bullish => bullish_count += 1,
            Bias::Bearish => bearish_count += 1,
            Bias::Neutral => {}
        }
    }

    let direction = if score > DIRECTIONAL_SCORE && bullish_count >= MIN_AGREEING_FACTORS {
        Direction::Long
    } else if score < -DIRECTIONAL_SCORE && bearish_count >= MIN_AGREEING_FACTORS {
        Direction::Short
    } else {
        Direction::Neutral
    };

    let confidence = match direction {
        Direction::Long | Direction::Short => (50.0 + score.abs() / 2.0).min(90.0),
        Direction::Neutral => 40.0,
    };

    ConfluenceScore {
        score,
        direction,
        confidence,
        bullish_count,
        bearish_count,
        factors,
    }
}

fn rsi_factor(rsi: f64) -> ConfluenceFactor {
    let (signal, score, desc) = if rsi < 30.0 {
        (Bias::Bullish, 70.0 + (30.0 - rsi), "oversold")
    } else if rsi > 70.0 {
        (Bias::Bearish, -(70.0 + (rsi - 70.0)), "overbought")
    } else {
        (Bias::Neutral, 0.0, "neutral zone")
    };
    ConfluenceFactor::new(
        "RSI",
        RSI_WEIGHT,
        signal,
        score,
        format!("RSI {rsi:.1}, {desc}"),
    )
}

fn macd_factor(ind: &IndicatorSnapshot) -> ConfluenceFactor {
    let m = &ind.macd;
    let (signal, score, desc) = if m.histogram > 0.0 && m.value > 0.0 {
        (Bias::Bullish, 80.0, "above signal line and zero")
    } else if m.histogram > 0.0 {
        (Bias::Bullish, 40.0, "above signal line")
    } else if m.histogram < 0.0 && m.value < 0.0 {
        (Bias::Bearish, -80.0, "below signal line and zero")
    } else if m.histogram < 0.0 {
        (Bias::Bearish, -40.0, "below signal line")
    } else {
        (Bias::Neutral, 0.0, "flat")
    };
    ConfluenceFactor::new(
        "MACD",
        MACD_WEIGHT,
        signal,
        score,
        format!("MACD {desc} (histogram {:.4})", m.histogram),
    )
}

fn bollinger_factor(percent_b: f64) -> ConfluenceFactor {
    let (signal, score, desc) = if percent_b < 0.05 {
        (Bias::Bullish, 70.0, "at lower band")
    } else if percent_b > 0.95 {
        (Bias::Bearish, -70.0, "at upper band")
    } else if percent_b > 0.5 {
        (Bias::Bullish, 30.0, "above middle band")
    } else if percent_b < 0.5 {
        (Bias::Bearish, -30.0, "below middle band")
    } else {
        (Bias::Neutral, 0.0, "on middle band")
    };
    ConfluenceFactor::new(
        "Bollinger Bands",
        BOLLINGER_WEIGHT,
        signal,
        score,
        format!("%B {percent_b:.2}, {desc}"),
    )
}

fn ema_factor(ind: &IndicatorSnapshot, price: f64) -> ConfluenceFactor {
    let perfect_up =
        price > ind.ema9 && ind.ema9 > ind.ema21 && ind.ema21 > ind.ema50 && ind.ema50 > ind.ema200;
    let perfect_down =
        price < ind.ema9 && ind.ema9 < ind.ema21 && ind.ema21 < ind.ema50 && ind.ema50 < ind.ema200;

    let (signal, score, desc) = if perfect_up {
        (Bias::Bullish, 100.0, "perfect bullish stack")
    } else if perfect_down {
        (Bias::Bearish, -100.0, "perfect bearish stack")
    } else if price > ind.ema200 && ind.ema9 > ind.ema21 {
        (Bias::Bullish, 60.0, "above EMA200 with rising short-term")
    } else if price < ind.ema200 && ind.ema9 < ind.ema21 {
        (Bias::Bearish, -60.0, "below EMA200 with falling short-term")
    } else {
        (Bias::Neutral, 0.0, "mixed alignment")
    };
    ConfluenceFactor::new(
        "EMA Alignment",
        EMA_WEIGHT,
        signal,
        score,
        format!("EMAs {desc}"),
    )
}

/// High volume confirms whichever side the price factors already favour;
/// it never picks a side on its own.
fn volume_factor(ratio: f64, price_bias: f64) -> ConfluenceFactor {
    let (signal, score, desc) = if ratio > HIGH_VOLUME_RATIO && price_bias > 0.0 {
        (Bias::Bullish, 50.0, "high volume confirms buyers")
    } else if ratio > HIGH_VOLUME_RATIO && price_bias < 0.0 {
        (Bias::Bearish, -50.0, "high volume confirms sellers")
    } else if ratio > HIGH_VOLUME_RATIO {
        (Bias::Neutral, 0.0, "high volume without direction")
    } else if ratio < LOW_VOLUME_RATIO {
        (Bias::Neutral, 0.0, "thin volume")
    } else {
        (Bias::Neutral, 0.0, "normal volume")
    };
    ConfluenceFactor::new(
        "Volume",
        VOLUME_WEIGHT,
        signal,
        score,
        format!("Volume {ratio:.2}x average, {desc}"),
    )
}

fn regime_factor(regime: &Regime) -> ConfluenceFactor {
    let (signal, score) = match regime.regime_type {
        RegimeType::StrongTrend => (regime.direction, 80.0 * regime.direction.sign()),
        RegimeType::WeakTrend => (regime.direction, 40.0 * regime.direction.sign()),
        RegimeType::Volatile => (Bias::Neutral, -30.0),
        RegimeType::Ranging => (Bias::Neutral, 0.0),
    };
    ConfluenceFactor::new(
        "Regime",
        REGIME_WEIGHT,
        signal,
        score,
        format!(
            "{} ({}, strength {:.0})",
            regime.regime_type, regime.direction, regime.strength
        ),
    )
}

/// Contrarian: extreme fear is a buying opportunity, extreme greed a warning.
fn sentiment_factor(index: f64) -> ConfluenceFactor {
    let (signal, score, desc) = if index < 25.0 {
        (Bias::Bullish, 60.0, "extreme fear")
    } else if index > 75.0 {
        (Bias::Bearish, -60.0, "extreme greed")
    } else if index < 40.0 {
        (Bias::Bullish, 30.0, "fear")
    } else if index > 60.0 {
        (Bias::Bearish, -30.0, "greed")
    } else {
        (Bias::Neutral, 0.0, "neutral")
    };
    ConfluenceFactor::new(
        "Sentiment",
        SENTIMENT_WEIGHT,
        signal,
        score,
        format!("Fear & Greed {index:.0}, {desc}"),
    )
}
