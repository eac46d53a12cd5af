//! Recommendation policy and the human-readable rationale.
//!
//! Rules, first match wins:
//! 1. risk/reward < 1.5 → no trade
//! 2. volatile regime without direction → no trade
//! 3. confidence < 55 → hold
//! 4. score > 60 and confidence ≥ 70 → strong buy; score > 30 and confidence ≥ 60 → buy
//! 5. score < -60 and confidence ≥ 70 → strong sell; score < -30 and confidence ≥ 60 → sell
//! 6. otherwise hold

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::bias::Bias;
use crate::domain::confluence::ConfluenceFactor;
use crate::domain::regime::{Regime, RegimeType};

pub const MIN_RISK_REWARD: f64 = 1.5;
const MIN_CONFIDENCE: f64 = 55.0;
const DOMINANT_FACTORS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
    NoTrade,
}

impl Recommendation {
    /// Recommendations the backtest opens a long position on.
    pub fn is_tradable_long(self) -> bool {
        matches!(self, Recommendation::Buy | Recommendation::StrongBuy)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongBuy => write!(f, "strong_buy"),
            Recommendation::Buy => write!(f, "buy"),
            Recommendation::Hold => write!(f, "hold"),
            Recommendation::Sell => write!(f, "sell"),
            Recommendation::StrongSell => write!(f, "strong_sell"),
            Recommendation::NoTrade => write!(f, "no_trade"),
        }
    }
}

pub fn recommend(score: f64, confidence: f64, risk_reward: f64, regime: &Regime) -> Recommendation {
    if risk_reward < MIN_RISK_REWARD || risk_reward.is_nan() {
        return Recommendation::NoTrade;
    }
    if regime.regime_type == RegimeType::Volatile && regime.direction == Bias::Neutral {
        return Recommendation::NoTrade;
    }
    if confidence < MIN_CONFIDENCE {
        return Recommendation::Hold;
    }
    if score > 60.0 && confidence >= 70.0 {
        return Recommendation::StrongBuy;
    }
    if score > 30.0 && confidence >= 60.0 {
        return Recommendation::Buy;
    }
    if score < -60.0 && confidence >= 70.0 {
        return Recommendation::StrongSell;
    }
    if score < -30.0 && confidence >= 60.0 {
        return Recommendation::Sell;
    }
    Recommendation::Hold
}

/// Describes a decision; never feeds back into it.
pub fn build_reasoning(
    recommendation: Recommendation,
    factors: &[ConfluenceFactor],
    regime: &Regime,
    risk_reward: f64,
) -> String {
    let bullish = dominant(factors, Bias::Bullish);
    let bearish = dominant(factors, Bias::Bearish);

    let mut parts = vec![format!("Recommendation {recommendation}.")];
    if !bullish.is_empty() {
        parts.push(format!("Bullish: {}.", bullish.join(", ")));
    }
    if !bearish.is_empty() {
        parts.push(format!("Bearish: {}.", bearish.join(", ")));
    }
    if bullish.is_empty() && bearish.is_empty() {
        parts.push("No directional factors.".to_string());
    }
    parts.push(format!(
        "Regime: {} ({}, strength {:.0}).",
        regime.regime_type, regime.direction, regime.strength
    ));
    parts.push(format!("Risk/reward {risk_reward:.2}."));

    match recommendation {
        Recommendation::NoTrade if risk_reward < MIN_RISK_REWARD => {
            parts.push(format!("Below the {MIN_RISK_REWARD:.1} minimum."));
        }
        Recommendation::NoTrade => parts.push("Volatile market without direction.".to_string()),
        _ => {}
    }

    parts.join(" ")
}

fn dominant(factors: &[ConfluenceFactor], side: Bias) -> Vec<String> {
    let mut matching: Vec<&ConfluenceFactor> =
        factors.iter().filter(|f| f.signal == side).collect();
    matching.sort_by(|a, b| {
        b.weighted_score()
            .abs()
            .total_cmp(&a.weighted_score().abs())
    });
    matching
        .into_iter()
        .take(DOMINANT_FACTORS)
        .map(|f| f.name.clone())
        .collect()
}
