//! Signal pipeline: indicators → regime → confluence → risk → recommendation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::confluence::{
    normalize_sentiment, score_confluence, ConfluenceFactor, Direction, NEUTRAL_SENTIMENT,
};
use crate::domain::error::ConfluenceError;
use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::ohlcv::Candle;
use crate::domain::recommendation::{build_reasoning, recommend, Recommendation};
use crate::domain::regime::{classify_regime, Regime};
use crate::domain::risk::{plan_risk, RiskPlan, DEFAULT_MAX_RISK_PERCENT};

/// Minimum history callers should require before trusting a signal.
pub const DEFAULT_MIN_CANDLES: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    /// Fear & Greed index in [0, 100].
    pub sentiment: f64,
    pub max_risk_percent: f64,
    /// Not enforced by [`generate_signal`]; applied by callers.
    pub min_candles: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sentiment: NEUTRAL_SENTIMENT,
            max_risk_percent: DEFAULT_MAX_RISK_PERCENT,
            min_candles: DEFAULT_MIN_CANDLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub direction: Direction,
    pub confidence: f64,
    pub factors: Vec<ConfluenceFactor>,
    pub recommendation: Recommendation,
    pub reasoning: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
    pub take_profit_3: f64,
    pub risk_reward_ratio: f64,
    pub position_size_percent: f64,
    pub max_risk_percent: f64,
    pub regime: Regime,
    pub indicators: IndicatorSnapshot,
}

impl Signal {
    pub fn risk_plan(&self) -> RiskPlan {
        RiskPlan {
            entry_price: self.entry_price,
            stop_loss: self.stop_loss,
            take_profit_1: self.take_profit_1,
            take_profit_2: self.take_profit_2,
            take_profit_3: self.take_profit_3,
            risk_reward_ratio: self.risk_reward_ratio,
            position_size_percent: self.position_size_percent,
            max_risk_percent: self.max_risk_percent,
        }
    }
}

/// Evaluates the full pipeline at the last candle of `candles`.
///
/// Short histories never fail: indicators fall back to their neutral
/// defaults. Only an empty series is rejected.
pub fn generate_signal(
    candles: &[Candle],
    config: &SignalConfig,
) -> Result<Signal, ConfluenceError> {
    let Some(last) = candles.last() else {
        return Err(ConfluenceError::EmptyCandles);
    };
    let price = last.close;

    let indicators = IndicatorSnapshot::compute(candles);
    let regime = classify_regime(&indicators, price);
    let confluence = score_confluence(
        &indicators,
        &regime,
        price,
        normalize_sentiment(config.sentiment),
    );
    let plan = plan_risk(
        confluence.direction,
        price,
        indicators.atr,
        confluence.confidence,
        config.max_risk_percent,
    );
    let recommendation = recommend(
        confluence.score,
        confluence.confidence,
        plan.risk_reward_ratio,
        &regime,
    );
    let reasoning = build_reasoning(
        recommendation,
        &confluence.factors,
        &regime,
        plan.risk_reward_ratio,
    );

    Ok(Signal {
        timestamp: last.timestamp,
        score: confluence.score,
        direction: confluence.direction,
        confidence: confluence.confidence,
        factors: confluence.factors,
        recommendation,
        reasoning,
        entry_price: plan.entry_price,
        stop_loss: plan.stop_loss,
        take_profit_1: plan.take_profit_1,
        take_profit_2: plan.take_profit_2,
        take_profit_3: plan.take_profit_3,
        risk_reward_ratio: plan.risk_reward_ratio,
        position_size_percent: plan.position_size_percent,
        max_risk_percent: plan.max_risk_percent,
        regime,
        indicators,
    })
}
