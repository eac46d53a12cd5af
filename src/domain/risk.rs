//! ATR-based trade plan.
//!
//! Stop sits 1.5 ATR against the entry; targets at 1.5, 3 and 4.5 ATR in
//! favour. Neutral signals get the long-side levels for display only.

use serde::{Deserialize, Serialize};

use crate::domain::confluence::Direction;

/// Default cap on account equity risked per trade, in percent.
pub const DEFAULT_MAX_RISK_PERCENT: f64 = 1.0;

const STOP_ATR: f64 = 1.5;
const TARGET_ATR: [f64; 3] = [1.5, 3.0, 4.5];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPlan {
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
    pub take_profit_3: f64,
    pub risk_reward_ratio: f64,
    pub position_size_percent: f64,
    pub max_risk_percent: f64,
}

impl RiskPlan {
    /// Suggested quantity for an account of `balance`, sized so that a stop-out
    /// loses `position_size_percent` of it. Zero when the stop sits at the entry.
    pub fn units_for_balance(&self, balance: f64) -> f64 {
        let stop_distance = (self.entry_price - self.stop_loss).abs();
        if stop_distance == 0.0 {
            return 0.0;
        }
        balance * self.position_size_percent / 100.0 / stop_distance
    }
}

pub fn plan_risk(
    direction: Direction,
    entry_price: f64,
    atr: f64,
    confidence: f64,
    max_risk_percent: f64,
) -> RiskPlan {
    let side = match direction {
        Direction::Long | Direction::Neutral => 1.0,
        Direction::Short => -1.0,
    };

    let stop_loss = entry_price - side * STOP_ATR * atr;
    let [tp1, tp2, tp3] = TARGET_ATR.map(|m| entry_price + side * m * atr);

    let risk = (entry_price - stop_loss).abs();
    let risk_reward_ratio = if risk > 0.0 {
        (tp2 - entry_price).abs() / risk
    } else {
        0.0
    };

    let scale = (confidence / 100.0).clamp(0.0, 1.0);

    RiskPlan {
        entry_price,
        stop_loss,
        take_profit_1: tp1,
        take_profit_2: tp2,
        take_profit_3: tp3,
        risk_reward_ratio,
        position_size_percent: max_risk_percent * scale,
        max_risk_percent,
    }
}
