//! Bar-by-bar backtest of the signal pipeline.
//!
//! Single position, long only. At each bar `i` in `[warmup, len - exit_horizon)`
//! the pipeline sees `candles[..=i]` only. A buy or strong buy opens a long at
//! the close with the signal's stop and second target, then bars
//! `i+1..=i+exit_horizon` are scanned in order:
//! - `low <= stop` closes at the stop (loss); checked first, so a bar that
//!   touches both levels counts as a loss
//! - `high >= target` closes at the target (win)
//! - otherwise the position closes at the horizon bar's close, a win iff
//!   it exits above the entry
//!
//! Equity follows a fixed payoff: 1% of current equity is risked per trade,
//! a win adds twice that, a loss removes it, whatever the actual exit price.
//! After a trade, evaluation resumes at its exit bar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::confluence::Direction;
use crate::domain::error::ConfluenceError;
use crate::domain::metrics::TradeStats;
use crate::domain::ohlcv::Candle;
use crate::domain::signal::{generate_signal, SignalConfig};

pub const RISK_PER_TRADE: f64 = 0.01;
pub const REWARD_MULTIPLE: f64 = 2.0;

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
pub const DEFAULT_WARMUP: usize = 50;
pub const DEFAULT_EXIT_HORIZON: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    pub warmup: usize,
    pub exit_horizon: usize,
    pub signal: SignalConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            warmup: DEFAULT_WARMUP,
            exit_horizon: DEFAULT_EXIT_HORIZON,
            signal: SignalConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOutcome {
    Win,
    Loss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestTrade {
    pub date: DateTime<Utc>,
    pub exit_date: DateTime<Utc>,
    pub direction: Direction,
    pub entry: f64,
    pub exit: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub outcome: TradeOutcome,
    pub pnl_percent: f64,
    pub pnl_amount: f64,
    pub equity_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_profit: f64,
    pub max_drawdown: f64,
    pub initial_equity: f64,
    pub final_equity: f64,
    /// `None` when there were wins and no losses.
    pub profit_factor: Option<f64>,
    pub trades: Vec<BacktestTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

struct Exit {
    index: usize,
    price: f64,
    outcome: TradeOutcome,
}

pub fn run_backtest(
    candles: &[Candle],
    config: &BacktestConfig,
) -> Result<BacktestResult, ConfluenceError> {
    validate(config)?;

    let mut equity = config.initial_balance;
    let mut peak_equity = equity;
    let mut max_drawdown = 0.0_f64;
    let mut trades = Vec::new();
    let mut equity_curve = Vec::new();

    let end = candles.len().saturating_sub(config.exit_horizon);
    let mut i = config.warmup;

    if i < end {
        equity_curve.push(EquityPoint {
            timestamp: candles[i].timestamp,
            equity,
        });
    }

    while i < end {
        let signal = generate_signal(&candles[..=i], &config.signal)?;
        if !signal.recommendation.is_tradable_long() {
            i += 1;
            continue;
        }

        let entry_candle = &candles[i];
        let entry = entry_candle.close;
        let stop = signal.stop_loss;
        let target = signal.take_profit_2;
        let exit = scan_exit(candles, i, config.exit_horizon, entry, stop, target);

        let risk_amount = equity * RISK_PER_TRADE;
        let pnl_amount = match exit.outcome {
            TradeOutcome::Win => REWARD_MULTIPLE * risk_amount,
            TradeOutcome::Loss => -risk_amount,
        };
        equity += pnl_amount;
        peak_equity = peak_equity.max(equity);
        if peak_equity > 0.0 {
            max_drawdown = max_drawdown.max((peak_equity - equity) / peak_equity);
        }

        let exit_candle = &candles[exit.index];
        debug!(
            entry_date = %entry_candle.timestamp,
            exit_date = %exit_candle.timestamp,
            entry,
            exit = exit.price,
            outcome = ?exit.outcome,
            equity,
            "closed simulated trade"
        );

        trades.push(BacktestTrade {
            date: entry_candle.timestamp,
            exit_date: exit_candle.timestamp,
            direction: Direction::Long,
            entry,
            exit: exit.price,
            stop_loss: stop,
            take_profit: target,
            outcome: exit.outcome,
            pnl_percent: (exit.price - entry) / entry * 100.0,
            pnl_amount,
            equity_after: equity,
        });
        equity_curve.push(EquityPoint {
            timestamp: exit_candle.timestamp,
            equity,
        });

        i = exit.index;
    }

    let stats = TradeStats::from_pnl(trades.iter().map(|t| t.pnl_amount));

    info!(
        candles = candles.len(),
        trades = trades.len(),
        final_equity = equity,
        max_drawdown,
        "backtest complete"
    );

    Ok(BacktestResult {
        total_trades: trades.len(),
        wins: stats.wins,
        losses: stats.losses,
        win_rate: stats.win_rate,
        total_profit: equity - config.initial_balance,
        max_drawdown,
        initial_equity: config.initial_balance,
        final_equity: equity,
        profit_factor: stats.profit_factor,
        trades,
        equity_curve,
    })
}

fn scan_exit(
    candles: &[Candle],
    entry_index: usize,
    horizon: usize,
    entry: f64,
    stop: f64,
    target: f64,
) -> Exit {
    let last = entry_index + horizon;
    for (index, candle) in candles
        .iter()
        .enumerate()
        .take(last + 1)
        .skip(entry_index + 1)
    {
        if candle.low <= stop {
            return Exit {
                index,
                price: stop,
                outcome: TradeOutcome::Loss,
            };
        }
        if candle.high >= target {
            return Exit {
                index,
                price: target,
                outcome: TradeOutcome::Win,
            };
        }
    }

    let price = candles[last].close;
    Exit {
        index: last,
        price,
        outcome: if price > entry {
            TradeOutcome::Win
        } else {
            TradeOutcome::Loss
        },
    }
}

fn validate(config: &BacktestConfig) -> Result<(), ConfluenceError> {
    let invalid = |key: &str, reason: &str| ConfluenceError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    };
    if config.initial_balance <= 0.0 || !config.initial_balance.is_finite() {
        return Err(invalid("initial_balance", "must be a positive number"));
    }
    if config.exit_horizon == 0 {
        return Err(invalid("exit_horizon", "must be at least 1"));
    }
    Ok(())
}
