//! Plain-text report adapter for terminal output.

use std::fmt::Write;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ConfluenceError;
use crate::domain::signal::Signal;
use crate::ports::report_port::ReportPort;

pub struct TextReport;

impl ReportPort for TextReport {
    fn render_signal(&self, symbol: &str, signal: &Signal) -> Result<String, ConfluenceError> {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{symbol} @ {}  {}  score {:+.1}  confidence {:.0}%  direction {}",
            signal.timestamp.format("%Y-%m-%d %H:%M"),
            signal.recommendation,
            signal.score,
            signal.confidence,
            signal.direction,
        );
        let _ = writeln!(
            out,
            "  entry {:.4}  stop {:.4}  targets {:.4} / {:.4} / {:.4}  R:R {:.2}",
            signal.entry_price,
            signal.stop_loss,
            signal.take_profit_1,
            signal.take_profit_2,
            signal.take_profit_3,
            signal.risk_reward_ratio,
        );
        let _ = writeln!(
            out,
            "  position size {:.2}% (max {:.2}%)",
            signal.position_size_percent, signal.max_risk_percent,
        );
        for factor in &signal.factors {
            let _ = writeln!(
                out,
                "  {:<16} {:<8} {:>+6.1} x{:<3} {}",
                factor.name,
                factor.signal.to_string(),
                factor.score,
                factor.weight,
                factor.description,
            );
        }
        let _ = writeln!(out, "  {}", signal.reasoning);
        Ok(out)
    }

    fn render_backtest(
        &self,
        symbol: &str,
        result: &BacktestResult,
    ) -> Result<String, ConfluenceError> {
        let mut out = String::new();
        let profit_factor = match result.profit_factor {
            Some(pf) => format!("{pf:.2}"),
            None => "n/a (no losses)".to_string(),
        };
        let _ = writeln!(out, "Backtest {symbol}");
        let _ = writeln!(
            out,
            "  trades {}  wins {}  losses {}  win rate {:.1}%",
            result.total_trades,
            result.wins,
            result.losses,
            result.win_rate * 100.0,
        );
        let _ = writeln!(
            out,
            "  equity {:.2} -> {:.2}  profit {:+.2}  max drawdown {:.2}%  profit factor {}",
            result.initial_equity,
            result.final_equity,
            result.total_profit,
            result.max_drawdown * 100.0,
            profit_factor,
        );
        for trade in &result.trades {
            let _ = writeln!(
                out,
                "  {} -> {}  {} {:.4} -> {:.4}  {:?}  {:+.2}%",
                trade.date.format("%Y-%m-%d"),
                trade.exit_date.format("%Y-%m-%d"),
                trade.direction,
                trade.entry,
                trade.exit,
                trade.outcome,
                trade.pnl_percent,
            );
        }
        Ok(out)
    }
}
