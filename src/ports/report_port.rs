//! Output rendering port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ConfluenceError;
use crate::domain::signal::Signal;

/// Port for rendering signals and backtest results for display.
pub trait ReportPort {
    fn render_signal(&self, symbol: &str, signal: &Signal) -> Result<String, ConfluenceError>;

    fn render_backtest(
        &self,
        symbol: &str,
        result: &BacktestResult,
    ) -> Result<String, ConfluenceError>;

    /// Default implementation: one rendered signal per symbol, blank-line separated.
    fn render_scan(&self, signals: &[(String, Signal)]) -> Result<String, ConfluenceError> {
        let rendered = signals
            .iter()
            .map(|(symbol, signal)| self.render_signal(symbol, signal))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join("\n"))
    }
}
