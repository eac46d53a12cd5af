//! JSON report adapter.

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ConfluenceError;
use crate::domain::signal::Signal;
use crate::ports::report_port::ReportPort;

pub struct JsonReport;

#[derive(Serialize)]
struct Tagged<'a, T> {
    symbol: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

impl ReportPort for JsonReport {
    fn render_signal(&self, symbol: &str, signal: &Signal) -> Result<String, ConfluenceError> {
        Ok(serde_json::to_string_pretty(&Tagged {
            symbol,
            body: signal,
        })?)
    }

    fn render_backtest(
        &self,
        symbol: &str,
        result: &BacktestResult,
    ) -> Result<String, ConfluenceError> {
        Ok(serde_json::to_string_pretty(&Tagged {
            symbol,
            body: result,
        })?)
    }

    fn render_scan(&self, signals: &[(String, Signal)]) -> Result<String, ConfluenceError> {
        let tagged: Vec<Tagged<'_, Signal>> = signals
            .iter()
            .map(|(symbol, signal)| Tagged {
                symbol: symbol.as_str(),
                body: signal,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&tagged)?)
    }
}
