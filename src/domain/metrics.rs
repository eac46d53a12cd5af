//! Trade statistics for backtest results.

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub wins: usize,
    pub losses: usize,
    /// Fraction of trades that were wins, 0 with no trades.
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// gross profit / gross loss; `None` with wins and no losses, 0 with no wins.
    pub profit_factor: Option<f64>,
}

impl TradeStats {
    /// Classifies each P&L amount: positive is a win, anything else a loss.
    pub fn from_pnl<I>(pnl: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;

        for amount in pnl {
            if amount > 0.0 {
                wins += 1;
                gross_profit += amount;
            } else {
                losses += 1;
                gross_loss += amount.abs();
            }
        }

        let total = wins + losses;
        let win_rate = if total > 0 {
            wins as f64 / total as f64
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            Some(gross_profit / gross_loss)
        } else if gross_profit > 0.0 {
            None
        } else {
            Some(0.0)
        };

        TradeStats {
            wins,
            losses,
            win_rate,
            gross_profit,
            gross_loss,
            profit_factor,
        }
    }
}
