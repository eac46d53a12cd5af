//! End-to-end tests over the signal pipeline and backtest simulator.
//!
//! Tests cover:
//! - Trending, flat and very short series through `generate_signal`
//! - Backtests with and without qualifying entries
//! - Determinism of repeated runs
//! - Multi-symbol loading through a mock candle port

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use confluence::domain::backtest::{run_backtest, BacktestConfig, BacktestResult, TradeOutcome};
use confluence::domain::bias::Bias;
use confluence::domain::confluence::Direction;
use confluence::domain::indicator::{adx, rsi};
use confluence::domain::recommendation::Recommendation;
use confluence::domain::regime::RegimeType;
use confluence::domain::signal::{generate_signal, SignalConfig};
use confluence::domain::universe::{load_universe, SkipReason};

mod signal_pipeline {
    use super::*;

    #[test]
    fn rising_series_is_a_long_strong_trend() {
        let signal = generate_signal(&rising_candles(60), &SignalConfig::default()).unwrap();

        assert_eq!(signal.regime.regime_type, RegimeType::StrongTrend);
        assert_eq!(signal.regime.direction, Bias::Bullish);
        assert_eq!(signal.direction, Direction::Long);
        assert!(matches!(
            signal.recommendation,
            Recommendation::Buy | Recommendation::StrongBuy
        ));
        assert!(signal.risk_reward_ratio >= 1.5);
        assert!(signal.stop_loss < signal.entry_price);
        assert!(signal.take_profit_1 < signal.take_profit_2);
        assert!(signal.take_profit_2 < signal.take_profit_3);
    }

    #[test]
    fn falling_series_leans_bearish() {
        let signal = generate_signal(&falling_candles(60), &SignalConfig::default()).unwrap();

        assert_eq!(signal.regime.regime_type, RegimeType::StrongTrend);
        assert_eq!(signal.regime.direction, Bias::Bearish);
        assert!(signal.score < 0.0);
        assert_ne!(signal.direction, Direction::Long);
        assert!(!signal.recommendation.is_tradable_long());
    }

    #[test]
    fn flat_series_is_ranging() {
        let signal = generate_signal(&flat_candles(60), &SignalConfig::default()).unwrap();

        assert_abs_diff_eq!(signal.indicators.rsi, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.indicators.adx, 25.0, epsilon = 1e-9);
        assert_eq!(signal.regime.regime_type, RegimeType::Ranging);
        assert!(matches!(
            signal.recommendation,
            Recommendation::Hold | Recommendation::NoTrade
        ));
    }

    #[test]
    fn five_bars_fall_back_to_defaults() {
        let candles = candles_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let signal = generate_signal(&candles, &SignalConfig::default()).unwrap();
        let ind = &signal.indicators;

        assert_eq!(ind.rsi, rsi::NEUTRAL_RSI);
        assert_eq!(ind.adx, adx::NEUTRAL_ADX);
        assert_eq!(ind.atr, 0.0);
        assert_eq!(ind.macd.value, 0.0);
        assert_eq!(ind.macd.histogram, 0.0);
        assert_abs_diff_eq!(ind.bollinger.middle, 104.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ind.bollinger.percent_b, 0.5, epsilon = 1e-9);
        assert_eq!(ind.volume_ratio, 1.0);
        assert_eq!(signal.recommendation, Recommendation::NoTrade);
    }

    #[test]
    fn sentiment_moves_score_but_not_regime() {
        let candles = rising_candles(60);
        let fearful = generate_signal(
            &candles,
            &SignalConfig {
                sentiment: 10.0,
                ..SignalConfig::default()
            },
        )
        .unwrap();
        let greedy = generate_signal(
            &candles,
            &SignalConfig {
                sentiment: 90.0,
                ..SignalConfig::default()
            },
        )
        .unwrap();

        assert_eq!(fearful.regime, greedy.regime);
        assert_ne!(fearful.score, greedy.score);
    }

    #[test]
    fn signals_are_deterministic() {
        let candles = rising_candles(80);
        let a = generate_signal(&candles, &SignalConfig::default()).unwrap();
        let b = generate_signal(&candles, &SignalConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}

mod backtest_simulation {
    use super::*;

    #[test]
    fn flat_series_has_no_trades() {
        let result = run_backtest(&flat_candles(100), &BacktestConfig::default()).unwrap();

        assert_eq!(result.total_trades, 0);
        assert_eq!(result.final_equity, result.initial_equity);
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.profit_factor, Some(0.0));
    }

    #[test]
    fn falling_series_has_no_long_trades() {
        let result = run_backtest(&falling_candles(100), &BacktestConfig::default()).unwrap();

        assert_eq!(result.total_trades, 0);
        assert_eq!(result.final_equity, 10_000.0);
        assert_eq!(result.total_profit, 0.0);
    }

    #[test]
    fn steady_uptrend_wins_every_trade() {
        let result = run_backtest(&rising_candles(100), &BacktestConfig::default()).unwrap();

        assert!(result.total_trades > 0);
        assert_eq!(result.wins, result.total_trades);
        assert_eq!(result.losses, 0);
        assert_eq!(result.win_rate, 1.0);
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.profit_factor, None);
        assert!(result.final_equity > result.initial_equity);
        assert_abs_diff_eq!(
            result.total_profit,
            result.final_equity - result.initial_equity,
            epsilon = 1e-9
        );
        assert_eq!(result.equity_curve.len(), result.total_trades + 1);
    }

    #[test]
    fn trades_never_overlap() {
        let result = run_backtest(&rising_candles(120), &BacktestConfig::default()).unwrap();

        for pair in result.trades.windows(2) {
            assert!(pair[1].date >= pair[0].exit_date);
        }
        for trade in &result.trades {
            assert_eq!(trade.direction, Direction::Long);
            assert_eq!(trade.outcome, TradeOutcome::Win);
            assert!(trade.exit_date > trade.date);
        }
    }

    #[test]
    fn winning_trade_pays_twice_the_risk() {
        let result = run_backtest(&rising_candles(100), &BacktestConfig::default()).unwrap();
        let first = &result.trades[0];

        assert_abs_diff_eq!(first.pnl_amount, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.equity_after, 10_200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.exit, first.take_profit, epsilon = 1e-9);
    }

    /// `rising` bars compounding 1% each, then ten bars 20% below the last.
    fn rise_then_crash(rising: usize) -> Vec<Candle> {
        let mut closes = compounding_closes(rising, 0.01);
        let crash = closes[rising - 1] * 0.8;
        closes.extend(std::iter::repeat(crash).take(10));
        candles_from_closes(&closes)
    }

    #[test]
    fn gap_below_stop_loses_one_risk_unit() {
        // Only bar 50 is evaluated; it buys and bar 51 gaps through the stop.
        let candles = rise_then_crash(51);
        let result = run_backtest(&candles, &BacktestConfig::default()).unwrap();

        assert_eq!(result.total_trades, 1);
        assert_eq!(result.wins, 0);
        assert_eq!(result.losses, 1);
        assert_eq!(result.win_rate, 0.0);

        let trade = &result.trades[0];
        assert_eq!(trade.outcome, TradeOutcome::Loss);
        assert_eq!(trade.date, candles[50].timestamp);
        assert_eq!(trade.exit_date, candles[51].timestamp);
        assert_eq!(trade.exit, trade.stop_loss);
        assert!(trade.stop_loss < trade.entry);
        assert_abs_diff_eq!(trade.pnl_amount, -0.01 * 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(trade.equity_after, 9_900.0, epsilon = 1e-9);

        assert_abs_diff_eq!(result.final_equity, 9_900.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_profit, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.max_drawdown, 0.01, epsilon = 1e-12);
        assert_eq!(result.profit_factor, Some(0.0));
        assert_eq!(result.equity_curve.len(), 2);
    }

    #[test]
    fn loss_after_wins_draws_down_from_the_peak() {
        let candles = rise_then_crash(60);
        let result = run_backtest(&candles, &BacktestConfig::default()).unwrap();

        let outcomes: Vec<TradeOutcome> = result.trades.iter().map(|t| t.outcome).collect();
        assert_eq!(
            outcomes,
            vec![TradeOutcome::Win, TradeOutcome::Win, TradeOutcome::Loss]
        );
        assert_eq!(result.wins, 2);
        assert_eq!(result.losses, 1);

        let peak = result.trades[1].equity_after;
        assert_abs_diff_eq!(peak, 10_404.0, epsilon = 1e-9);
        let loss = &result.trades[2];
        assert_eq!(loss.exit, loss.stop_loss);
        assert_abs_diff_eq!(loss.pnl_amount, -0.01 * peak, epsilon = 1e-9);
        assert_abs_diff_eq!(result.final_equity, 10_299.96, epsilon = 1e-9);

        // 1% off the 10,404 peak, not off the starting balance.
        assert_abs_diff_eq!(result.max_drawdown, 0.01, epsilon = 1e-12);
        let profit_factor = result.profit_factor.unwrap();
        assert_abs_diff_eq!(profit_factor, 404.0 / 104.04, epsilon = 1e-9);
        assert!(profit_factor.is_finite());
    }

    #[test]
    fn all_wins_result_survives_json() {
        let result = run_backtest(&rising_candles(120), &BacktestConfig::default()).unwrap();
        assert_eq!(result.profit_factor, None);

        let json = serde_json::to_string(&result).unwrap();
        let loaded: BacktestResult = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.profit_factor, None);
        assert_eq!(loaded.total_trades, result.total_trades);
        assert_eq!(loaded.trades.len(), result.trades.len());
        assert_eq!(loaded.trades[0].direction, Direction::Long);
        assert_abs_diff_eq!(loaded.final_equity, result.final_equity, epsilon = 1e-9);
    }

    #[test]
    fn backtest_is_deterministic() {
        let candles = rising_candles(120);
        let config = BacktestConfig::default();
        let a = run_backtest(&candles, &config).unwrap();
        let b = run_backtest(&candles, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn warmup_beyond_history_yields_empty_result() {
        let config = BacktestConfig {
            warmup: 500,
            ..BacktestConfig::default()
        };
        let result = run_backtest(&rising_candles(100), &config).unwrap();
        assert_eq!(result.total_trades, 0);
        assert!(result.equity_curve.is_empty());
    }
}

mod universe_loading {
    use super::*;

    #[test]
    fn partial_universe_proceeds() {
        let port = MockCandlePort::new()
            .with_candles("BTCUSD", rising_candles(60))
            .with_candles("ETHUSD", flat_candles(20))
            .with_error("SOLUSD", "connection reset");

        let symbols: Vec<String> = ["BTCUSD", "ETHUSD", "SOLUSD"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let universe = load_universe(&port, &symbols, None, 50).unwrap();

        assert_eq!(universe.loaded.len(), 1);
        assert_eq!(universe.loaded[0].symbol, "BTCUSD");
        assert_eq!(universe.skipped.len(), 2);
        assert_eq!(
            universe.skipped[0].reason,
            SkipReason::InsufficientBars { bars: 20 }
        );
        assert!(matches!(universe.skipped[1].reason, SkipReason::Unavailable(ref r) if r.contains("connection reset")));
    }

    #[test]
    fn every_loaded_symbol_produces_a_signal() {
        let port = MockCandlePort::new()
            .with_candles("BTCUSD", rising_candles(60))
            .with_candles("ETHUSD", falling_candles(60));
        let symbols = vec!["BTCUSD".to_string(), "ETHUSD".to_string()];
        let universe = load_universe(&port, &symbols, None, 50).unwrap();

        let directions: Vec<Direction> = universe
            .loaded
            .iter()
            .map(|l| {
                generate_signal(&l.candles, &SignalConfig::default())
                    .unwrap()
                    .direction
            })
            .collect();
        assert_eq!(directions[0], Direction::Long);
        assert_ne!(directions[1], Direction::Long);
    }
}
