//! Technical indicator library.
//!
//! Every function here is pure and never fails for data-shape reasons:
//! short histories and zero divisors resolve to documented neutral values.
//! [`IndicatorSnapshot`] bundles the values the signal pipeline consumes,
//! evaluated at the last candle of a series.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod stddev;
pub mod volume;

use serde::{Deserialize, Serialize};

use crate::domain::ohlcv::{closes, volumes, Candle};

pub use adx::adx;
pub use atr::atr;
pub use bollinger::{bollinger_bands, Bollinger};
pub use ema::{ema, sma};
pub use macd::{macd, Macd};
pub use rsi::rsi;
pub use volume::volume_ratio;

pub const TREND_EMA_PERIODS: [usize; 4] = [9, 21, 50, 200];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: Macd,
    pub bollinger: Bollinger,
    pub ema9: f64,
    pub ema21: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub atr: f64,
    pub adx: f64,
    pub volume: f64,
    pub avg_volume: f64,
    pub volume_ratio: f64,
}

impl IndicatorSnapshot {
    /// Evaluates every indicator at the last candle of `candles`.
    ///
    /// Trend EMAs use `min(period, len)` so that a series shorter than 200
    /// bars still gets a long-term baseline (the mean of the available
    /// closes) instead of collapsing onto the last close.
    pub fn compute(candles: &[Candle]) -> Self {
        let closes = closes(candles);
        let volumes = volumes(candles);

        let trend_ema = |period: usize| ema(&closes, period.min(closes.len()));

        Self {
            rsi: rsi(&closes, rsi::DEFAULT_PERIOD),
            macd: macd(&closes),
            bollinger: bollinger_bands(
                &closes,
                bollinger::DEFAULT_PERIOD,
                bollinger::DEFAULT_MULTIPLIER,
            ),
            ema9: trend_ema(TREND_EMA_PERIODS[0]),
            ema21: trend_ema(TREND_EMA_PERIODS[1]),
            ema50: trend_ema(TREND_EMA_PERIODS[2]),
            ema200: trend_ema(TREND_EMA_PERIODS[3]),
            atr: atr(candles, atr::DEFAULT_PERIOD),
            adx: adx(candles, adx::DEFAULT_PERIOD),
            volume: volumes.last().copied().unwrap_or(0.0),
            avg_volume: volume::average_volume(&volumes, volume::DEFAULT_PERIOD),
            volume_ratio: volume_ratio(&volumes, volume::DEFAULT_PERIOD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn make_candles(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close * 1.005,
                low: close * 0.995,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn snapshot_short_history_uses_defaults() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let snap = IndicatorSnapshot::compute(&candles);

        assert_eq!(snap.rsi, rsi::NEUTRAL_RSI);
        assert_eq!(snap.adx, adx::NEUTRAL_ADX);
        assert_eq!(snap.atr, 0.0);
        assert_eq!(snap.bollinger.percent_b, 0.5);
        assert_eq!(snap.macd.histogram, 0.0);
        assert_abs_diff_eq!(snap.volume_ratio, 1.0);
        // All trend EMAs collapse onto the mean of the five closes.
        for v in [snap.ema9, snap.ema21, snap.ema50, snap.ema200] {
            assert_abs_diff_eq!(v, 102.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn snapshot_rising_series_orders_emas() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let snap = IndicatorSnapshot::compute(&make_candles(&closes));
        let price = *closes.last().unwrap();

        assert!(price > snap.ema9);
        assert!(snap.ema9 > snap.ema21);
        assert!(snap.ema21 > snap.ema50);
        assert!(snap.ema50 > snap.ema200);
        assert!(snap.adx > 40.0);
        assert!(snap.atr > 0.0);
    }

    #[test]
    fn snapshot_long_history_uses_full_periods() {
        let closes: Vec<f64> = (0..250).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let snap = IndicatorSnapshot::compute(&make_candles(&closes));
        assert_abs_diff_eq!(snap.ema200, ema(&closes, 200), epsilon = 1e-12);
        assert_abs_diff_eq!(snap.ema9, ema(&closes, 9), epsilon = 1e-12);
    }
}
