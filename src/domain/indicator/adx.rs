//! Directional movement strength (ADX).
//!
//! For each candle after the first:
//! - +DM = up move if it exceeds the down move and is positive, else 0
//! - -DM = down move if it exceeds the up move and is positive, else 0
//! - TR  = true range against the previous close
//!
//! The three series are smoothed with EMA(period), then
//! +DI = 100 × +DM / TR, -DI = 100 × -DM / TR and
//! DX  = |+DI - -DI| / (+DI + -DI) × 100.
//!
//! Returns 25 (neutral) with fewer than `period + 1` candles, when the
//! smoothed true range is zero, or when +DI + -DI is zero.

use super::ema::ema;
use crate::domain::ohlcv::Candle;

pub const DEFAULT_PERIOD: usize = 14;

pub const NEUTRAL_ADX: f64 = 25.0;

pub fn adx(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period + 1 {
        return NEUTRAL_ADX;
    }

    let n = candles.len() - 1;
    let mut plus_dm = Vec::with_capacity(n);
    let mut minus_dm = Vec::with_capacity(n);
    let mut tr = Vec::with_capacity(n);

    for pair in candles.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let up = cur.high - prev.high;
        let down = prev.low - cur.low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        tr.push(cur.true_range(prev.close));
    }

    let smoothed_tr = ema(&tr, period);
    if smoothed_tr <= 0.0 {
        return NEUTRAL_ADX;
    }

    let plus_di = 100.0 * ema(&plus_dm, period) / smoothed_tr;
    let minus_di = 100.0 * ema(&minus_dm, period) / smoothed_tr;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return NEUTRAL_ADX;
    }

    ((plus_di - minus_di).abs() / di_sum * 100.0).clamp(0.0, 100.0)
}
