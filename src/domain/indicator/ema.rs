//! Exponential and simple moving averages.
//!
//! EMA: k = 2/(n+1), seed with the SMA of the first n values, then
//! EMA[i] = V[i]*k + EMA[i-1]*(1-k).
//!
//! Both averages degrade to the last value of the series when it is shorter
//! than the period.

pub fn ema(series: &[f64], period: usize) -> f64 {
    let Some(&last) = series.last() else {
        return 0.0;
    };
    if period == 0 || series.len() < period {
        return last;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut value = series[..period].iter().sum::<f64>() / period as f64;
    for &v in &series[period..] {
        value = v * k + value * (1.0 - k);
    }
    value
}

/// `ema(&series[..=i], period)` for every `i`, computed in one pass.
pub fn ema_series(series: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut value = 0.0;
    let mut sum = 0.0;

    for (i, &v) in series.iter().enumerate() {
        if i < period - 1 {
            sum += v;
            out.push(v);
        } else if i == period - 1 {
            sum += v;
            value = sum / period as f64;
            out.push(value);
        } else {
            value = v * k + value * (1.0 - k);
            out.push(value);
        }
    }
    out
}

pub fn sma(series: &[f64], period: usize) -> f64 {
    let Some(&last) = series.last() else {
        return 0.0;
    };
    if period == 0 || series.len() < period {
        return last;
    }
    series[series.len() - period..].iter().sum::<f64>() / period as f64
}
