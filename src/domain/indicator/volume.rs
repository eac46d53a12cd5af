//! Volume ratio: latest volume over the mean of the trailing volumes.
//!
//! The mean covers the last `min(period, len)` volumes including the latest.
//! A zero mean resolves to 1 (no signal).

pub const DEFAULT_PERIOD: usize = 20;

pub fn average_volume(volumes: &[f64], period: usize) -> f64 {
    if volumes.is_empty() || period == 0 {
        return 0.0;
    }
    let take = period.min(volumes.len());
    volumes[volumes.len() - take..].iter().sum::<f64>() / take as f64
}

pub fn volume_ratio(volumes: &[f64], period: usize) -> f64 {
    let Some(&latest) = volumes.last() else {
        return 1.0;
    };
    let avg = average_volume(volumes, period);
    if avg <= 0.0 {
        return 1.0;
    }
    latest / avg
}
