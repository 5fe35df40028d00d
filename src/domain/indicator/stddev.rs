//! Rolling standard deviation of closing prices.
//!
//! Sample standard deviation (divides by n-1) over a window of closes.
//! Callers only pass windows of two or more bars.

use crate::domain::ohlcv::PriceBar;

/// (mean, sample stddev) of the closes in `window`.
pub(crate) fn window_stats(window: &[PriceBar]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean: f64 = window.iter().map(|b| b.close).sum::<f64>() / n;
    let variance: f64 = window
        .iter()
        .map(|b| {
            let diff = b.close - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    (mean, variance.sqrt())
}
