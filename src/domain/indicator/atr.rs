//! Average True Range.
//!
//! TR[i] = max(H[i] - L[i], |H[i] - C[i-1]|, |L[i] - C[i-1]|), with
//! TR[0] = H[0] - L[0]. ATR(n)[i] is the simple mean of the last n true ranges.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{build_series, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

fn true_range(bars: &[PriceBar], i: usize) -> f64 {
    let bar = &bars[i];
    let range = bar.high - bar.low;
    match i.checked_sub(1).map(|p| bars[p].close) {
        Some(prev_close) => range
            .max((bar.high - prev_close).abs())
            .max((bar.low - prev_close).abs()),
        None => range,
    }
}

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let mut window_sum = 0.0;

    build_series(bars.iter().map(|b| b.date), IndicatorType::Atr(period), |i| {
        if period == 0 {
            return None;
        }
        window_sum += true_range(bars, i);
        if i >= period {
            window_sum -= true_range(bars, i - period);
        }
        (i + 1 >= period).then(|| IndicatorValue::Simple(window_sum / period as f64))
    })
}
