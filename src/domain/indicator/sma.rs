//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{build_series, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let mut window_sum = 0.0;

    build_series(bars.iter().map(|b| b.date), IndicatorType::Sma(period), |i| {
        if period == 0 {
            return None;
        }
        window_sum += bars[i].close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }
        (i + 1 >= period).then(|| IndicatorValue::Simple(window_sum / period as f64))
    })
}
