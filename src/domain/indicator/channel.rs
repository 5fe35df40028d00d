//! Price channels: rolling highest high and lowest low.
//!
//! HIGHEST(n)[i] = max(H[i-n+1..=i]), LOWEST(n)[i] = min(L[i-n+1..=i]).
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{build_series, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_highest(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    rolling_extreme(bars, IndicatorType::Highest(period), period, |b| b.high, f64::max)
}

pub fn calculate_lowest(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    rolling_extreme(bars, IndicatorType::Lowest(period), period, |b| b.low, f64::min)
}

fn rolling_extreme(
    bars: &[PriceBar],
    indicator_type: IndicatorType,
    period: usize,
    field: fn(&PriceBar) -> f64,
    pick: fn(f64, f64) -> f64,
) -> IndicatorSeries {
    build_series(bars.iter().map(|b| b.date), indicator_type, |i| {
        if period == 0 || i + 1 < period {
            return None;
        }
        bars[i + 1 - period..=i]
            .iter()
            .map(field)
            .reduce(pick)
            .map(IndicatorValue::Simple)
    })
}
