//! Bollinger Bands.
//!
//! - Middle: SMA over n closes
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation, matching [`super::stddev`].
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::stddev::window_stats;
use crate::domain::indicator::{build_series, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_bollinger(bars: &[PriceBar], period: usize, stddev_mult: f64) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult,
    };

    build_series(bars.iter().map(|b| b.date), indicator_type, |i| {
        if period < 2 || i + 1 < period {
            return None;
        }
        let (middle, stddev) = window_stats(&bars[i + 1 - period..=i]);
        Some(IndicatorValue::Bollinger {
            upper: middle + stddev_mult * stddev,
            middle,
            lower: middle - stddev_mult * stddev,
        })
    })
}
