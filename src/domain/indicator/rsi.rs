//! RSI (Relative Strength Index).
//!
//! Average gain and loss are simple rolling means of the last n close-to-close
//! changes (no Wilder smoothing).
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes).

use crate::domain::indicator::{build_series, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    build_series(bars.iter().map(|b| b.date), IndicatorType::Rsi(period), |i| {
        if period == 0 || i < period {
            return None;
        }

        let (gains, losses) = ((i + 1 - period)..=i).fold((0.0, 0.0), |(g, l), j| {
            let change = bars[j].close - bars[j - 1].close;
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });
        let avg_gain = gains / period as f64;
        let avg_loss = losses / period as f64;

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        Some(IndicatorValue::Simple(rsi))
    })
}
