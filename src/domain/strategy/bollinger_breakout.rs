//! Bollinger band breakout.
//!
//! Enter when the close breaks above the upper band (it was at or below the
//! band on the previous bar); exit once the close drops below the middle band.

use std::collections::BTreeMap;

use super::{annotate, SignalProvider};
use crate::domain::error::QuantdashError;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::ohlcv::{PriceBar, SignalBar};

pub const NAME: &str = "bollinger_breakout";

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBreakout {
    period: usize,
    std_dev: f64,
}

impl Default for BollingerBreakout {
    fn default() -> Self {
        BollingerBreakout {
            period: 20,
            std_dev: 2.0,
        }
    }
}

impl BollingerBreakout {
    pub fn new(period: usize, std_dev: f64) -> Result<Self, QuantdashError> {
        if period < 2 {
            return Err(QuantdashError::invalid_parameter(
                "period",
                "band period must be at least 2",
            ));
        }
        if !std_dev.is_finite() || std_dev <= 0.0 {
            return Err(QuantdashError::invalid_parameter(
                "std_dev",
                format!("must be positive, got {std_dev}"),
            ));
        }
        Ok(BollingerBreakout { period, std_dev })
    }
}

impl SignalProvider for BollingerBreakout {
    fn name(&self) -> &'static str {
        NAME
    }

    fn parameters(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([("period", self.period as f64), ("std_dev", self.std_dev)])
    }

    fn signals(&self, bars: &[PriceBar]) -> Vec<SignalBar> {
        let bands = calculate_bollinger(bars, self.period, self.std_dev);

        annotate(bars, |i| {
            let Some((upper, middle, _)) = bands.bands_at(i) else {
                return (false, false);
            };
            let close = bars[i].close;
            let enter = i > 0
                && bands
                    .bands_at(i - 1)
                    .is_some_and(|(prev_upper, _, _)| bars[i - 1].close <= prev_upper)
                && close > upper;
            (enter, close < middle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::*;

    #[test]
    fn rejects_bad_parameters() {
        assert!(BollingerBreakout::new(1, 2.0).is_err());
        assert!(BollingerBreakout::new(20, 0.0).is_err());
        assert!(BollingerBreakout::new(20, f64::NAN).is_err());
        assert!(BollingerBreakout::new(20, 1.5).is_ok());
    }

    #[test]
    fn breakout_then_return_to_middle() {
        let strategy = BollingerBreakout::new(3, 1.0).unwrap();
        let bars = bars_from_closes(&[10.0, 10.0, 10.0, 10.0, 14.0, 15.0, 9.0]);
        let signals = strategy.signals(&bars);

        // index 4: bands over [10, 10, 14]: middle 11.33, sd 2.31, upper 13.64
        assert_eq!(enter_days(&signals), vec![4]);
        // index 6: bands over [14, 15, 9]: middle 12.67, close 9 below it
        assert!(exit_days(&signals).contains(&6));
        assert!(!exit_days(&signals).contains(&4));
    }

    #[test]
    fn band_width_follows_exact_multiplier() {
        // bands over [10, 10, 20]: middle 13.33, sd 5.77; the close of 20 sits
        // between the 1.15 and 1.1549 upper bands
        let bars = bars_from_closes(&[10.0, 10.0, 10.0, 10.0, 20.0]);

        let narrow = BollingerBreakout::new(3, 1.15).unwrap();
        assert_eq!(enter_days(&narrow.signals(&bars)), vec![4]);

        let wide = BollingerBreakout::new(3, 1.1549).unwrap();
        assert!(enter_days(&wide.signals(&bars)).is_empty());
        assert_eq!(wide.parameters()["std_dev"], 1.1549);
    }

    #[test]
    fn no_entry_without_prior_bands() {
        let strategy = BollingerBreakout::new(3, 1.0).unwrap();
        let bars = bars_from_closes(&[10.0, 10.0, 20.0]);
        let signals = strategy.signals(&bars);
        assert!(enter_days(&signals).is_empty());
    }
}
