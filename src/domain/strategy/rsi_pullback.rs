//! RSI pullback.
//!
//! Buy an oversold dip while the close sits above its trend SMA; exit when
//! RSI turns overbought or the close falls below the trend SMA.

use std::collections::BTreeMap;

use super::{annotate, require_positive_period, SignalProvider};
use crate::domain::error::QuantdashError;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::{PriceBar, SignalBar};

pub const NAME: &str = "rsi_pullback";

#[derive(Debug, Clone, PartialEq)]
pub struct RsiPullback {
    rsi_period: usize,
    ma_period: usize,
    oversold: f64,
    overbought: f64,
}

impl Default for RsiPullback {
    fn default() -> Self {
        RsiPullback {
            rsi_period: 14,
            ma_period: 50,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl RsiPullback {
    pub fn new(
        rsi_period: usize,
        ma_period: usize,
        oversold: f64,
        overbought: f64,
    ) -> Result<Self, QuantdashError> {
        require_positive_period("rsi_period", rsi_period)?;
        require_positive_period("ma_period", ma_period)?;
        if !(0.0..100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
            return Err(QuantdashError::invalid_parameter(
                "oversold",
                "thresholds must lie within 0..100",
            ));
        }
        if oversold >= overbought {
            return Err(QuantdashError::invalid_parameter(
                "oversold",
                format!("must be below overbought ({overbought})"),
            ));
        }
        Ok(RsiPullback {
            rsi_period,
            ma_period,
            oversold,
            overbought,
        })
    }
}

impl SignalProvider for RsiPullback {
    fn name(&self) -> &'static str {
        NAME
    }

    fn parameters(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("rsi_period", self.rsi_period as f64),
            ("ma_period", self.ma_period as f64),
            ("oversold", self.oversold),
            ("overbought", self.overbought),
        ])
    }

    fn signals(&self, bars: &[PriceBar]) -> Vec<SignalBar> {
        let rsi = calculate_rsi(bars, self.rsi_period);
        let trend = calculate_sma(bars, self.ma_period);

        annotate(bars, |i| match (rsi.simple_at(i), trend.simple_at(i)) {
            (Some(rsi), Some(ma)) => {
                let close = bars[i].close;
                let enter = close > ma && rsi <= self.oversold;
                let exit = rsi >= self.overbought || close < ma;
                (enter, exit)
            }
            _ => (false, false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::*;

    #[test]
    fn rejects_inverted_thresholds() {
        assert!(RsiPullback::new(14, 50, 70.0, 30.0).is_err());
        assert!(RsiPullback::new(14, 50, 50.0, 50.0).is_err());
        assert!(RsiPullback::new(0, 50, 30.0, 70.0).is_err());
        assert!(RsiPullback::new(14, 50, -1.0, 70.0).is_err());
        assert!(RsiPullback::new(14, 50, 30.0, 70.0).is_ok());
    }

    #[test]
    fn buys_dip_in_uptrend_and_exits_on_overbought() {
        let strategy = RsiPullback::new(2, 5, 30.0, 70.0).unwrap();
        // long rise, a two-bar dip that stays above SMA(5), then a rally
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0, 48.0, 46.0, 52.0, 58.0]);
        let signals = strategy.signals(&bars);

        // index 6: changes -2, -2 → RSI 0; SMA(5) = (30+40+50+48+46)/5 = 42.8 < 46
        assert!(signals[6].enter);
        assert!(!signals[6].exit);
        // index 8: changes +6, +6 → RSI 100
        assert!(signals[8].exit);
    }

    #[test]
    fn exits_when_close_breaks_trend() {
        let strategy = RsiPullback::new(2, 3, 30.0, 70.0).unwrap();
        let bars = bars_from_closes(&[50.0, 50.0, 50.0, 52.0, 40.0]);
        let signals = strategy.signals(&bars);
        // SMA(3) at 4 = 47.33, close 40 below it
        assert!(signals[4].exit);
        assert!(!signals[4].enter);
    }

    #[test]
    fn enter_and_exit_never_coincide() {
        let strategy = RsiPullback::new(3, 4, 30.0, 70.0).unwrap();
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0 + i as f64 * 0.3)
            .collect();
        let signals = strategy.signals(&bars_from_closes(&closes));
        assert!(signals.iter().all(|s| !(s.enter && s.exit)));
    }
}
