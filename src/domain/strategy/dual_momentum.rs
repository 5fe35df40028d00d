//! Dual momentum.
//!
//! Absolute momentum is the compounded return over `lookback_period` bars less
//! a risk-free hurdle (the annual rate compounded down to a daily rate, times
//! the lookback). Relative momentum compares a half-lookback SMA to the full
//! lookback SMA. Enter when both are positive; exit when either is zero or
//! negative.

use std::collections::BTreeMap;

use super::{annotate, SignalProvider};
use crate::domain::error::QuantdashError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::ohlcv::{PriceBar, SignalBar};

pub const NAME: &str = "dual_momentum";

#[derive(Debug, Clone, PartialEq)]
pub struct DualMomentum {
    lookback_period: usize,
    risk_free_rate: f64,
}

impl Default for DualMomentum {
    fn default() -> Self {
        DualMomentum {
            lookback_period: 60,
            risk_free_rate: 0.02,
        }
    }
}

impl DualMomentum {
    pub fn new(lookback_period: usize, risk_free_rate: f64) -> Result<Self, QuantdashError> {
        if lookback_period < 2 {
            return Err(QuantdashError::invalid_parameter(
                "lookback_period",
                "lookback must be at least 2",
            ));
        }
        if !(0.0..1.0).contains(&risk_free_rate) {
            return Err(QuantdashError::invalid_parameter(
                "risk_free_rate",
                format!("must lie within [0, 1), got {risk_free_rate}"),
            ));
        }
        Ok(DualMomentum {
            lookback_period,
            risk_free_rate,
        })
    }

    /// Return the lookback has to beat before momentum counts as positive.
    fn hurdle(&self) -> f64 {
        let daily = (1.0 + self.risk_free_rate).powf(1.0 / TRADING_DAYS_PER_YEAR) - 1.0;
        daily * self.lookback_period as f64
    }
}

impl SignalProvider for DualMomentum {
    fn name(&self) -> &'static str {
        NAME
    }

    fn parameters(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("lookback_period", self.lookback_period as f64),
            ("risk_free_rate", self.risk_free_rate),
        ])
    }

    fn signals(&self, bars: &[PriceBar]) -> Vec<SignalBar> {
        let lookback = self.lookback_period;
        let long = calculate_sma(bars, lookback);
        let short = calculate_sma(bars, lookback / 2);
        let hurdle = self.hurdle();

        annotate(bars, |i| {
            if i < lookback {
                return (false, false);
            }
            let (Some(long_avg), Some(short_avg)) = (long.simple_at(i), short.simple_at(i)) else {
                return (false, false);
            };
            let absolute = bars[i].close / bars[i - lookback].close - 1.0 - hurdle;
            let relative = (short_avg - long_avg) / long_avg;
            let positive = absolute > 0.0 && relative > 0.0;
            (positive, !positive)
        })
    }
}
