//! Moving average crossover.
//!
//! Enter on a golden cross (fast SMA moves above slow SMA), exit on a death
//! cross (fast SMA moves back to or below slow SMA). A cross needs both
//! averages valid on the previous bar.

use std::collections::BTreeMap;

use super::{annotate, require_positive_period, SignalProvider};
use crate::domain::error::QuantdashError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::{PriceBar, SignalBar};

pub const NAME: &str = "ma_crossover";

#[derive(Debug, Clone, PartialEq)]
pub struct MaCrossover {
    fast_period: usize,
    slow_period: usize,
}

impl Default for MaCrossover {
    fn default() -> Self {
        MaCrossover {
            fast_period: 10,
            slow_period: 30,
        }
    }
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self, QuantdashError> {
        require_positive_period("fast_period", fast_period)?;
        require_positive_period("slow_period", slow_period)?;
        if fast_period >= slow_period {
            return Err(QuantdashError::invalid_parameter(
                "fast_period",
                format!("must be shorter than slow_period ({slow_period})"),
            ));
        }
        Ok(MaCrossover {
            fast_period,
            slow_period,
        })
    }
}

impl SignalProvider for MaCrossover {
    fn name(&self) -> &'static str {
        NAME
    }

    fn parameters(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("fast_period", self.fast_period as f64),
            ("slow_period", self.slow_period as f64),
        ])
    }

    fn signals(&self, bars: &[PriceBar]) -> Vec<SignalBar> {
        let fast = calculate_sma(bars, self.fast_period);
        let slow = calculate_sma(bars, self.slow_period);

        annotate(bars, |i| {
            if i == 0 {
                return (false, false);
            }
            let pair = |j: usize| Some((fast.simple_at(j)?, slow.simple_at(j)?));
            match (pair(i - 1), pair(i)) {
                (Some((pf, ps)), Some((f, s))) => {
                    let was_above = pf > ps;
                    let is_above = f > s;
                    (!was_above && is_above, was_above && !is_above)
                }
                _ => (false, false),
            }
        })
    }
}
