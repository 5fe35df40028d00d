//! Turtle (Donchian channel) breakout with a 2N protective stop.
//!
//! Enter when the bar's high exceeds the highest high of the previous
//! `entry_period` bars and ATR is available; exit when the low undercuts the
//! lowest low of the previous `exit_period` bars. A wide bar can trip both on
//! the same day.
//!
//! Each entry also sets a stop at the entry close minus two ATRs (N, the
//! `atr_period` ATR on the entry bar). While the position is open, a low at or
//! below the stop flags an exit. The open position is tracked here with the
//! same rules the position tracker applies, so the stop always belongs to the
//! trade the tracker actually holds.

use std::collections::BTreeMap;

use super::{annotate, require_positive_period, SignalProvider};
use crate::domain::error::QuantdashError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::channel::{calculate_highest, calculate_lowest};
use crate::domain::ohlcv::{PriceBar, SignalBar};

pub const NAME: &str = "turtle_breakout";

/// Stop distance below the entry close, in ATRs.
pub const STOP_ATR_MULTIPLE: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TurtleBreakout {
    entry_period: usize,
    exit_period: usize,
    atr_period: usize,
}

impl Default for TurtleBreakout {
    fn default() -> Self {
        TurtleBreakout {
            entry_period: 20,
            exit_period: 10,
            atr_period: 20,
        }
    }
}

impl TurtleBreakout {
    pub fn new(
        entry_period: usize,
        exit_period: usize,
        atr_period: usize,
    ) -> Result<Self, QuantdashError> {
        require_positive_period("entry_period", entry_period)?;
        require_positive_period("exit_period", exit_period)?;
        require_positive_period("atr_period", atr_period)?;
        Ok(TurtleBreakout {
            entry_period,
            exit_period,
            atr_period,
        })
    }
}

impl SignalProvider for TurtleBreakout {
    fn name(&self) -> &'static str {
        NAME
    }

    fn parameters(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("entry_period", self.entry_period as f64),
            ("exit_period", self.exit_period as f64),
            ("atr_period", self.atr_period as f64),
        ])
    }

    fn signals(&self, bars: &[PriceBar]) -> Vec<SignalBar> {
        let entry_high = calculate_highest(bars, self.entry_period);
        let exit_low = calculate_lowest(bars, self.exit_period);
        let atr = calculate_atr(bars, self.atr_period);
        // Some(stop level) while the position is open
        let mut stop: Option<f64> = None;

        annotate(bars, |i| {
            if i == 0 {
                return (false, false);
            }
            let bar = &bars[i];
            let current_atr = atr.simple_at(i);
            let enter = current_atr.is_some()
                && entry_high.simple_at(i - 1).is_some_and(|h| bar.high > h);
            let channel_exit = exit_low.simple_at(i - 1).is_some_and(|l| bar.low < l);
            let exit = channel_exit || stop.is_some_and(|level| bar.low <= level);

            match (stop, current_atr) {
                (None, Some(n)) if enter => {
                    stop = Some(bar.close - STOP_ATR_MULTIPLE * n);
                }
                (Some(_), _) if exit => stop = None,
                _ => {}
            }
            (enter, exit)
        })
    }
}
