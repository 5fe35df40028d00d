//! Signal providers: strategies that flag entries and exits per bar.
//!
//! The simulation only ever sees the [`SignalBar`]s a provider produces, so
//! any number of strategies can be swapped in behind [`SignalProvider`].
//! Built-in strategies are long-only and compute flags without looking at
//! portfolio state; the position tracker ignores an enter while holding and
//! an exit while flat. A strategy whose exit depends on its entry (the turtle
//! stop) replays the tracker's rules over its own flags.

pub mod ma_crossover;
pub mod rsi_pullback;
pub mod bollinger_breakout;
pub mod turtle_breakout;
pub mod dual_momentum;

use std::collections::BTreeMap;

use super::error::QuantdashError;
use super::ohlcv::{PriceBar, SignalBar};

pub use bollinger_breakout::BollingerBreakout;
pub use dual_momentum::DualMomentum;
pub use ma_crossover::MaCrossover;
pub use rsi_pullback::RsiPullback;
pub use turtle_breakout::TurtleBreakout;

/// Produces enter/exit flags for a price series.
pub trait SignalProvider: Send + Sync {
    /// Registry name, e.g. `ma_crossover`.
    fn name(&self) -> &'static str;

    fn parameters(&self) -> BTreeMap<&'static str, f64>;

    /// One [`SignalBar`] per input bar, in the same order.
    fn signals(&self, bars: &[PriceBar]) -> Vec<SignalBar>;
}

/// Registry names of the built-in strategies.
pub fn strategy_names() -> [&'static str; 5] {
    [
        ma_crossover::NAME,
        rsi_pullback::NAME,
        bollinger_breakout::NAME,
        turtle_breakout::NAME,
        dual_momentum::NAME,
    ]
}

/// Attach flags computed per bar index.
pub(crate) fn annotate<F>(bars: &[PriceBar], mut flags: F) -> Vec<SignalBar>
where
    F: FnMut(usize) -> (bool, bool),
{
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let (enter, exit) = flags(i);
            SignalBar::new(bar.clone(), enter, exit)
        })
        .collect()
}

pub(crate) fn require_positive_period(name: &str, value: usize) -> Result<(), QuantdashError> {
    if value == 0 {
        return Err(QuantdashError::invalid_parameter(name, "period must be at least 1"));
    }
    Ok(())
}
