//! Position tracking: applies one bar's signal to the portfolio state.
//!
//! All fills happen at the bar's close. Entries are all-in (fractional shares,
//! cash goes to zero) and exits liquidate the whole position. When both flags
//! are set on a flat bar the entry wins; while holding, an enter flag is
//! ignored so the exit is taken.

use chrono::NaiveDate;

use super::ohlcv::SignalBar;
use super::portfolio::PortfolioState;
use super::position::{OpenPosition, Trade};

/// What happened on a bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Entered { shares: f64, price: f64 },
    Exited(Trade),
    None,
}

/// The state after one bar plus the fill that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: PortfolioState,
    pub fill: Fill,
}

impl Step {
    /// The new state plus the completed trade, if this bar closed a position.
    pub fn into_parts(self) -> (PortfolioState, Option<Trade>) {
        match self.fill {
            Fill::Exited(trade) => (self.state, Some(trade)),
            _ => (self.state, None),
        }
    }
}

/// Convert all cash into shares at `price`. Returns `None` when already holding.
pub fn enter_long(state: &PortfolioState, price: f64, date: NaiveDate) -> Option<PortfolioState> {
    if !state.is_flat() {
        return None;
    }
    let shares = state.cash / price;
    Some(PortfolioState {
        cash: 0.0,
        position: Some(OpenPosition {
            shares,
            entry_price: price,
            entry_date: date,
        }),
    })
}

/// Liquidate the open position at `price`. Returns `None` when flat.
pub fn exit_long(
    state: &PortfolioState,
    price: f64,
    date: NaiveDate,
) -> Option<(PortfolioState, Trade)> {
    let position = state.position.as_ref()?;
    let trade = position.close(price, date);
    let next = PortfolioState {
        cash: state.cash + position.market_value(price),
        position: None,
    };
    Some((next, trade))
}

/// Apply one bar's flags to `state`.
pub fn apply_signal(state: &PortfolioState, bar: &SignalBar) -> Step {
    let price = bar.close();
    let date = bar.date();

    if bar.enter {
        if let Some(next) = enter_long(state, price, date) {
            let shares = next.shares();
            return Step {
                state: next,
                fill: Fill::Entered { shares, price },
            };
        }
    }

    if bar.exit {
        if let Some((next, trade)) = exit_long(state, price, date) {
            return Step {
                state: next,
                fill: Fill::Exited(trade),
            };
        }
    }

    Step {
        state: state.clone(),
        fill: Fill::None,
    }
}
