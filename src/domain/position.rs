//! Open position and completed trade records.

use chrono::NaiveDate;
use serde::Serialize;

/// A long position currently held.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenPosition {
    pub shares: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
}

impl OpenPosition {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares * (price - self.entry_price)
    }

    /// Close the position at `exit_price`, producing the trade record.
    pub fn close(&self, exit_price: f64, exit_date: NaiveDate) -> Trade {
        Trade {
            entry_date: self.entry_date,
            exit_date,
            shares: self.shares,
            entry_price: self.entry_price,
            exit_price,
            profit_loss: self.shares * (exit_price - self.entry_price),
        }
    }
}

/// A fully closed round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub shares: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit_loss: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit_loss > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit_loss < 0.0
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
