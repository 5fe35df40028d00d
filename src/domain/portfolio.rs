//! Portfolio state and equity tracking.

use chrono::NaiveDate;
use serde::Serialize;

use super::position::OpenPosition;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Cash plus at most one open long position.
///
/// Entry price and date live on [`OpenPosition`], so a holding without entry
/// metadata (or metadata without a holding) cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioState {
    pub cash: f64,
    pub position: Option<OpenPosition>,
}

impl PortfolioState {
    pub fn new(initial_cash: f64) -> Self {
        PortfolioState {
            cash: initial_cash,
            position: None,
        }
    }

    pub fn shares(&self) -> f64 {
        self.position.as_ref().map_or(0.0, |p| p.shares)
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.position.as_ref().map(|p| p.entry_price)
    }

    pub fn entry_date(&self) -> Option<NaiveDate> {
        self.position.as_ref().map(|p| p.entry_date)
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Mark-to-market value at `price`.
    pub fn total_value(&self, price: f64) -> f64 {
        let position_value = self
            .position
            .as_ref()
            .map_or(0.0, |p| p.market_value(price));
        self.cash + position_value
    }
}
