//! Technical indicators used by the built-in strategies.
//!
//! Every indicator returns one [`IndicatorPoint`] per input bar. Points inside
//! the warm-up window are marked invalid and carry a zero placeholder value.

pub mod sma;
pub mod stddev;
pub mod bollinger;
pub mod rsi;
pub mod channel;
pub mod atr;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Highest(usize),
    Lowest(usize),
    Atr(usize),
    Bollinger { period: usize, stddev_mult: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The single value at `index`, or `None` during warm-up or out of range.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index)? {
            IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            } => Some(*v),
            _ => None,
        }
    }

    /// (upper, middle, lower) at `index` for a band indicator.
    pub fn bands_at(&self, index: usize) -> Option<(f64, f64, f64)> {
        match self.values.get(index)? {
            IndicatorPoint {
                valid: true,
                value: IndicatorValue::Bollinger { upper, middle, lower },
                ..
            } => Some((*upper, *middle, *lower)),
            _ => None,
        }
    }
}

/// Build a series from a per-bar closure returning `None` for warm-up bars.
pub(crate) fn build_series<F>(
    dates: impl Iterator<Item = NaiveDate>,
    indicator_type: IndicatorType,
    mut compute: F,
) -> IndicatorSeries
where
    F: FnMut(usize) -> Option<IndicatorValue>,
{
    let values = dates
        .enumerate()
        .map(|(i, date)| match compute(i) {
            Some(value) => IndicatorPoint {
                date,
                valid: true,
                value,
            },
            None => IndicatorPoint {
                date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Highest(period) => write!(f, "HIGHEST({})", period),
            IndicatorType::Lowest(period) => write!(f, "LOWEST({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult,
            } => write!(f, "BOLLINGER({},{})", period, stddev_mult),
        }
    }
}
