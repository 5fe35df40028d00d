//! Price bars and the signal-annotated bars fed to the simulation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::QuantdashError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    fn check(&self, index: usize) -> Result<(), QuantdashError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(self.malformed(index, format!("{name} is not finite")));
            }
            if value < 0.0 {
                return Err(self.malformed(index, format!("negative {name}")));
            }
        }
        if self.close == 0.0 {
            return Err(self.malformed(index, "close must be positive".to_string()));
        }
        Ok(())
    }

    fn malformed(&self, index: usize, reason: String) -> QuantdashError {
        QuantdashError::MalformedBar {
            index,
            date: self.date,
            reason,
        }
    }
}

/// A price bar annotated with the strategy's enter/exit flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalBar {
    #[serde(flatten)]
    pub bar: PriceBar,
    pub enter: bool,
    pub exit: bool,
}

impl SignalBar {
    pub fn new(bar: PriceBar, enter: bool, exit: bool) -> Self {
        SignalBar { bar, enter, exit }
    }

    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

/// Reject series that are not strictly chronological or carry unusable prices.
pub fn validate_series<'a, I>(bars: I) -> Result<(), QuantdashError>
where
    I: IntoIterator<Item = &'a PriceBar>,
{
    let mut prev: Option<NaiveDate> = None;
    for (index, bar) in bars.into_iter().enumerate() {
        bar.check(index)?;
        if let Some(prev_date) = prev {
            if bar.date <= prev_date {
                return Err(bar.malformed(
                    index,
                    format!("date not after previous bar ({prev_date})"),
                ));
            }
        }
        prev = Some(bar.date);
    }
    Ok(())
}
