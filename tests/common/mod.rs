#![allow(dead_code)]

use chrono::NaiveDate;
use quantdash::domain::error::QuantdashError;
pub use quantdash::domain::ohlcv::{PriceBar, SignalBar};
use quantdash::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, QuantdashError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(QuantdashError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) => Ok(bars
                .iter()
                .filter(|b| b.date >= start_date && b.date <= end_date)
                .cloned()
                .collect()),
            None => Err(QuantdashError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantdashError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume: 10_000.0,
    }
}

/// One bar per calendar day from 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10_000.0,
        })
        .collect()
}

/// Attach flags to `closes`: `E` enter, `X` exit, `B` both, anything else none.
pub fn signals(closes: &[f64], flags: &str) -> Vec<SignalBar> {
    let flags: Vec<char> = flags.chars().collect();
    bars_from_closes(closes)
        .into_iter()
        .enumerate()
        .map(|(i, bar)| {
            let f = flags.get(i).copied().unwrap_or('.');
            SignalBar::new(bar, f == 'E' || f == 'B', f == 'X' || f == 'B')
        })
        .collect()
}

/// Daily closes on a noisy upward drift, deterministic.
pub fn trending_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.3 * t + 6.0 * (t / 7.0).sin() + 2.5 * (t / 2.3).cos()
        })
        .collect()
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, bars: &[PriceBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

/// `ExitCode` has no `PartialEq`; compare the debug forms.
pub fn assert_exit(actual: std::process::ExitCode, expected: u8) {
    assert_eq!(
        format!("{:?}", actual),
        format!("{:?}", std::process::ExitCode::from(expected))
    );
}
