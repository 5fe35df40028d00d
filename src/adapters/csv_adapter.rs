//! CSV file data adapter.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume`.

use crate::domain::error::QuantdashError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

const EXTENSION: &str = "csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", symbol, EXTENSION))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, QuantdashError> {
        let path = self.csv_path(symbol);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| match e.kind() {
            csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound => QuantdashError::NoData {
                symbol: symbol.to_string(),
            },
            _ => QuantdashError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut bars = Vec::new();
        for (row, result) in rdr.deserialize::<PriceBar>().enumerate() {
            let bar = result.map_err(|e| QuantdashError::Data {
                reason: format!("{} row {}: {}", path.display(), row + 1, e),
            })?;
            if bar.date < start_date || bar.date > end_date {
                continue;
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded csv");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantdashError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| QuantdashError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
