//! JSON report adapter implementing ReportPort.
//!
//! Writes every report as one pretty-printed JSON array.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::domain::error::QuantdashError;
use crate::domain::report::BacktestReport;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, reports: &[BacktestReport], output_path: &str) -> Result<(), QuantdashError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, reports)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!(path = output_path, reports = reports.len(), "report written");
        Ok(())
    }
}
