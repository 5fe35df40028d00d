//! Report output port trait.

use crate::domain::error::QuantdashError;
use crate::domain::report::BacktestReport;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, reports: &[BacktestReport], output_path: &str) -> Result<(), QuantdashError>;
}
