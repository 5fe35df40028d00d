//! Parallel execution of independent backtests.
//!
//! Runs share nothing mutable: each job borrows its bars and strategy
//! read-only and owns its portfolio state, so jobs go straight onto the rayon
//! pool. A failed job does not affect the others.

use rayon::prelude::*;
use tracing::warn;

use super::backtest::BacktestConfig;
use super::error::QuantdashError;
use super::ohlcv::PriceBar;
use super::report::{backtest_strategy, BacktestReport};
use super::strategy::SignalProvider;

pub struct BatchJob<'a> {
    pub symbol: String,
    pub bars: &'a [PriceBar],
    pub strategy: &'a dyn SignalProvider,
    pub config: BacktestConfig,
}

/// Run every job; results come back in job order.
pub fn run_batch(jobs: &[BatchJob<'_>]) -> Vec<Result<BacktestReport, QuantdashError>> {
    jobs.par_iter()
        .map(|job| {
            backtest_strategy(&job.symbol, job.bars, job.strategy, &job.config).inspect_err(|e| {
                warn!(symbol = %job.symbol, strategy = job.strategy.name(), error = %e, "backtest failed");
            })
        })
        .collect()
}
