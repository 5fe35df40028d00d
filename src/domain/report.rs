//! Strategy-to-report pipeline for one symbol.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use super::backtest::{run_backtest, BacktestConfig};
use super::error::QuantdashError;
use super::metrics::{drawdown_curve, DrawdownPoint, Metrics};
use super::ohlcv::PriceBar;
use super::portfolio::EquityPoint;
use super::position::{OpenPosition, Trade};
use super::strategy::SignalProvider;

/// Everything downstream consumers (console, JSON, charts) need from a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub strategy: String,
    pub parameters: BTreeMap<&'static str, f64>,
    pub metrics: Metrics,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_curve: Vec<DrawdownPoint>,
    pub trades: Vec<Trade>,
    pub open_position: Option<OpenPosition>,
    /// Mark-to-market P&L of `open_position` at the last close.
    pub unrealized_pnl: Option<f64>,
}

/// Generate signals, simulate, and compute metrics.
pub fn backtest_strategy(
    symbol: &str,
    bars: &[PriceBar],
    strategy: &dyn SignalProvider,
    config: &BacktestConfig,
) -> Result<BacktestReport, QuantdashError> {
    let signals = strategy.signals(bars);
    let result = run_backtest(&signals, config)?;
    let metrics = Metrics::compute(
        &result.equity_curve,
        &result.trades,
        config.initial_cash,
        config.risk_free_rate,
    )?;

    info!(
        symbol,
        strategy = strategy.name(),
        total_return_pct = metrics.total_return_pct,
        trades = metrics.total_trades,
        "backtest finished"
    );

    let unrealized_pnl = match (&result.final_state.position, bars.last()) {
        (Some(open), Some(last)) => Some(open.unrealized_pnl(last.close)),
        _ => None,
    };

    Ok(BacktestReport {
        symbol: symbol.to_string(),
        strategy: strategy.name().to_string(),
        parameters: strategy.parameters(),
        drawdown_curve: drawdown_curve(&result.equity_curve),
        metrics,
        equity_curve: result.equity_curve,
        trades: result.trades,
        open_position: result.final_state.position,
        unrealized_pnl,
    })
}
