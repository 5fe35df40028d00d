//! Simulation driver: walks the signal series bar by bar.
//!
//! One run is a single sequential scan; the state at bar t depends on the
//! state at bar t-1.

use serde::Serialize;
use tracing::debug;

use super::error::QuantdashError;
use super::execution::{apply_signal, Fill};
use super::ohlcv::{validate_series, SignalBar};
use super::portfolio::{EquityPoint, PortfolioState};
use super::position::Trade;

/// Fewest bars a run accepts; one bar yields no return.
pub const MIN_BARS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    /// Annual rate, as a fraction (0.05 = 5%).
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 100_000.0,
            risk_free_rate: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn new(initial_cash: f64) -> Self {
        BacktestConfig {
            initial_cash,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), QuantdashError> {
        validate_initial_cash(self.initial_cash)?;
        validate_risk_free_rate(self.risk_free_rate)
    }
}

pub(crate) fn validate_initial_cash(initial_cash: f64) -> Result<(), QuantdashError> {
    if !initial_cash.is_finite() || initial_cash <= 0.0 {
        return Err(QuantdashError::invalid_parameter(
            "initial_cash",
            format!("must be a positive number, got {initial_cash}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_risk_free_rate(rate: f64) -> Result<(), QuantdashError> {
    if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
        return Err(QuantdashError::invalid_parameter(
            "risk_free_rate",
            format!("must be in [0, 1), got {rate}"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub final_state: PortfolioState,
}

impl BacktestResult {
    pub fn final_value(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.value)
    }
}

/// Run the simulation over `bars` starting from `config.initial_cash`.
pub fn run_backtest(
    bars: &[SignalBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, QuantdashError> {
    if bars.len() < MIN_BARS {
        return Err(QuantdashError::InsufficientData {
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }
    config.validate()?;
    validate_series(bars.iter().map(|b| &b.bar))?;

    let mut state = PortfolioState::new(config.initial_cash);
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut trades = Vec::new();

    for bar in bars {
        let step = apply_signal(&state, bar);
        match &step.fill {
            Fill::Entered { shares, price } => {
                debug!(date = %bar.date(), shares, price, "entered long");
            }
            Fill::Exited(trade) => {
                debug!(date = %bar.date(), pnl = trade.profit_loss, "exited long");
            }
            Fill::None => {}
        }

        let (next, trade) = step.into_parts();
        trades.extend(trade);
        state = next;

        equity_curve.push(EquityPoint {
            date: bar.date(),
            value: state.total_value(bar.close()),
        });
    }

    debug!(
        bars = bars.len(),
        trades = trades.len(),
        open = !state.is_flat(),
        "simulation complete"
    );

    Ok(BacktestResult {
        equity_curve,
        trades,
        final_state: state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use chrono::NaiveDate;

    fn signal(day: u32, close: f64, enter: bool, exit: bool) -> SignalBar {
        SignalBar::new(
            PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            },
            enter,
            exit,
        )
    }

    #[test]
    fn default_config() {
        let c = BacktestConfig::default();
        assert!((c.initial_cash - 100_000.0).abs() < f64::EPSILON);
        assert_eq!(c.risk_free_rate, 0.0);
    }

    #[test]
    fn config_rejects_non_positive_cash() {
        assert!(BacktestConfig::new(0.0).validate().is_err());
        assert!(BacktestConfig::new(-5.0).validate().is_err());
        assert!(BacktestConfig::new(f64::NAN).validate().is_err());
        assert!(BacktestConfig::new(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn config_rejects_bad_rate() {
        let mut c = BacktestConfig::new(1000.0);
        c.risk_free_rate = 1.5;
        assert!(c.validate().is_err());
        c.risk_free_rate = -0.01;
        assert!(c.validate().is_err());
        c.risk_free_rate = 0.05;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn single_bar_is_insufficient() {
        let err = run_backtest(&[signal(1, 100.0, false, false)], &BacktestConfig::new(1000.0))
            .unwrap_err();
        assert!(matches!(
            err,
            QuantdashError::InsufficientData { bars: 1, minimum: 2 }
        ));
    }

    #[test]
    fn empty_series_is_insufficient() {
        assert!(matches!(
            run_backtest(&[], &BacktestConfig::default()),
            Err(QuantdashError::InsufficientData { bars: 0, .. })
        ));
    }

    #[test]
    fn invalid_cash_fails_before_scan() {
        let bars = vec![signal(1, 100.0, true, false), signal(2, 101.0, false, false)];
        assert!(matches!(
            run_backtest(&bars, &BacktestConfig::new(0.0)),
            Err(QuantdashError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn malformed_series_rejected() {
        let bars = vec![signal(2, 100.0, false, false), signal(1, 101.0, false, false)];
        assert!(matches!(
            run_backtest(&bars, &BacktestConfig::new(1000.0)),
            Err(QuantdashError::MalformedBar { index: 1, .. })
        ));
    }

    #[test]
    fn round_trip_scenario() {
        let bars = vec![
            signal(1, 100.0, true, false),
            signal(2, 110.0, false, false),
            signal(3, 120.0, false, true),
            signal(4, 115.0, false, false),
        ];
        let result = run_backtest(&bars, &BacktestConfig::new(10_000.0)).unwrap();

        let values: Vec<f64> = result.equity_curve.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10_000.0, 11_000.0, 12_000.0, 12_000.0]);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].profit_loss, 2_000.0);
        assert!(result.final_state.is_flat());
        assert_eq!(result.final_value(), Some(12_000.0));
    }

    #[test]
    fn open_position_is_not_a_trade() {
        let bars = vec![
            signal(1, 100.0, true, false),
            signal(2, 130.0, false, false),
        ];
        let result = run_backtest(&bars, &BacktestConfig::new(1_000.0)).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.final_state.shares(), 10.0);
        assert_eq!(result.final_value(), Some(1_300.0));
    }

    #[test]
    fn re_entry_after_exit() {
        let bars = vec![
            signal(1, 10.0, true, false),
            signal(2, 20.0, false, true),
            signal(3, 40.0, true, false),
            signal(4, 20.0, false, true),
        ];
        let result = run_backtest(&bars, &BacktestConfig::new(100.0)).unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].profit_loss, 100.0);
        assert_eq!(result.trades[1].profit_loss, -100.0);
        assert_eq!(result.final_value(), Some(100.0));
    }
}
