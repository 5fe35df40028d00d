//! Configuration validation.
//!
//! Validates all config fields before a backtest runs, and turns the
//! `[strategy]` section into a concrete [`SignalProvider`].

use crate::domain::error::QuantdashError;
use crate::domain::strategy::{
    bollinger_breakout, dual_momentum, ma_crossover, rsi_pullback, turtle_breakout,
    BollingerBreakout, DualMomentum, MaCrossover, RsiPullback, SignalProvider, TurtleBreakout,
};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), QuantdashError> {
    validate_initial_cash(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    validate_symbols(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), QuantdashError> {
    strategy_from_config(config, None).map(|_| ())
}

/// Build the strategy named by `name_override` or `[strategy] name`.
pub fn strategy_from_config(
    config: &dyn ConfigPort,
    name_override: Option<&str>,
) -> Result<Box<dyn SignalProvider>, QuantdashError> {
    let name = match name_override {
        Some(n) => n.trim().to_lowercase(),
        None => match config.get_string("strategy", "name") {
            Some(n) if !n.trim().is_empty() => n.trim().to_lowercase(),
            _ => {
                return Err(QuantdashError::ConfigMissing {
                    section: "strategy".to_string(),
                    key: "name".to_string(),
                })
            }
        },
    };

    let built: Result<Box<dyn SignalProvider>, QuantdashError> = match name.as_str() {
        ma_crossover::NAME => MaCrossover::new(
            period(config, "fast_period", 10)?,
            period(config, "slow_period", 30)?,
        )
        .map(|s| Box::new(s) as Box<dyn SignalProvider>),
        rsi_pullback::NAME => RsiPullback::new(
            period(config, "rsi_period", 14)?,
            period(config, "ma_period", 50)?,
            number(config, "oversold", 30.0)?,
            number(config, "overbought", 70.0)?,
        )
        .map(|s| Box::new(s) as Box<dyn SignalProvider>),
        bollinger_breakout::NAME => BollingerBreakout::new(
            period(config, "period", 20)?,
            number(config, "std_dev", 2.0)?,
        )
        .map(|s| Box::new(s) as Box<dyn SignalProvider>),
        turtle_breakout::NAME => TurtleBreakout::new(
            period(config, "entry_period", 20)?,
            period(config, "exit_period", 10)?,
            period(config, "atr_period", 20)?,
        )
        .map(|s| Box::new(s) as Box<dyn SignalProvider>),
        dual_momentum::NAME => DualMomentum::new(
            period(config, "lookback_period", 60)?,
            number(config, "risk_free_rate", 0.02)?,
        )
        .map(|s| Box::new(s) as Box<dyn SignalProvider>),
        _ => return Err(QuantdashError::UnknownStrategy { name }),
    };

    built.map_err(|e| match e {
        QuantdashError::InvalidParameter { name, reason } => QuantdashError::ConfigInvalid {
            section: "strategy".to_string(),
            key: name,
            reason,
        },
        other => other,
    })
}

fn period(config: &dyn ConfigPort, key: &str, default: i64) -> Result<usize, QuantdashError> {
    let value = config.get_int("strategy", key)?.unwrap_or(default);
    if value < 1 {
        return Err(QuantdashError::config_invalid(
            "strategy",
            key,
            format!("{key} must be at least 1"),
        ));
    }
    Ok(value as usize)
}

fn number(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, QuantdashError> {
    Ok(config.get_double("strategy", key)?.unwrap_or(default))
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), QuantdashError> {
    let value = config.get_double("backtest", "initial_cash")?.unwrap_or(0.0);
    if value <= 0.0 {
        return Err(QuantdashError::config_invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), QuantdashError> {
    let value = config.get_double("backtest", "risk_free_rate")?.unwrap_or(0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(QuantdashError::config_invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), QuantdashError> {
    let start_date = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(QuantdashError::config_invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub(crate) fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, QuantdashError> {
    match value {
        None => Err(QuantdashError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            QuantdashError::config_invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), QuantdashError> {
    let symbols = config.get_string("backtest", "symbols");
    let symbol = config.get_string("backtest", "symbol");

    match (symbols, symbol) {
        (Some(s), _) if s.split(',').any(|c| !c.trim().is_empty()) => Ok(()),
        (None, Some(s)) if !s.trim().is_empty() => Ok(()),
        _ => Err(QuantdashError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        }),
    }
}
