//! Performance metrics and statistics.
//!
//! Every percentage field is already multiplied by 100. Ratios that would
//! divide by a zero deviation are reported as 0; trade statistics with no
//! trades to average over are reported as `None`.

use chrono::NaiveDate;
use serde::Serialize;

use super::backtest::{validate_initial_cash, validate_risk_free_rate};
use super::error::QuantdashError;
use super::portfolio::EquityPoint;
use super::position::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub initial_cash: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown_pct: f64,
    /// Calendar days spanned by the longest run of bars below the running peak.
    pub max_drawdown_duration: i64,
    pub max_drawdown_bars: usize,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: Option<f64>,
    pub total_profit: f64,
    pub profit_factor: Option<f64>,
    pub avg_trade_duration_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub drawdown_pct: f64,
}

impl Metrics {
    pub fn compute(
        equity_curve: &[EquityPoint],
        trades: &[Trade],
        initial_cash: f64,
        risk_free_rate: f64,
    ) -> Result<Self, QuantdashError> {
        if equity_curve.len() < 2 {
            return Err(QuantdashError::EmptySeries {
                points: equity_curve.len(),
            });
        }
        validate_initial_cash(initial_cash)?;
        validate_risk_free_rate(risk_free_rate)?;
        if let Some(bad) = equity_curve
            .iter()
            .find(|p| !p.value.is_finite() || p.value <= 0.0)
        {
            return Err(QuantdashError::invalid_parameter(
                "portfolio_values",
                format!("value on {} must be positive and finite, got {}", bad.date, bad.value),
            ));
        }

        let final_value = equity_curve[equity_curve.len() - 1].value;
        let total_return = (final_value - initial_cash) / initial_cash;

        let returns = period_returns(equity_curve);
        let years = returns.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = (1.0 + total_return).powf(1.0 / years) - 1.0;

        let stddev = sample_stddev(&returns);
        let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(&returns, stddev, daily_rf);

        let drawdown = compute_drawdown(equity_curve);
        let trade_stats = TradeStats::from_trades(trades);

        Ok(Metrics {
            initial_cash,
            final_value,
            total_return_pct: total_return * 100.0,
            annualized_return_pct: finite_or_zero(annualized_return) * 100.0,
            volatility_pct: stddev * TRADING_DAYS_PER_YEAR.sqrt() * 100.0,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown_pct: drawdown.max_drawdown * 100.0,
            max_drawdown_duration: drawdown.duration_days,
            max_drawdown_bars: drawdown.duration_bars,
            total_trades: trade_stats.total,
            winning_trades: trade_stats.won,
            losing_trades: trade_stats.lost,
            win_rate_pct: trade_stats.win_rate().map(|r| r * 100.0),
            total_profit: trade_stats.total_profit,
            profit_factor: trade_stats.profit_factor(),
            avg_trade_duration_days: trade_stats.avg_duration_days(),
        })
    }
}

/// Percentage drawdown from the running peak at every point.
pub fn drawdown_curve(equity_curve: &[EquityPoint]) -> Vec<DrawdownPoint> {
    let mut peak = f64::MIN;
    equity_curve
        .iter()
        .map(|p| {
            peak = peak.max(p.value);
            DrawdownPoint {
                date: p.date,
                drawdown_pct: (p.value - peak) / peak * 100.0,
            }
        })
        .collect()
}

/// r_t = (V_t - V_{t-1}) / V_{t-1}
fn period_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| (w[1].value - w[0].value) / w[0].value)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); 0 with fewer than two values.
fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn compute_risk_adjusted(returns: &[f64], stddev: f64, daily_rf: f64) -> (f64, f64) {
    let excess_return = mean(returns) - daily_rf;
    let annualize = TRADING_DAYS_PER_YEAR.sqrt();

    let sharpe = if stddev > 0.0 {
        excess_return / stddev * annualize
    } else {
        0.0
    };

    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let downside_stddev = sample_stddev(&downside);
    let sortino = if downside_stddev > 0.0 {
        excess_return / downside_stddev * annualize
    } else {
        0.0
    };

    (finite_or_zero(sharpe), finite_or_zero(sortino))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drawdown {
    /// Most negative (value - peak) / peak, as a fraction.
    max_drawdown: f64,
    duration_bars: usize,
    duration_days: i64,
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> Drawdown {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    let mut run_start: Option<usize> = None;
    let mut longest: Option<(usize, usize)> = None;

    for (i, point) in equity_curve.iter().enumerate() {
        peak = peak.max(point.value);
        let dd = (point.value - peak) / peak;
        max_dd = max_dd.min(dd);

        if dd < 0.0 {
            let start = *run_start.get_or_insert(i);
            let len = i - start + 1;
            if longest.is_none_or(|(s, e)| len > e - s + 1) {
                longest = Some((start, i));
            }
        } else {
            run_start = None;
        }
    }

    let (duration_bars, duration_days) = match longest {
        Some((start, end)) => (
            end - start + 1,
            (equity_curve[end].date - equity_curve[start].date).num_days(),
        ),
        None => (0, 0),
    };

    Drawdown {
        max_drawdown: max_dd,
        duration_bars,
        duration_days,
    }
}

#[derive(Debug, Default)]
struct TradeStats {
    total: usize,
    won: usize,
    lost: usize,
    total_profit: f64,
    gross_wins: f64,
    gross_losses: f64,
    total_duration_days: i64,
}

impl TradeStats {
    fn from_trades(trades: &[Trade]) -> Self {
        let mut stats = TradeStats::default();
        for trade in trades {
            let pnl = trade.profit_loss;
            stats.total += 1;
            stats.total_profit += pnl;
            if trade.is_win() {
                stats.won += 1;
                stats.gross_wins += pnl;
            } else if trade.is_loss() {
                stats.lost += 1;
                stats.gross_losses += pnl.abs();
            }
            stats.total_duration_days += trade.holding_days();
        }
        stats
    }

    fn win_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.won as f64 / self.total as f64)
    }

    fn profit_factor(&self) -> Option<f64> {
        (self.gross_losses > 0.0).then(|| self.gross_wins / self.gross_losses)
    }

    fn avg_duration_days(&self) -> Option<f64> {
        (self.total > 0).then(|| self.total_duration_days as f64 / self.total as f64)
    }
}
