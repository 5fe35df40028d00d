//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::BacktestConfig;
use crate::domain::batch::{run_batch, BatchJob};
use crate::domain::config_validation::{
    parse_date, strategy_from_config, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::QuantdashError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::report::BacktestReport;
use crate::domain::strategy::{strategy_names, SignalProvider};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "quantdash", about = "Single-asset strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Backtest a single symbol instead of [backtest] symbols
        #[arg(long)]
        symbol: Option<String>,
        /// Strategy name, overriding [strategy] name
        #[arg(short, long)]
        strategy: Option<String>,
        /// JSON report path, overriding [report] output
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List built-in strategies and their default parameters
    Strategies,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            strategy,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, symbol.as_deref(), strategy.as_deref())
            } else {
                run_backtest(&config, symbol.as_deref(), strategy.as_deref(), output.as_ref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Strategies => run_strategies(),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: QuantdashError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

/// Everything a backtest run needs from the config file, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestPlan {
    pub config: BacktestConfig,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub symbols: Vec<String>,
    pub data_dir: PathBuf,
    pub output: Option<PathBuf>,
}

pub fn build_backtest_plan(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
    output_override: Option<&PathBuf>,
) -> Result<BacktestPlan, QuantdashError> {
    validate_backtest_config(adapter)?;

    let start_date = parse_date(
        adapter.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    let symbols = resolve_symbols(symbol_override, adapter);
    if symbols.is_empty() {
        return Err(QuantdashError::ConfigMissing {
            section: "backtest".into(),
            key: "symbols".into(),
        });
    }

    let output = output_override
        .cloned()
        .or_else(|| adapter.get_string("report", "output").map(PathBuf::from));

    Ok(BacktestPlan {
        config: build_backtest_config(adapter)?,
        start_date,
        end_date,
        symbols,
        data_dir: adapter
            .get_string("backtest", "data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        output,
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, QuantdashError> {
    let defaults = BacktestConfig::default();
    Ok(BacktestConfig {
        initial_cash: adapter
            .get_double("backtest", "initial_cash")?
            .unwrap_or(defaults.initial_cash),
        risk_free_rate: adapter
            .get_double("backtest", "risk_free_rate")?
            .unwrap_or(defaults.risk_free_rate),
    })
}

pub fn build_strategy(
    adapter: &dyn ConfigPort,
    name_override: Option<&str>,
) -> Result<Box<dyn SignalProvider>, QuantdashError> {
    strategy_from_config(adapter, name_override)
}

pub fn resolve_symbols(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    if let Some(s) = symbol_override {
        let s = s.trim().to_uppercase();
        return if s.is_empty() { vec![] } else { vec![s] };
    }

    if let Some(symbols_str) = config.get_string("backtest", "symbols") {
        let mut symbols: Vec<String> = Vec::new();
        for s in symbols_str.split(',').map(|s| s.trim().to_uppercase()) {
            if !s.is_empty() && !symbols.contains(&s) {
                symbols.push(s);
            }
        }
        return symbols;
    }

    if let Some(symbol) = config.get_string("backtest", "symbol") {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() {
            return vec![symbol];
        }
    }

    vec![]
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
    output_override: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let plan = match build_backtest_plan(&adapter, symbol_override, output_override) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let strategy = match build_strategy(&adapter, strategy_override) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    eprintln!("Strategy: {} {:?}", strategy.name(), strategy.parameters());

    let data_port = CsvAdapter::new(plan.data_dir.clone());
    let report_port = JsonReportAdapter::new();
    run_backtest_pipeline(&data_port, &report_port, strategy.as_ref(), &plan)
}

/// Fetch data for every symbol and run the batch. Symbols without usable data
/// are skipped with a warning; fails only when no run succeeds.
pub fn execute_backtests(
    data_port: &dyn DataPort,
    strategy: &dyn SignalProvider,
    plan: &BacktestPlan,
) -> Result<Vec<BacktestReport>, QuantdashError> {
    let mut loaded: Vec<(String, Vec<PriceBar>)> = Vec::with_capacity(plan.symbols.len());
    let mut first_error: Option<QuantdashError> = None;

    for symbol in &plan.symbols {
        match data_port.fetch_ohlcv(symbol, plan.start_date, plan.end_date) {
            Ok(bars) if bars.is_empty() => {
                eprintln!("warning: skipping {} (no bars in range)", symbol);
                first_error.get_or_insert(QuantdashError::NoData {
                    symbol: symbol.clone(),
                });
            }
            Ok(bars) => loaded.push((symbol.clone(), bars)),
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
                first_error.get_or_insert(e);
            }
        }
    }

    info!(
        symbols = loaded.len(),
        start = %plan.start_date,
        end = %plan.end_date,
        strategy = strategy.name(),
        "running backtests"
    );

    let jobs: Vec<BatchJob<'_>> = loaded
        .iter()
        .map(|(symbol, bars)| BatchJob {
            symbol: symbol.clone(),
            bars: bars.as_slice(),
            strategy,
            config: plan.config.clone(),
        })
        .collect();

    let mut reports = Vec::with_capacity(jobs.len());
    for (job, result) in jobs.iter().zip(run_batch(&jobs)) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!("warning: {} failed ({})", job.symbol, e);
                first_error.get_or_insert(e);
            }
        }
    }

    if reports.is_empty() {
        return Err(first_error.unwrap_or_else(|| QuantdashError::NoData {
            symbol: plan.symbols.join(","),
        }));
    }
    Ok(reports)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    strategy: &dyn SignalProvider,
    plan: &BacktestPlan,
) -> ExitCode {
    eprintln!(
        "Running backtest: {} symbols, {} to {}",
        plan.symbols.len(),
        plan.start_date,
        plan.end_date,
    );

    let reports = match execute_backtests(data_port, strategy, plan) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    for report in &reports {
        print_summary(report);
    }

    if let Some(output) = &plan.output {
        if let Err(e) = report_port.write(&reports, &output.to_string_lossy()) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        eprintln!("\nReport written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

pub fn print_summary(report: &BacktestReport) {
    let m = &report.metrics;
    eprintln!("\n=== {} ({}) ===", report.symbol, report.strategy);
    eprintln!("Final Value:      {:.2}", m.final_value);
    eprintln!("Total Return:     {:.2}%", m.total_return_pct);
    eprintln!("Annualized:       {:.2}%", m.annualized_return_pct);
    eprintln!("Volatility:       {:.2}%", m.volatility_pct);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", m.sortino_ratio);
    eprintln!(
        "Max Drawdown:     {:.2}% over {} days",
        m.max_drawdown_pct, m.max_drawdown_duration
    );
    eprintln!("Total Trades:     {}", m.total_trades);
    match m.win_rate_pct {
        Some(rate) => eprintln!("Win Rate:         {:.1}%", rate),
        None => eprintln!("Win Rate:         n/a"),
    }
    match m.profit_factor {
        Some(pf) => eprintln!("Profit Factor:    {:.2}", pf),
        None => eprintln!("Profit Factor:    n/a"),
    }
    if let Some(open) = &report.open_position {
        eprintln!(
            "Open Position:    {:.4} shares since {} at {:.2}",
            open.shares, open.entry_date, open.entry_price
        );
    }
    if let Some(pnl) = report.unrealized_pnl {
        eprintln!("Unrealized P&L:   {:.2}", pnl);
    }
}

pub fn run_dry_run(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let plan = match build_backtest_plan(&adapter, symbol_override, None) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let strategy = match build_strategy(&adapter, strategy_override) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    eprintln!("Config validated successfully");

    eprintln!("\nStrategy: {}", strategy.name());
    for (key, value) in strategy.parameters() {
        eprintln!("  {}: {}", key, value);
    }

    eprintln!("\nBacktest:");
    eprintln!("  initial_cash:   {}", plan.config.initial_cash);
    eprintln!("  risk_free_rate: {}", plan.config.risk_free_rate);
    eprintln!("  range:          {} to {}", plan.start_date, plan.end_date);
    eprintln!("  symbols:        {}", plan.symbols.join(", "));
    eprintln!("  data_dir:       {}", plan.data_dir.display());

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data_dir = config
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let adapter = CsvAdapter::new(PathBuf::from(&data_dir));

    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    if symbols.is_empty() {
        warn!(data_dir = %data_dir, "no symbol files found");
        eprintln!("No symbols found in {}", data_dir);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_strategies() -> ExitCode {
    let defaults = match FileConfigAdapter::from_string("") {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    for name in strategy_names() {
        let strategy = match strategy_from_config(&defaults, Some(name)) {
            Ok(s) => s,
            Err(e) => return fail(e),
        };
        let params: Vec<String> = strategy
            .parameters()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!("{}  {}", name, params.join(" "));
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const VALID: &str = r#"
[backtest]
initial_cash = 50000
risk_free_rate = 0.02
start_date = 2023-01-01
end_date = 2023-12-31
symbols = spy, qqq, SPY
data_dir = /srv/data

[strategy]
name = turtle_breakout

[report]
output = out/report.json
"#;

    #[test]
    fn resolve_symbols_override_wins() {
        assert_eq!(resolve_symbols(Some(" iwm "), &config(VALID)), vec!["IWM"]);
    }

    #[test]
    fn resolve_symbols_dedupes_and_uppercases() {
        assert_eq!(resolve_symbols(None, &config(VALID)), vec!["SPY", "QQQ"]);
    }

    #[test]
    fn resolve_symbols_falls_back_to_single_key() {
        let c = config("[backtest]\nsymbol = dia\n");
        assert_eq!(resolve_symbols(None, &c), vec!["DIA"]);
        assert!(resolve_symbols(None, &config("[backtest]\n")).is_empty());
    }

    #[test]
    fn build_plan_reads_all_fields() {
        let plan = build_backtest_plan(&config(VALID), None, None).unwrap();
        assert_eq!(plan.config.initial_cash, 50_000.0);
        assert_eq!(plan.config.risk_free_rate, 0.02);
        assert_eq!(plan.start_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(plan.end_date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(plan.symbols, vec!["SPY", "QQQ"]);
        assert_eq!(plan.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(plan.output, Some(PathBuf::from("out/report.json")));
    }

    #[test]
    fn build_plan_output_override() {
        let out = PathBuf::from("elsewhere.json");
        let plan = build_backtest_plan(&config(VALID), Some("iwm"), Some(&out)).unwrap();
        assert_eq!(plan.output, Some(out));
        assert_eq!(plan.symbols, vec!["IWM"]);
    }

    #[test]
    fn build_plan_rejects_invalid_config() {
        let c = config("[backtest]\ninitial_cash = 0\nstart_date = 2023-01-01\nend_date = 2023-12-31\nsymbols = SPY\n");
        assert!(matches!(
            build_backtest_plan(&c, None, None),
            Err(QuantdashError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn build_strategy_uses_override() {
        let strategy = build_strategy(&config(VALID), Some("rsi_pullback")).unwrap();
        assert_eq!(strategy.name(), "rsi_pullback");
    }

    #[test]
    fn build_backtest_config_defaults() {
        let c = build_backtest_config(&config("[backtest]\n")).unwrap();
        assert_eq!(c, BacktestConfig::default());
    }

    #[test]
    fn build_backtest_config_rejects_unparsable_rate() {
        let err = build_backtest_config(&config("[backtest]\nrisk_free_rate = 5%\n")).unwrap_err();
        assert!(matches!(err, QuantdashError::ConfigInvalid { key, .. } if key == "risk_free_rate"));
    }
}
