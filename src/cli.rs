//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReport;
use crate::adapters::text_report::TextReport;
use crate::domain::backtest::{
    self as backtest_engine, BacktestConfig, DEFAULT_EXIT_HORIZON, DEFAULT_INITIAL_BALANCE,
    DEFAULT_WARMUP,
};
use crate::domain::config_validation::{validate_backtest_config, validate_signal_config};
use crate::domain::confluence::NEUTRAL_SENTIMENT;
use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::Candle;
use crate::domain::risk::DEFAULT_MAX_RISK_PERCENT;
use crate::domain::signal::{generate_signal, Signal, SignalConfig, DEFAULT_MIN_CANDLES};
use crate::domain::universe::{load_universe, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::CandlePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "confluence", about = "Technical confluence signal engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a trading signal for one symbol
    Signal {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory holding <SYMBOL>.csv files
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Fear & Greed index override (0-100)
        #[arg(long)]
        sentiment: Option<f64>,
        #[arg(long)]
        lookback_days: Option<u32>,
        /// Account balance used to suggest a position quantity
        #[arg(long)]
        balance: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Generate signals for many symbols in parallel
    Scan {
        /// Comma-separated symbols; defaults to [data] symbols or every CSV file
        #[arg(long)]
        symbols: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        sentiment: Option<f64>,
        #[arg(long)]
        lookback_days: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Replay the signal pipeline over a symbol's history
    Backtest {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        lookback_days: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Options shared by the data-reading commands.
struct DataArgs<'a> {
    config: Option<&'a Path>,
    data: Option<&'a Path>,
    lookback_days: Option<u32>,
    json: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match &cli.command {
        Command::Signal {
            symbol,
            config,
            data,
            sentiment,
            lookback_days,
            balance,
            json,
        } => run_signal(
            symbol,
            *sentiment,
            *balance,
            DataArgs {
                config: config.as_deref(),
                data: data.as_deref(),
                lookback_days: *lookback_days,
                json: *json,
            },
        ),
        Command::Scan {
            symbols,
            config,
            data,
            sentiment,
            lookback_days,
            json,
        } => run_scan(
            symbols.as_deref(),
            *sentiment,
            DataArgs {
                config: config.as_deref(),
                data: data.as_deref(),
                lookback_days: *lookback_days,
                json: *json,
            },
        ),
        Command::Backtest {
            symbol,
            config,
            data,
            lookback_days,
            json,
        } => run_backtest(
            symbol,
            DataArgs {
                config: config.as_deref(),
                data: data.as_deref(),
                lookback_days: *lookback_days,
                json: *json,
            },
        ),
        Command::Validate { config } => run_validate(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ConfluenceError> {
    FileConfigAdapter::from_file(path).map_err(|e| ConfluenceError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Loads the config file when given, otherwise an empty config so every
/// key falls back to its default.
fn load_optional_config(path: Option<&Path>) -> Result<FileConfigAdapter, ConfluenceError> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            load_config(p)
        }
        None => FileConfigAdapter::from_string("").map_err(|reason| {
            ConfluenceError::ConfigParse {
                file: "<empty>".into(),
                reason,
            }
        }),
    }
}

fn read_count(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    usize::try_from(config.get_int(section, key, default as i64)).unwrap_or(default)
}

pub fn build_signal_config(config: &dyn ConfigPort) -> Result<SignalConfig, ConfluenceError> {
    validate_signal_config(config)?;
    Ok(SignalConfig {
        sentiment: config.get_double("signal", "sentiment", NEUTRAL_SENTIMENT),
        max_risk_percent: config.get_double("signal", "max_risk_percent", DEFAULT_MAX_RISK_PERCENT),
        min_candles: read_count(config, "signal", "min_candles", DEFAULT_MIN_CANDLES),
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, ConfluenceError> {
    validate_backtest_config(config)?;
    Ok(BacktestConfig {
        initial_balance: config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE),
        warmup: read_count(config, "backtest", "warmup", DEFAULT_WARMUP),
        exit_horizon: read_count(config, "backtest", "exit_horizon", DEFAULT_EXIT_HORIZON),
        signal: build_signal_config(config)?,
    })
}

/// The `--data` flag wins over `[data] path`.
pub fn resolve_data_dir(
    data_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, ConfluenceError> {
    if let Some(dir) = data_override {
        return Ok(dir.to_path_buf());
    }
    config
        .get_string("data", "path")
        .map(PathBuf::from)
        .ok_or_else(|| ConfluenceError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

pub fn resolve_lookback(lookback_override: Option<u32>, config: &dyn ConfigPort) -> Option<u32> {
    lookback_override.or_else(|| {
        config
            .has_key("data", "lookback_days")
            .then(|| config.get_int("data", "lookback_days", 0))
            .and_then(|days| u32::try_from(days).ok())
            .filter(|days| *days > 0)
    })
}

/// Symbols from the flag, then `[data] symbols`, then everything the port lists.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
    port: &dyn CandlePort,
) -> Result<Vec<String>, ConfluenceError> {
    if let Some(list) = symbols_override {
        return Ok(parse_symbols(list)?);
    }
    if let Some(list) = config.get_string("data", "symbols") {
        return Ok(parse_symbols(&list)?);
    }
    port.list_symbols()
}

fn apply_sentiment(signal_config: &mut SignalConfig, sentiment: Option<f64>) {
    if let Some(value) = sentiment {
        signal_config.sentiment = value;
    }
}

fn reporter(json: bool) -> Box<dyn ReportPort> {
    if json {
        Box::new(JsonReport)
    } else {
        Box::new(TextReport)
    }
}

/// Fetches a symbol's history and enforces the minimum candle count.
pub fn fetch_history(
    port: &dyn CandlePort,
    symbol: &str,
    lookback_days: Option<u32>,
    min_candles: usize,
) -> Result<Vec<Candle>, ConfluenceError> {
    let candles = port.fetch_candles(symbol, lookback_days)?;
    if candles.is_empty() {
        return Err(ConfluenceError::NoData {
            symbol: symbol.to_string(),
        });
    }
    if candles.len() < min_candles {
        return Err(ConfluenceError::InsufficientData {
            symbol: symbol.to_string(),
            bars: candles.len(),
            minimum: min_candles,
        });
    }
    info!(symbol, bars = candles.len(), "loaded candles");
    Ok(candles)
}

fn run_signal(
    symbol: &str,
    sentiment: Option<f64>,
    balance: Option<f64>,
    args: DataArgs<'_>,
) -> Result<(), ConfluenceError> {
    let config = load_optional_config(args.config)?;
    let mut signal_config = build_signal_config(&config)?;
    apply_sentiment(&mut signal_config, sentiment);

    let port = CsvAdapter::new(resolve_data_dir(args.data, &config)?);
    let symbol = symbol.to_uppercase();
    let lookback = resolve_lookback(args.lookback_days, &config);
    let candles = fetch_history(&port, &symbol, lookback, signal_config.min_candles)?;

    let signal = generate_signal(&candles, &signal_config)?;
    info!(
        %symbol,
        recommendation = %signal.recommendation,
        score = signal.score,
        "signal generated"
    );
    println!("{}", reporter(args.json).render_signal(&symbol, &signal)?);

    if let Some(balance) = balance {
        let units = signal.risk_plan().units_for_balance(balance);
        info!(%symbol, balance, units, "suggested position");
        if !args.json {
            println!("  suggested quantity {units:.6} for balance {balance:.2}");
        }
    }
    Ok(())
}

fn run_scan(
    symbols: Option<&str>,
    sentiment: Option<f64>,
    args: DataArgs<'_>,
) -> Result<(), ConfluenceError> {
    let config = load_optional_config(args.config)?;
    let mut signal_config = build_signal_config(&config)?;
    apply_sentiment(&mut signal_config, sentiment);

    let port = CsvAdapter::new(resolve_data_dir(args.data, &config)?);
    let symbols = resolve_symbols(symbols, &config, &port)?;
    let lookback = resolve_lookback(args.lookback_days, &config);
    info!(count = symbols.len(), "scanning symbols");

    let universe = load_universe(&port, &symbols, lookback, signal_config.min_candles)?;

    let mut signals: Vec<(String, Signal)> = universe
        .loaded
        .par_iter()
        .map(|loaded| {
            generate_signal(&loaded.candles, &signal_config)
                .map(|signal| (loaded.symbol.clone(), signal))
        })
        .collect::<Result<Vec<_>, ConfluenceError>>()?;

    signals.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then_with(|| a.0.cmp(&b.0)));

    println!("{}", reporter(args.json).render_scan(&signals)?);
    Ok(())
}

fn run_backtest(symbol: &str, args: DataArgs<'_>) -> Result<(), ConfluenceError> {
    let config = load_optional_config(args.config)?;
    let bt_config = build_backtest_config(&config)?;

    let port = CsvAdapter::new(resolve_data_dir(args.data, &config)?);
    let symbol = symbol.to_uppercase();
    let lookback = resolve_lookback(args.lookback_days, &config);
    let candles = fetch_history(&port, &symbol, lookback, bt_config.signal.min_candles)?;

    info!(
        %symbol,
        warmup = bt_config.warmup,
        exit_horizon = bt_config.exit_horizon,
        "running backtest"
    );
    let result = backtest_engine::run_backtest(&candles, &bt_config)?;
    println!("{}", reporter(args.json).render_backtest(&symbol, &result)?);
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), ConfluenceError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(config_path)?;
    let bt_config = build_backtest_config(&config)?;

    eprintln!(
        "  [signal]   sentiment = {}, max_risk_percent = {}, min_candles = {}",
        bt_config.signal.sentiment, bt_config.signal.max_risk_percent, bt_config.signal.min_candles
    );
    eprintln!(
        "  [backtest] initial_balance = {}, warmup = {}, exit_horizon = {}",
        bt_config.initial_balance, bt_config.warmup, bt_config.exit_horizon
    );
    if let Some(path) = config.get_string("data", "path") {
        eprintln!("  [data]     path = {path}");
    }
    if let Some(list) = config.get_string("data", "symbols") {
        let symbols = parse_symbols(&list)?;
        eprintln!("  [data]     symbols = {}", symbols.join(","));
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}
