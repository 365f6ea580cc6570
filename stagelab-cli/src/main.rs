//! StageLab CLI: stage-2 screening, fundamental scoring, VCP and backtests.
//!
//! Commands:
//! - `scan`: run every symbol in a price directory and print ranked reports
//! - `score`: fundamental score from a financials CSV and a surprises CSV
//! - `vcp`: volatility-contraction analysis of one price CSV
//! - `backtest`: trend-template backtest summary for one price CSV
//!
//! Results go to stdout as JSON; logs go to stderr (`RUST_LOG`, default `info`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stagelab_core::indicators::{compute_indicators_with, ProviderKind};
use stagelab_runner::{
    load_financials_csv, load_price_csv, load_surprises_csv, run_backtest, scan_directory,
    ScanConfig,
};

#[derive(Parser)]
#[command(
    name = "stagelab",
    about = "StageLab CLI: Minervini-style stage-2 stock screener"
)]
struct Cli {
    /// TOML scan configuration. Flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Indicator provider: wilder (native) or reference (portable).
    #[arg(long, global = true)]
    provider: Option<ProviderKind>,

    /// Pretty-print the JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen, score and backtest every <SYMBOL>.csv in a directory.
    Scan {
        /// Directory of <SYMBOL>.csv price files.
        #[arg(long)]
        price_dir: Option<PathBuf>,

        /// Directory of <SYMBOL>/financials.csv and <SYMBOL>/surprises.csv.
        #[arg(long)]
        fundamentals_dir: Option<PathBuf>,

        /// Scan at most this many symbols.
        #[arg(long)]
        limit: Option<usize>,

        /// Skip the per-symbol backtest.
        #[arg(long, default_value_t = false)]
        no_backtest: bool,

        /// Skip the per-symbol VCP analysis.
        #[arg(long, default_value_t = false)]
        no_vcp: bool,

        /// Print only symbols passing the trend template.
        #[arg(long, default_value_t = false)]
        passing_only: bool,
    },
    /// Composite fundamental score (0-100) for one company.
    Score {
        /// Quarterly financials CSV.
        #[arg(long)]
        financials: PathBuf,

        /// Earnings surprises CSV.
        #[arg(long)]
        surprises: PathBuf,
    },
    /// Volatility contraction pattern analysis of one price history.
    Vcp {
        /// Price CSV (Date, Open, High, Low, Close, Volume).
        prices: PathBuf,
    },
    /// Backtest the trend template over one price history.
    Backtest {
        /// Price CSV (Date, Open, High, Low, Close, Volume).
        prices: PathBuf,

        /// Evaluate the screen every N bars.
        #[arg(long)]
        interval: Option<usize>,

        /// Summarize only the trailing N bars.
        #[arg(long)]
        window: Option<usize>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };
    if let Some(provider) = cli.provider {
        config.scan.provider = provider;
    }

    match cli.command {
        Commands::Scan {
            price_dir,
            fundamentals_dir,
            limit,
            no_backtest,
            no_vcp,
            passing_only,
        } => {
            if let Some(dir) = price_dir {
                config.scan.price_dir = dir;
            }
            if fundamentals_dir.is_some() {
                config.scan.fundamentals_dir = fundamentals_dir;
            }
            if limit.is_some() {
                config.scan.limit = limit;
            }
            config.scan.backtest &= !no_backtest;
            config.scan.vcp &= !no_vcp;
            run_scan(&config, passing_only, cli.pretty)
        }
        Commands::Score {
            financials,
            surprises,
        } => run_score(&config, financials, surprises, cli.pretty),
        Commands::Vcp { prices } => run_vcp(&config, prices, cli.pretty),
        Commands::Backtest {
            prices,
            interval,
            window,
        } => {
            if let Some(interval) = interval {
                config.backtest.check_interval = interval;
            }
            if let Some(window) = window {
                config.backtest.summary_window = window;
            }
            run_backtest_cmd(&config, prices, cli.pretty)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn run_scan(config: &ScanConfig, passing_only: bool, pretty: bool) -> Result<()> {
    if !config.scan.price_dir.is_dir() {
        bail!(
            "price directory '{}' does not exist (set --price-dir or [scan] price_dir)",
            config.scan.price_dir.display()
        );
    }

    let mut reports = scan_directory(config)?;
    if passing_only {
        reports.retain(|r| r.passed);
    }
    print_json(&reports, pretty)
}

fn run_score(
    config: &ScanConfig,
    financials: PathBuf,
    surprises: PathBuf,
    pretty: bool,
) -> Result<()> {
    config.validate()?;
    let financials = load_financials_csv(&financials)?;
    let surprises = load_surprises_csv(&surprises)?;

    let result = config
        .fundamentals
        .score(&financials, &surprises)
        .context("scoring fundamentals")?;
    if result.is_none() {
        info!(
            quarters = financials.len(),
            surprises = surprises.len(),
            "not enough history to score"
        );
    }
    print_json(&result, pretty)
}

fn run_vcp(config: &ScanConfig, prices: PathBuf, pretty: bool) -> Result<()> {
    config.validate()?;
    let series = load_price_csv(&prices)?;
    let result = config.vcp.analyze(&series);
    if result.is_none() {
        info!(bars = series.len(), "not enough history for VCP analysis");
    }
    print_json(&result, pretty)
}

fn run_backtest_cmd(config: &ScanConfig, prices: PathBuf, pretty: bool) -> Result<()> {
    config.validate()?;
    let series = load_price_csv(&prices)?;
    let frame = compute_indicators_with(&series, config.scan.provider.provider(), &config.indicators);
    let summary = run_backtest(&frame, &config.screen, &config.backtest);
    info!(
        trades = summary.trade_count,
        win_rate = summary.win_rate,
        total_return = summary.total_return_percent,
        "backtest complete"
    );
    print_json(&summary, pretty)
}
