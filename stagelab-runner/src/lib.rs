//! StageLab Runner: data loading, scan configuration and batch scans.
//!
//! This crate builds on `stagelab-core` to provide:
//! - CSV loading of prices, quarterly financials and earnings surprises
//! - TOML scan configuration with defaulted sections
//! - Backtest performance summaries over the trailing window
//! - Parallel per-symbol scans producing ranked reports

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod scan;

pub use config::{ConfigError, ScanConfig, ScanSection};
pub use data_loader::{
    discover_symbols, load_financials_csv, load_fundamentals, load_price_csv, load_surprises_csv,
    Fundamentals, LoadError,
};
pub use metrics::{run_backtest, summarize, BacktestParams, BacktestSummary};
pub use scan::{analyze_symbol, rank_reports, scan_directory, scan_symbol, ScanError, SymbolReport};
