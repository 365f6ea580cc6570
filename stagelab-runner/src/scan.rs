//! Batch scan: every symbol in a price directory through the full pipeline.
//!
//! Per symbol: indicators, trend-template check at the last bar, optional
//! fundamental score, optional VCP analysis, optional backtest summary.
//! Symbols run in parallel; a failing symbol becomes a report carrying its
//! error instead of aborting the batch.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use stagelab_core::domain::PriceSeries;
use stagelab_core::indicators::compute_indicators_with;
use stagelab_core::{ScoreResult, ScreenCheck, VcpResult};

use crate::config::{ConfigError, ScanConfig};
use crate::data_loader::{discover_symbols, load_fundamentals, load_price_csv, Fundamentals, LoadError};
use crate::metrics::{run_backtest, BacktestSummary};

/// Errors that stop a whole scan (as opposed to one symbol).
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Everything computed for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub bar_count: usize,
    pub last_date: Option<NaiveDate>,
    pub close: Option<f64>,
    /// `None` when history is shorter than the template needs.
    pub screen: Option<ScreenCheck>,
    pub passed: bool,
    pub score: Option<ScoreResult>,
    pub vcp: Option<VcpResult>,
    pub backtest: Option<BacktestSummary>,
    pub errors: Vec<String>,
}

impl SymbolReport {
    /// Report for a symbol whose prices could not be loaded.
    pub fn failed(symbol: impl Into<String>, error: impl ToString) -> Self {
        Self {
            symbol: symbol.into(),
            bar_count: 0,
            last_date: None,
            close: None,
            screen: None,
            passed: false,
            score: None,
            vcp: None,
            backtest: None,
            errors: vec![error.to_string()],
        }
    }

    pub fn total_score(&self) -> Option<f64> {
        self.score.as_ref().map(|s| s.total_score)
    }
}

/// Run the configured pipeline over already-loaded data.
pub fn analyze_symbol(
    symbol: &str,
    series: &PriceSeries,
    fundamentals: Option<&Fundamentals>,
    config: &ScanConfig,
) -> SymbolReport {
    let frame = compute_indicators_with(series, config.scan.provider.provider(), &config.indicators);
    let last_bar = series.last();
    let screen = config.screen.evaluate(&frame, frame.len() - 1);
    let passed = screen.as_ref().is_some_and(|c| c.passed);

    let mut errors = Vec::new();
    let score = fundamentals.and_then(|f| {
        match config.fundamentals.score(&f.financials, &f.surprises) {
            Ok(score) => score,
            Err(e) => {
                warn!(symbol, error = %e, "fundamental scoring failed");
                errors.push(e.to_string());
                None
            }
        }
    });

    let vcp = if config.scan.vcp {
        config.vcp.analyze(series)
    } else {
        None
    };
    let backtest = config
        .scan
        .backtest
        .then(|| run_backtest(&frame, &config.screen, &config.backtest));

    debug!(symbol, passed, bars = series.len(), "analyzed");
    SymbolReport {
        symbol: symbol.to_string(),
        bar_count: series.len(),
        last_date: Some(last_bar.date),
        close: Some(last_bar.close),
        screen,
        passed,
        score,
        vcp,
        backtest,
        errors,
    }
}

/// Load one symbol's files and analyze it.
///
/// Missing or broken fundamentals do not fail the symbol: the price-based
/// parts still run and the load error is recorded in the report.
pub fn scan_symbol(symbol: &str, config: &ScanConfig) -> Result<SymbolReport, LoadError> {
    let series = load_price_csv(config.scan.price_dir.join(format!("{symbol}.csv")))?;

    let mut load_errors = Vec::new();
    let fundamentals = match &config.scan.fundamentals_dir {
        Some(dir) => load_fundamentals(dir, symbol).unwrap_or_else(|e| {
            warn!(symbol, error = %e, "fundamentals unavailable");
            load_errors.push(e.to_string());
            None
        }),
        None => None,
    };

    let mut report = analyze_symbol(symbol, &series, fundamentals.as_ref(), config);
    report.errors.extend(load_errors);
    Ok(report)
}

/// Passing symbols first, then fundamental score (highest first, unscored
/// last), then symbol name.
pub fn rank_reports(a: &SymbolReport, b: &SymbolReport) -> Ordering {
    b.passed
        .cmp(&a.passed)
        .then_with(|| match (a.total_score(), b.total_score()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Scan every `<SYMBOL>.csv` in the configured price directory.
pub fn scan_directory(config: &ScanConfig) -> Result<Vec<SymbolReport>, ScanError> {
    config.validate()?;
    let mut symbols = discover_symbols(&config.scan.price_dir)?;
    if let Some(limit) = config.scan.limit {
        symbols.truncate(limit);
    }
    info!(count = symbols.len(), provider = config.scan.provider.provider().name(), "scanning");

    let mut reports: Vec<SymbolReport> = symbols
        .par_iter()
        .map(|symbol| {
            scan_symbol(symbol, config).unwrap_or_else(|e| {
                warn!(symbol = %symbol, error = %e, "symbol failed");
                SymbolReport::failed(symbol.as_str(), e)
            })
        })
        .collect();

    reports.sort_by(rank_reports);

    let passed = reports.iter().filter(|r| r.passed).count();
    let failed = reports.iter().filter(|r| r.bar_count == 0).count();
    info!(scanned = reports.len(), passed, failed, "scan complete");
    Ok(reports)
}
