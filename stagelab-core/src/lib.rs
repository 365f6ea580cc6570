//! StageLab Core: the analytical engine of the stage-2 screen.
//!
//! This crate contains:
//! - Domain types (price bars, quarterly financials, earnings surprises, trades)
//! - Indicator engine with native and reference providers
//! - Trend-template primary screen
//! - Fundamental scorer (EPS, margin, sales direction plus surprise consistency)
//! - Volatility contraction pattern detector
//! - Backtest of the primary screen and trade reconstruction
//!
//! Everything here is pure: complete series in, results out. No I/O.

pub mod backtest;
pub mod domain;
pub mod fundamental;
pub mod indicators;
pub mod screen;
pub mod vcp;

pub use backtest::{backtest_primary_screen, reconstruct_trades, transitions, ScreenPoint};
pub use fundamental::{fundamental_screen, FundamentalParams, ScoreComponents, ScoreResult};
pub use indicators::{compute_indicators, compute_indicators_with, IndicatorFrame};
pub use screen::{primary_screen, ScreenCheck, TrendTemplate};
pub use vcp::{vcp_analysis, Contraction, VcpParams, VcpResult};
