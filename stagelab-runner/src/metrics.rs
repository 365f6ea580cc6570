//! Backtest summary: pure functions over the reconstructed trade list.
//!
//! The screen series is always computed over full history; only markers
//! inside the trailing summary window feed the trades and statistics.

use serde::{Deserialize, Serialize};
use stagelab_core::backtest::{reconstruct_trades, transitions, ScreenPoint};
use stagelab_core::domain::{PriceBar, Trade};
use stagelab_core::{IndicatorFrame, TrendTemplate};

/// Backtest cadence, summary window and capital model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    /// Evaluate the screen every this many bars.
    pub check_interval: usize,
    /// Trailing bars whose markers are summarized (one trading year).
    pub summary_window: usize,
    pub starting_capital: f64,
    /// Fraction of capital committed to each trade.
    pub allocation: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            check_interval: 1,
            summary_window: 252,
            starting_capital: 10_000.0,
            allocation: 1.0,
        }
    }
}

/// Aggregate results for the trades inside the summary window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub trade_count: usize,
    /// Percent of trades with positive P&L.
    pub win_rate: f64,
    pub avg_duration_days: f64,
    pub longest_duration_days: i64,
    pub avg_win_percent: f64,
    pub avg_loss_percent: f64,
    pub total_return_percent: f64,
    pub final_capital: f64,
    pub trades: Vec<Trade>,
    pub markers: Vec<ScreenPoint>,
}

impl BacktestSummary {
    /// Compute all statistics from a trade list.
    pub fn compute(trades: Vec<Trade>, markers: Vec<ScreenPoint>, params: &BacktestParams) -> Self {
        let final_capital = compound(&trades, params.starting_capital, params.allocation);
        let total_return_percent = if params.starting_capital > 0.0 {
            (final_capital / params.starting_capital - 1.0) * 100.0
        } else {
            0.0
        };

        Self {
            trade_count: trades.len(),
            win_rate: win_rate(&trades),
            avg_duration_days: avg_duration_days(&trades),
            longest_duration_days: longest_duration_days(&trades),
            avg_win_percent: avg_win_percent(&trades),
            avg_loss_percent: avg_loss_percent(&trades),
            total_return_percent,
            final_capital,
            trades,
            markers,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Fraction of winning trades, as a percentage. 0.0 with no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Mean holding period in calendar days. 0.0 with no trades.
pub fn avg_duration_days(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let total: i64 = trades.iter().map(Trade::duration_days).sum();
    total as f64 / trades.len() as f64
}

pub fn longest_duration_days(trades: &[Trade]) -> i64 {
    trades.iter().map(Trade::duration_days).max().unwrap_or(0)
}

/// Mean P&L percent of winning trades. 0.0 when there are none.
pub fn avg_win_percent(trades: &[Trade]) -> f64 {
    mean_f64(trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl_percent))
}

/// Mean P&L percent of non-winning trades. 0.0 when there are none.
pub fn avg_loss_percent(trades: &[Trade]) -> f64 {
    mean_f64(trades.iter().filter(|t| !t.is_winner()).map(|t| t.pnl_percent))
}

/// Capital after applying each trade in order with a fixed allocation.
pub fn compound(trades: &[Trade], starting_capital: f64, allocation: f64) -> f64 {
    trades.iter().fold(starting_capital, |capital, t| {
        capital * (1.0 + allocation * t.pnl_percent / 100.0)
    })
}

fn mean_f64(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ─── Backtest driver ────────────────────────────────────────────────

/// Markers dated on or after the first bar of the trailing window.
pub fn window_markers(bars: &[PriceBar], markers: &[ScreenPoint], window: usize) -> Vec<ScreenPoint> {
    let Some(start) = bars.len().checked_sub(window.max(1)).map(|i| bars[i].date) else {
        return markers.to_vec();
    };
    markers.iter().filter(|m| m.date >= start).copied().collect()
}

/// Summarize already-computed screen markers.
pub fn summarize(bars: &[PriceBar], markers: &[ScreenPoint], params: &BacktestParams) -> BacktestSummary {
    let windowed = window_markers(bars, markers, params.summary_window);
    let trades = reconstruct_trades(bars, &windowed);
    BacktestSummary::compute(trades, windowed, params)
}

/// Screen series over full history, then the windowed summary.
pub fn run_backtest(
    frame: &IndicatorFrame,
    template: &TrendTemplate,
    params: &BacktestParams,
) -> BacktestSummary {
    let series = template.screen_series(frame, params.check_interval);
    let markers = transitions(&series);
    summarize(frame.bars(), &markers, params)
}
