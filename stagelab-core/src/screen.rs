//! Trend-template screen (stage-2 uptrend filter).
//!
//! Passes a bar when all of:
//! - close > ma50 > ma150 > ma200
//! - ma200 today > ma200 `trend_lookback` bars ago
//! - close >= low_multiple * 52-week low
//! - close >= high_multiple * 52-week high
//! - RSI < rsi_ceiling
//!
//! When ma200 is still in warm-up (a young listing), the screen also passes
//! on close > ma50 > ma150 with the 52-week proximity and RSI conditions.
//! Below `min_bars` of history the screen fails closed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::{Column, IndicatorFrame};

/// Screen thresholds. `Default` carries the standard template values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendTemplate {
    /// Minimum bars of history (inclusive of the evaluated bar).
    pub min_bars: usize,
    /// Trailing window for the 52-week high/low.
    pub week52_window: usize,
    /// How far back the ma200 slope is measured.
    pub trend_lookback: usize,
    pub low_multiple: f64,
    pub high_multiple: f64,
    pub rsi_ceiling: f64,
}

impl Default for TrendTemplate {
    fn default() -> Self {
        Self {
            min_bars: 260,
            week52_window: 260,
            trend_lookback: 20,
            low_multiple: 1.30,
            high_multiple: 0.75,
            rsi_ceiling: 70.0,
        }
    }
}

/// Per-condition breakdown of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenCheck {
    pub date: NaiveDate,
    pub close: f64,
    pub low_52w: f64,
    pub high_52w: f64,
    pub ma_ordered: bool,
    pub ma200_rising: bool,
    pub near_low: bool,
    pub near_high: bool,
    pub not_overbought: bool,
    /// True when the young-listing branch produced the pass.
    pub ipo_branch: bool,
    pub passed: bool,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `a > b`, false when either side is undefined.
fn gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

impl TrendTemplate {
    /// Evaluate at bar `index` using only bars `0..=index`.
    ///
    /// Returns `None` when there is not enough history (fail closed).
    pub fn evaluate(&self, frame: &IndicatorFrame, index: usize) -> Option<ScreenCheck> {
        if index >= frame.len() || index + 1 < self.min_bars.max(1) {
            return None;
        }

        let bars = frame.bars();
        let bar = &bars[index];
        let window_start = (index + 1).saturating_sub(self.week52_window.max(1));
        let window = &bars[window_start..=index];
        let low_52w = round2(window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min));
        let high_52w = round2(
            window
                .iter()
                .map(|b| b.high)
                .fold(f64::NEG_INFINITY, f64::max),
        );

        let close = Some(bar.close);
        let ma50 = frame.value(Column::Ma50, index);
        let ma150 = frame.value(Column::Ma150, index);
        let ma200 = frame.value(Column::Ma200, index);
        let ma200_past = index
            .checked_sub(self.trend_lookback)
            .and_then(|past| frame.value(Column::Ma200, past));

        let short_ordered = gt(close, ma50) && gt(ma50, ma150);
        let ma_ordered = short_ordered && gt(ma150, ma200);
        let ma200_rising = gt(ma200, ma200_past);
        let near_low = bar.close >= self.low_multiple * low_52w;
        let near_high = bar.close >= self.high_multiple * high_52w;
        let not_overbought = frame
            .value(Column::Rsi, index)
            .is_some_and(|rsi| rsi < self.rsi_ceiling);

        let template = ma_ordered && ma200_rising && near_low && near_high && not_overbought;
        let ipo_branch =
            !template && ma200.is_none() && short_ordered && near_low && near_high && not_overbought;

        Some(ScreenCheck {
            date: bar.date,
            close: bar.close,
            low_52w,
            high_52w,
            ma_ordered,
            ma200_rising,
            near_low,
            near_high,
            not_overbought,
            ipo_branch,
            passed: template || ipo_branch,
        })
    }

    /// Boolean screen at bar `index`.
    pub fn passes_at(&self, frame: &IndicatorFrame, index: usize) -> bool {
        self.evaluate(frame, index).is_some_and(|c| c.passed)
    }

    /// Boolean screen at the latest bar.
    pub fn passes(&self, frame: &IndicatorFrame) -> bool {
        frame.len() > 0 && self.passes_at(frame, frame.len() - 1)
    }
}

/// Trend-template screen at the latest bar with default thresholds.
pub fn primary_screen(frame: &IndicatorFrame) -> bool {
    TrendTemplate::default().passes(frame)
}
