//! Backtest of the trend-template screen over full history.
//!
//! Three pure steps:
//! 1. evaluate the screen at a fixed bar cadence, each point seeing only
//!    bars up to its own date
//! 2. collapse the boolean series to its transition markers
//! 3. turn markers into long round trips entered and exited at the next
//!    session's open

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{PriceBar, Trade};
use crate::indicators::IndicatorFrame;
use crate::screen::TrendTemplate;

/// One evaluated point of the screen series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub date: NaiveDate,
    pub passed: bool,
}

impl From<(NaiveDate, bool)> for ScreenPoint {
    fn from((date, passed): (NaiveDate, bool)) -> Self {
        Self { date, passed }
    }
}

impl TrendTemplate {
    /// Screen result every `interval` bars (and always at the last bar).
    ///
    /// A zero interval is treated as 1.
    pub fn screen_series(&self, frame: &IndicatorFrame, interval: usize) -> Vec<ScreenPoint> {
        let n = frame.len();
        if n == 0 {
            return Vec::new();
        }
        let step = interval.max(1);
        let bars = frame.bars();

        let mut indices: Vec<usize> = (0..n).step_by(step).collect();
        if indices.last() != Some(&(n - 1)) {
            indices.push(n - 1);
        }

        indices
            .into_iter()
            .map(|i| ScreenPoint {
                date: bars[i].date,
                passed: self.passes_at(frame, i),
            })
            .collect()
    }
}

/// Primary-screen series over the whole frame with default thresholds.
pub fn backtest_primary_screen(frame: &IndicatorFrame, interval: usize) -> Vec<(NaiveDate, bool)> {
    TrendTemplate::default()
        .screen_series(frame, interval)
        .into_iter()
        .map(|p| (p.date, p.passed))
        .collect()
}

/// Keep only points whose value differs from the previous point.
///
/// The point before the first is taken as `false`, so a series that
/// starts passing opens with a `true` marker.
pub fn transitions(series: &[ScreenPoint]) -> Vec<ScreenPoint> {
    let mut previous = false;
    let mut markers = Vec::new();
    for point in series {
        if point.passed != previous {
            markers.push(*point);
            previous = point.passed;
        }
    }
    markers
}

/// First bar strictly after `date`.
fn next_session(bars: &[PriceBar], date: NaiveDate) -> Option<&PriceBar> {
    let idx = bars.partition_point(|b| b.date <= date);
    bars.get(idx)
}

/// Rebuild long round trips from transition markers.
///
/// Enter at the open of the first session after a `true` marker; exit at the
/// open of the first session after the following `false` marker. A trade
/// still held when the bars run out is closed at the final close.
pub fn reconstruct_trades(bars: &[PriceBar], markers: &[ScreenPoint]) -> Vec<Trade> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };

    let mut trades = Vec::new();
    let mut open: Option<&PriceBar> = None;

    for marker in markers {
        match (marker.passed, open) {
            (true, None) => match next_session(bars, marker.date) {
                Some(entry) => open = Some(entry),
                // Signal on the last bar: nothing left to trade.
                None => break,
            },
            (false, Some(entry)) => {
                let trade = match next_session(bars, marker.date) {
                    Some(exit) => Trade::new(entry.date, entry.open, exit.date, exit.open, false),
                    None => Trade::new(entry.date, entry.open, last.date, last.close, true),
                };
                trades.push(trade);
                open = None;
            }
            _ => {}
        }
    }

    if let Some(entry) = open {
        trades.push(Trade::new(
            entry.date,
            entry.open,
            last.date,
            last.close,
            true,
        ));
    }

    trades
}
