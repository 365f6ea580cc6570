//! Trade: a completed (or marked-to-close) round trip produced by the backtest.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A long round trip: entry at a session open, exit at a session open or
/// at the final close when the position is still held at series end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub pnl_percent: f64,
    /// True when the exit is the final close rather than a screen failure.
    pub open_at_end: bool,
}

impl Trade {
    pub fn new(
        entry_date: NaiveDate,
        entry_price: f64,
        exit_date: NaiveDate,
        exit_price: f64,
        open_at_end: bool,
    ) -> Self {
        let pnl_percent = if entry_price > 0.0 {
            (exit_price - entry_price) / entry_price * 100.0
        } else {
            0.0
        };
        Self {
            entry_date,
            entry_price,
            exit_date,
            exit_price,
            pnl_percent,
            open_at_end,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_percent > 0.0
    }

    /// Calendar days between entry and exit.
    pub fn duration_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            100.0,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            110.0,
            false,
        )
    }

    #[test]
    fn pnl_percent_calculation() {
        let trade = sample_trade();
        assert!((trade.pnl_percent - 10.0).abs() < 1e-10);
        assert!(trade.is_winner());
    }

    #[test]
    fn duration_in_calendar_days() {
        assert_eq!(sample_trade().duration_days(), 10);
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
