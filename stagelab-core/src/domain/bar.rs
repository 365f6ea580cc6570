//! PriceBar and PriceSeries: the validated market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV bar for a single symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Check a single bar. `index` is only used for error reporting.
    pub fn validate(&self, index: usize) -> Result<(), BarError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() {
                return Err(BarError::NonFinite { index, field });
            }
            if value <= 0.0 {
                return Err(BarError::NonPositivePrice {
                    index,
                    field,
                    value,
                });
            }
        }
        if !self.volume.is_finite() {
            return Err(BarError::NonFinite {
                index,
                field: "volume",
            });
        }
        if self.volume < 0.0 {
            return Err(BarError::NegativeVolume {
                index,
                value: self.volume,
            });
        }
        if self.high < self.low {
            return Err(BarError::InvertedRange {
                index,
                high: self.high,
                low: self.low,
            });
        }
        Ok(())
    }
}

/// Malformed price input. Surfaced to the caller, never swallowed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("price series is empty")]
    Empty,

    #[error("bar {index}: {field} is not finite")]
    NonFinite { index: usize, field: &'static str },

    #[error("bar {index}: {field} must be positive, got {value}")]
    NonPositivePrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("bar {index}: volume must be non-negative, got {value}")]
    NegativeVolume { index: usize, value: f64 },

    #[error("bar {index}: high {high} is below low {low}")]
    InvertedRange { index: usize, high: f64, low: f64 },

    #[error("bar {index}: date {date} does not follow {previous}")]
    NotAscending {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },
}

/// An ascending-by-date, validated sequence of bars.
///
/// Construction is the only place malformed input is detected; every
/// analysis function downstream takes a `PriceSeries` (or a frame built
/// from one) and can rely on strictly increasing dates and finite,
/// positive prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validate bars that are expected to be sorted already.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, BarError> {
        if bars.is_empty() {
            return Err(BarError::Empty);
        }
        for (i, bar) in bars.iter().enumerate() {
            bar.validate(i)?;
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(BarError::NotAscending {
                    index: i,
                    previous: bars[i - 1].date,
                    date: bar.date,
                });
            }
        }
        Ok(Self { bars })
    }

    /// Sort by date, then validate. Duplicate dates are still rejected.
    pub fn from_unsorted(mut bars: Vec<PriceBar>) -> Result<Self, BarError> {
        bars.sort_by_key(|b| b.date);
        Self::new(bars)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Prefix view `0..=end`. Returns `None` if `end` is out of range.
    pub fn truncated(&self, end: usize) -> Option<PriceSeries> {
        if end >= self.bars.len() {
            return None;
        }
        Some(Self {
            bars: self.bars[..=end].to_vec(),
        })
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bars = Vec::<PriceBar>::deserialize(deserializer)?;
        PriceSeries::new(bars).map_err(serde::de::Error::custom)
    }
}
