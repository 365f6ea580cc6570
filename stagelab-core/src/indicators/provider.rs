//! Indicator providers: interchangeable implementations of the primitives
//! the frame is built from.
//!
//! - `WilderProvider`: the native set: SMA-seeded EMAs, Wilder RSI and
//!   Wilder-smoothed directional index.
//! - `ReferenceProvider`: a portable set built only from plain rolling
//!   windows and first-value-seeded EMAs.
//!
//! The provider is picked explicitly by the caller (`ProviderKind`), never
//! by probing what happens to be available at runtime.

use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;
use crate::indicators::dmi::{rolling_di, wilder_di, DirectionalIndex};
use crate::indicators::ema::{ema_of_series, ewm_of_series};
use crate::indicators::macd::{macd_with, Macd};
use crate::indicators::rsi::{rolling_rsi, wilder_rsi};
use crate::indicators::sma::sma_of_series;

/// Primitive indicator capability.
///
/// Every method returns a series the same length as its input, with NaN
/// for warm-up positions. No value at index t may depend on input after t.
pub trait IndicatorProvider: Send + Sync {
    /// Stable identifier (e.g. "wilder", "reference").
    fn name(&self) -> &'static str;

    fn sma(&self, values: &[f64], period: usize) -> Vec<f64>;

    fn rsi(&self, closes: &[f64], period: usize) -> Vec<f64>;

    fn macd(&self, closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd;

    fn directional_index(&self, bars: &[PriceBar], period: usize) -> DirectionalIndex;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WilderProvider;

impl IndicatorProvider for WilderProvider {
    fn name(&self) -> &'static str {
        "wilder"
    }

    fn sma(&self, values: &[f64], period: usize) -> Vec<f64> {
        sma_of_series(values, period)
    }

    fn rsi(&self, closes: &[f64], period: usize) -> Vec<f64> {
        wilder_rsi(closes, period)
    }

    fn macd(&self, closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
        macd_with(closes, fast, slow, signal, ema_of_series)
    }

    fn directional_index(&self, bars: &[PriceBar], period: usize) -> DirectionalIndex {
        wilder_di(bars, period)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceProvider;

impl IndicatorProvider for ReferenceProvider {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn sma(&self, values: &[f64], period: usize) -> Vec<f64> {
        sma_of_series(values, period)
    }

    fn rsi(&self, closes: &[f64], period: usize) -> Vec<f64> {
        rolling_rsi(closes, period)
    }

    fn macd(&self, closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
        macd_with(closes, fast, slow, signal, ewm_of_series)
    }

    fn directional_index(&self, bars: &[PriceBar], period: usize) -> DirectionalIndex {
        rolling_di(bars, period)
    }
}

/// Serializable provider selector, resolved once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Wilder,
    Reference,
}

static WILDER: WilderProvider = WilderProvider;
static REFERENCE: ReferenceProvider = ReferenceProvider;

impl ProviderKind {
    pub fn provider(self) -> &'static dyn IndicatorProvider {
        match self {
            ProviderKind::Wilder => &WILDER,
            ProviderKind::Reference => &REFERENCE,
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wilder" | "native" => Ok(ProviderKind::Wilder),
            "reference" | "portable" => Ok(ProviderKind::Reference),
            other => Err(format!("unknown indicator provider: {other}")),
        }
    }
}
