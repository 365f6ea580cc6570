//! Indicator engine.
//!
//! Primitive series functions (SMA, EMA, RSI, MACD, directional index,
//! rolling reductions, Wilder smoothing) plus the `IndicatorProvider`
//! capability that selects between the native and reference variants, and
//! `IndicatorFrame`, the enriched series every screen consumes.
//!
//! All functions are pure and causal: output at bar t never reads bar t+1.

pub mod dmi;
pub mod ema;
pub mod frame;
pub mod macd;
pub mod provider;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stoch_rsi;
pub mod volatility;
pub mod wilder;

pub use dmi::DirectionalIndex;
pub use frame::{compute_indicators, compute_indicators_with, Column, IndicatorConfig, IndicatorFrame};
pub use macd::Macd;
pub use provider::{IndicatorProvider, ProviderKind, ReferenceProvider, WilderProvider};
pub use stoch_rsi::StochRsi;

/// Create synthetic bars from OHLC tuples for testing. Volume = 1000.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| crate::domain::PriceBar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Create a validated series from close prices for testing.
///
/// open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::PriceSeries {
    let data: Vec<_> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, (open.min(close) - 1.0).max(0.01), close)
        })
        .collect();
    crate::domain::PriceSeries::new(make_ohlc_bars(&data)).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
