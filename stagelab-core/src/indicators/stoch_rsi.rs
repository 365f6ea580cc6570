//! Stochastic RSI.
//!
//! raw = 100 * (rsi - min(rsi, n)) / (max(rsi, n) - min(rsi, n))
//! %K  = SMA(raw, smooth_k), %D = SMA(%K, smooth_d)
//!
//! A flat RSI window has a zero range; the denominator is replaced by 1 so
//! the raw value becomes 0 rather than NaN.

use crate::indicators::rolling::{rolling_max, rolling_min};
use crate::indicators::sma::sma_of_series;

#[derive(Debug, Clone, PartialEq)]
pub struct StochRsi {
    pub raw: Vec<f64>,
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// Build the oscillator on an already-computed RSI series.
pub fn stoch_rsi(rsi: &[f64], stoch_period: usize, smooth_k: usize, smooth_d: usize) -> StochRsi {
    let lows = rolling_min(rsi, stoch_period);
    let highs = rolling_max(rsi, stoch_period);

    let raw: Vec<f64> = rsi
        .iter()
        .zip(lows.iter().zip(&highs))
        .map(|(&r, (&lo, &hi))| {
            let range = hi - lo;
            let denom = if range == 0.0 { 1.0 } else { range };
            100.0 * (r - lo) / denom
        })
        .collect();
    let k = sma_of_series(&raw, smooth_k);
    let d = sma_of_series(&k, smooth_d);

    StochRsi { raw, k, d }
}
