//! Volatility measure: Wilder-smoothed running median of absolute
//! day-over-day percentage change.
//!
//! pct[t] = |close[t] - close[t-1]| / close[t-1] * 100
//! vol    = wilder_smooth(rolling_median(pct, median_window), smooth_window)
//! Lookback: median_window + smooth_window - 1.

use crate::indicators::rolling::rolling_median;
use crate::indicators::wilder::wilder_smooth;

pub fn abs_pct_change(closes: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; closes.len()];
    for i in 1..closes.len() {
        let prev = closes[i - 1];
        if prev != 0.0 {
            result[i] = ((closes[i] - prev) / prev * 100.0).abs();
        }
    }
    result
}

pub fn volatility(closes: &[f64], median_window: usize, smooth_window: usize) -> Vec<f64> {
    let med = rolling_median(&abs_pct_change(closes), median_window);
    wilder_smooth(&med, smooth_window)
}
