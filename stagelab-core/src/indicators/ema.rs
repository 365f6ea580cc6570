//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//!
//! Two seedings are provided:
//! - `ema_of_series`: seed is the SMA of the first `period` valid values.
//! - `ewm_of_series`: seed is the first valid value itself (no seed window),
//!   with outputs before `period - 1` valid values masked as NaN.
//!
//! Both skip leading NaNs, so they can be chained (e.g. EMA of a MACD line).

fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

/// SMA-seeded EMA. Lookback: leading NaNs + period - 1.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let start = match first_valid(values) {
        Some(s) => s,
        None => return result,
    };
    if period == 0 || n - start < period {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let mut sum = 0.0;
    for &v in &values[start..start + period] {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[start + period - 1] = seed;

    let mut prev = seed;
    for i in (start + period)..n {
        if values[i].is_nan() {
            // NaN propagates: once we see NaN, subsequent values are tainted
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

/// First-value-seeded EMA, masked until `period` values have been seen.
pub fn ewm_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let start = match first_valid(values) {
        Some(s) => s,
        None => return result,
    };
    if period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[start];
    for (i, &v) in values.iter().enumerate().skip(start) {
        if v.is_nan() {
            return result;
        }
        if i > start {
            prev = alpha * v + (1.0 - alpha) * prev;
        }
        if i + 1 >= start + period {
            result[i] = prev;
        }
    }

    result
}
