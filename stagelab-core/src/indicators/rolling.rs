//! Rolling-window reductions (min, max, median).
//!
//! Output at index i covers values[i+1-period..=i]; any NaN in that window
//! (including the warm-up before `period` values exist) yields NaN.

fn rolling_with<F>(values: &[f64], period: usize, reduce: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = reduce(window);
    }
    result
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_with(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_with(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Median; even-sized windows average the two middle values.
pub fn rolling_median(values: &[f64], period: usize) -> Vec<f64> {
    rolling_with(values, period, median)
}

pub(crate) fn median(window: &[f64]) -> f64 {
    let mut sorted = window.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
