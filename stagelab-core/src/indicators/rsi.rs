//! Relative Strength Index (RSI).
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), over close-to-close changes.
//! Lookback: period (the first change is at index 1).
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0;
//! both zero (no movement) → 50.
//!
//! `wilder_rsi` smooths gains/losses with Wilder's recursion,
//! `rolling_rsi` uses a plain rolling mean over the window.

use crate::indicators::sma::sma_of_series;

/// Close-to-close changes; index 0 has no predecessor and is NaN.
pub fn price_changes(closes: &[f64]) -> Vec<f64> {
    let mut changes = vec![f64::NAN; closes.len()];
    for i in 1..closes.len() {
        changes[i] = closes[i] - closes[i - 1];
    }
    changes
}

pub(crate) fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Wilder RSI: seed averages over the first `period` changes, then
/// alpha = 1/period smoothing.
pub fn wilder_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let changes = price_changes(closes);

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &ch in &changes[1..=period] {
        if ch.is_nan() {
            return result;
        }
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result[period] = compute_rsi(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        if changes[i].is_nan() {
            return result;
        }

        let gain = changes[i].max(0.0);
        let loss = (-changes[i]).max(0.0);

        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

        result[i] = compute_rsi(avg_gain, avg_loss);
    }

    result
}

/// Rolling-mean RSI over the trailing `period` changes.
pub fn rolling_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let changes = price_changes(closes);
    let gains: Vec<f64> = changes
        .iter()
        .map(|&c| if c.is_nan() { c } else { c.max(0.0) })
        .collect();
    let losses: Vec<f64> = changes
        .iter()
        .map(|&c| if c.is_nan() { c } else { (-c).max(0.0) })
        .collect();

    let avg_gain = sma_of_series(&gains, period);
    let avg_loss = sma_of_series(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| compute_rsi(g, l))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn rsi_all_gains() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        assert_approx(wilder_rsi(&closes, 3)[3], 100.0, 1e-6);
        assert_approx(rolling_rsi(&closes, 3)[3], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let closes = [105.0, 104.0, 103.0, 102.0, 101.0, 100.0];
        assert_approx(wilder_rsi(&closes, 3)[3], 0.0, 1e-6);
        assert_approx(rolling_rsi(&closes, 3)[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let closes = [50.0; 6];
        assert_approx(wilder_rsi(&closes, 3)[5], 50.0, 1e-9);
        assert_approx(rolling_rsi(&closes, 3)[5], 50.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_seed() {
        // Changes: +0.34, -0.25, -0.48 → RSI = 100 - 100/(1 + 0.34/0.73)
        let closes = [44.0, 44.34, 44.09, 43.61, 44.33];
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        let wilder = wilder_rsi(&closes, 3);
        let rolling = rolling_rsi(&closes, 3);
        assert!(wilder[2].is_nan());
        assert_approx(wilder[3], expected, 1e-9);
        assert_approx(rolling[3], expected, 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0];
        for result in [wilder_rsi(&closes, 3), rolling_rsi(&closes, 3)] {
            for (i, &v) in result.iter().enumerate() {
                if !v.is_nan() {
                    assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
                }
            }
        }
    }

    #[test]
    fn rsi_too_few_values() {
        assert!(wilder_rsi(&[1.0, 2.0, 3.0], 3).iter().all(|v| v.is_nan()));
        assert!(rolling_rsi(&[1.0, 2.0, 3.0], 3).iter().all(|v| v.is_nan()));
    }
}
