//! Earnings-surprise scoring: magnitude, sign consistency and momentum.

use super::direction::{decayed_sum, forward_differences};

/// Number of most recent reports considered.
const WINDOW: usize = 4;

/// Score a chronological (oldest-first) earnings-surprise series.
///
/// Uses the last four defined values, oldest first:
/// - weighted average with weights `decay^i`
/// - a streak multiplier `1 + 0.025 * streak^2`, where streak counts
///   consecutive values sharing the sign of the oldest one
/// - momentum: decay-weighted average of `s[i] - s[i+1]`
///
/// Result is `(tanh(1.08 * (8 * consistency + 4 * momentum)) + 1) / 2`.
/// A series with no defined values scores 0.0.
pub fn eps_surprise_score(series: &[Option<f64>], decay: f64) -> f64 {
    let defined: Vec<f64> = series.iter().filter_map(|v| *v).collect();
    let recent = &defined[defined.len().saturating_sub(WINDOW)..];
    if recent.is_empty() {
        return 0.0;
    }

    let weights: f64 = (0..recent.len()).map(|i| decay.powi(i as i32)).sum();
    let weighted_avg = decayed_sum(recent, decay) / weights;

    // f64::signum maps 0.0 to 1.0; a zero surprise starts no streak.
    let leading_sign = if recent[0] > 0.0 {
        1.0
    } else if recent[0] < 0.0 {
        -1.0
    } else {
        0.0
    };
    let streak = recent
        .iter()
        .take_while(|&&s| leading_sign * s > 0.0)
        .count() as f64;
    let consistency = weighted_avg * (1.0 + 0.025 * streak * streak);

    let changes = forward_differences(recent);
    let momentum = if changes.is_empty() {
        0.0
    } else {
        let change_weights: f64 = (0..changes.len()).map(|i| decay.powi(i as i32)).sum();
        decayed_sum(&changes, decay) / change_weights
    };

    let formula = 1.08 * (consistency * 8.0 + momentum * 4.0);
    (formula.tanh() + 1.0) / 2.0
}
