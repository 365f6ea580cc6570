//! Shape scoring of a quarterly series: momentum, acceleration and
//! year-over-year growth, squashed into [0, 1].

/// Neutral score for series without enough information.
pub const NEUTRAL: f64 = 0.5;

/// Sum of `values[i] * decay^i`.
pub(crate) fn decayed_sum(values: &[f64], decay: f64) -> f64 {
    let mut weight = 1.0;
    let mut total = 0.0;
    for &v in values {
        total += v * weight;
        weight *= decay;
    }
    total
}

/// `values[i] - values[i + 1]` for each adjacent pair.
pub(crate) fn forward_differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[0] - w[1]).collect()
}

/// Score the direction of a chronological (oldest-first) series.
///
/// Missing points are dropped. The remaining values are reordered
/// most-recent-first and normalized by their largest magnitude, then:
/// - momentum: decayed sum of period-over-period changes (weight 0.5)
/// - acceleration: decayed sum of the change-of-change (weight 0.3)
/// - growth: (latest - four quarters earlier) / 4, when 4+ points (weight 0.2)
///
/// The blend is multiplied by `weigher`, passed through tanh and mapped
/// from [-1, 1] to [0, 1]. Fewer than two points, or an all-zero series,
/// scores exactly 0.5.
pub fn continuous_direction(series: &[Option<f64>], decay: f64, weigher: f64) -> f64 {
    let recent_first: Vec<f64> = series.iter().rev().filter_map(|v| *v).collect();
    if recent_first.len() < 2 {
        return NEUTRAL;
    }

    let max_abs = recent_first.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if max_abs == 0.0 || !max_abs.is_finite() {
        return NEUTRAL;
    }
    let normalized: Vec<f64> = recent_first.iter().map(|v| v / max_abs).collect();

    let changes = forward_differences(&normalized);
    let momentum = decayed_sum(&changes, decay);

    let acceleration = if changes.len() > 1 {
        decayed_sum(&forward_differences(&changes), decay)
    } else {
        0.0
    };

    let annual_growth = if normalized.len() >= 4 {
        normalized[0] - normalized[3]
    } else {
        0.0
    };

    let raw = weigher * (0.5 * momentum + 0.3 * acceleration + 0.2 * annual_growth / 4.0);
    raw.tanh() / 2.0 + 0.5
}
