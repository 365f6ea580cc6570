//! Directional Movement Index: +DI and -DI.
//!
//! Steps:
//! 1. +DM = up-move if it exceeds the down-move and is positive, else 0 (mirror for -DM)
//! 2. Smooth +DM, -DM and true range over `period`
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//!
//! Lookback: period. A zero smoothed true range (perfectly flat bars)
//! yields 0 for both lines instead of NaN.

use crate::domain::PriceBar;
use crate::indicators::sma::sma_of_series;
use crate::indicators::wilder::{true_range, wilder_smooth};

/// Paired +DI / -DI series, same length as the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalIndex {
    pub plus: Vec<f64>,
    pub minus: Vec<f64>,
}

fn directional_movement(bars: &[PriceBar]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;

        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let mut tr = true_range(bars);
    // TR[0] has no previous close; keep it out of the smoothing window so
    // all three series start at the same bar.
    if !tr.is_empty() {
        tr[0] = f64::NAN;
    }

    (plus_dm, minus_dm, tr)
}

fn to_di(smoothed_dm: &[f64], smoothed_tr: &[f64]) -> Vec<f64> {
    smoothed_dm
        .iter()
        .zip(smoothed_tr)
        .map(|(&dm, &tr)| {
            if dm.is_nan() || tr.is_nan() {
                f64::NAN
            } else if tr == 0.0 {
                0.0
            } else {
                100.0 * dm / tr
            }
        })
        .collect()
}

/// Wilder-smoothed directional index.
pub fn wilder_di(bars: &[PriceBar], period: usize) -> DirectionalIndex {
    let (plus_dm, minus_dm, tr) = directional_movement(bars);
    let smooth_tr = wilder_smooth(&tr, period);
    DirectionalIndex {
        plus: to_di(&wilder_smooth(&plus_dm, period), &smooth_tr),
        minus: to_di(&wilder_smooth(&minus_dm, period), &smooth_tr),
    }
}

/// Directional index over plain rolling windows.
pub fn rolling_di(bars: &[PriceBar], period: usize) -> DirectionalIndex {
    let (plus_dm, minus_dm, tr) = directional_movement(bars);
    let smooth_tr = sma_of_series(&tr, period);
    DirectionalIndex {
        plus: to_di(&sma_of_series(&plus_dm, period), &smooth_tr),
        minus: to_di(&sma_of_series(&minus_dm, period), &smooth_tr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    fn trending_bars(step: f64) -> Vec<PriceBar> {
        let data: Vec<_> = (0..20)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                (base, base + 2.0, base - 2.0, base + step / 2.0)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn uptrend_has_plus_dominant() {
        let bars = trending_bars(3.0);
        for di in [wilder_di(&bars, 5), rolling_di(&bars, 5)] {
            let last = bars.len() - 1;
            assert!(di.plus[last] > di.minus[last]);
            assert_eq!(di.minus[last], 0.0);
        }
    }

    #[test]
    fn downtrend_has_minus_dominant() {
        let bars = trending_bars(-3.0);
        let di = wilder_di(&bars, 5);
        let last = bars.len() - 1;
        assert!(di.minus[last] > di.plus[last]);
    }

    #[test]
    fn warmup_is_nan() {
        let bars = trending_bars(1.0);
        let di = wilder_di(&bars, 5);
        for i in 0..5 {
            assert!(di.plus[i].is_nan(), "expected NaN at {i}");
            assert!(di.minus[i].is_nan());
        }
        assert!(!di.plus[5].is_nan());
    }

    #[test]
    fn flat_bars_yield_zero_not_nan() {
        let bars = make_ohlc_bars(&[(10.0, 10.0, 10.0, 10.0); 10]);
        let di = wilder_di(&bars, 5);
        assert_eq!(di.plus[9], 0.0);
        assert_eq!(di.minus[9], 0.0);
    }

    #[test]
    fn di_bounds() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
        ]);
        for di in [wilder_di(&bars, 3), rolling_di(&bars, 3)] {
            for v in di.plus.iter().chain(&di.minus).filter(|v| !v.is_nan()) {
                assert!((0.0..=100.0).contains(v), "DI out of bounds: {v}");
            }
        }
    }
}
