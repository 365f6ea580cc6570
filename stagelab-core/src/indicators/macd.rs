//! MACD-style oscillator.
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(signal) of line,
//! histogram = line - signal. The smoothing function is supplied by the
//! caller so both EMA seedings can share this composition.
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal/histogram.

/// Line, signal and histogram, each the same length as the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_with<F>(values: &[f64], fast: usize, slow: usize, signal: usize, ema: F) -> Macd
where
    F: Fn(&[f64], usize) -> Vec<f64>,
{
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    // NaN - x stays NaN, so the line inherits the slower warm-up.
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema(&line, signal);
    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| l - s)
        .collect();

    Macd {
        line,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ema::{ema_of_series, ewm_of_series};
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn warmup_lengths() {
        let values = ramp(40);
        for macd in [
            macd_with(&values, 8, 13, 5, ema_of_series),
            macd_with(&values, 8, 13, 5, ewm_of_series),
        ] {
            assert!(macd.line[11].is_nan());
            assert!(!macd.line[12].is_nan());
            assert!(macd.signal[15].is_nan());
            assert!(!macd.signal[16].is_nan());
            assert!(!macd.histogram[16].is_nan());
        }
    }

    #[test]
    fn rising_series_has_positive_line() {
        let macd = macd_with(&ramp(60), 8, 13, 5, ema_of_series);
        assert!(macd.line[59] > 0.0);
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let values: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let macd = macd_with(&values, 8, 13, 5, ema_of_series);
        for i in 16..50 {
            assert_approx(
                macd.histogram[i],
                macd.line[i] - macd.signal[i],
                DEFAULT_EPSILON,
            );
        }
    }

    #[test]
    fn constant_series_is_flat_zero() {
        let macd = macd_with(&vec![50.0; 40], 8, 13, 5, ema_of_series);
        assert_approx(macd.line[39], 0.0, DEFAULT_EPSILON);
        assert_approx(macd.histogram[39], 0.0, DEFAULT_EPSILON);
    }
}
