//! Volatility contraction pattern (VCP) detector.
//!
//! Finds the anchor peak of the recent base, the pullback from it, an
//! optional deeper pullback before it, and then walks forward collecting
//! successively shallower peak-to-trough contractions. Finishes with a
//! breakout check against the anchor high.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{PriceBar, PriceSeries};

/// Detector windows and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcpParams {
    /// Below this many bars the detector does not apply.
    pub min_bars: usize,
    /// How many trailing bars the anchor peak search covers.
    pub lookback: usize,
    /// Most recent bars excluded from the anchor peak search.
    pub recent_exclusion: usize,
    /// Prior-peak window is `[peak - prior_window_start, peak - prior_window_end)`.
    pub prior_window_start: usize,
    pub prior_window_end: usize,
    /// Fraction of the anchor range price must recover before a new peak counts.
    pub retracement: f64,
    /// Fraction of the anchor range a close must fall from the running high.
    pub drop_threshold: f64,
}

impl Default for VcpParams {
    fn default() -> Self {
        Self {
            min_bars: 150,
            lookback: 150,
            recent_exclusion: 5,
            prior_window_start: 50,
            prior_window_end: 10,
            retracement: 0.5,
            drop_threshold: 0.10,
        }
    }
}

/// One peak-to-trough pullback. `trough_index > peak_index` always.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contraction {
    pub peak_index: usize,
    pub peak_date: NaiveDate,
    pub peak_price: f64,
    pub trough_index: usize,
    pub trough_date: NaiveDate,
    pub trough_price: f64,
    pub depth_percent: f64,
}

impl Contraction {
    fn new(bars: &[PriceBar], peak_index: usize, trough_index: usize) -> Self {
        let peak_price = bars[peak_index].high;
        let trough_price = bars[trough_index].low;
        Self::with_prices(bars, peak_index, peak_price, trough_index, trough_price)
    }

    fn with_prices(
        bars: &[PriceBar],
        peak_index: usize,
        peak_price: f64,
        trough_index: usize,
        trough_price: f64,
    ) -> Self {
        Self {
            peak_index,
            peak_date: bars[peak_index].date,
            peak_price,
            trough_index,
            trough_date: bars[trough_index].date,
            trough_price,
            depth_percent: depth_percent(peak_price, trough_price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcpResult {
    /// Chronological; depths strictly decreasing. The earlier contraction
    /// before the anchor peak is listed first only when it is deeper than
    /// the anchor; otherwise the list starts at the anchor.
    pub contractions: Vec<Contraction>,
    pub highest_high: f64,
    pub highest_high_index: usize,
    pub lowest_low: f64,
    pub base_length_bars: usize,
    pub base_depth_percent: f64,
    pub breakout_confirmed: bool,
    pub breakout_index: Option<usize>,
    pub current_price: f64,
}

fn depth_percent(peak: f64, trough: f64) -> f64 {
    (peak - trough) / peak * 100.0
}

/// First index of the maximum high in `range`.
fn argmax_high(bars: &[PriceBar], range: std::ops::Range<usize>) -> Option<usize> {
    range.fold(None, |best: Option<usize>, i| match best {
        Some(b) if bars[b].high >= bars[i].high => Some(b),
        _ => Some(i),
    })
}

/// First index of the minimum low in `range`.
fn argmin_low(bars: &[PriceBar], range: std::ops::Range<usize>) -> Option<usize> {
    range.fold(None, |best: Option<usize>, i| match best {
        Some(b) if bars[b].low <= bars[i].low => Some(b),
        _ => Some(i),
    })
}

impl VcpParams {
    /// Run the detector. `None` when the history is too short to apply.
    pub fn analyze(&self, series: &PriceSeries) -> Option<VcpResult> {
        let bars = series.bars();
        let n = bars.len();
        if n < self.min_bars.max(self.lookback) || self.lookback == 0 {
            return None;
        }

        // Anchor peak: first strict maximum over [n - lookback, n - 1 - recent_exclusion].
        let search_start = n - self.lookback;
        let search_end = (n - 1).saturating_sub(self.recent_exclusion);
        let high_bar = argmax_high(bars, search_start..search_end.max(search_start) + 1)?;
        let highest_high = bars[high_bar].high;

        // Anchor trough: strictly after the peak, excluding the latest bar.
        let low_bar = argmin_low(bars, high_bar + 1..n - 1)?;
        let lowest_low = bars[low_bar].low;
        let anchor = Contraction::new(bars, high_bar, low_bar);

        let mut contractions = Vec::new();
        if let Some(prior) = self.prior_contraction(bars, high_bar) {
            if prior.depth_percent > anchor.depth_percent {
                contractions.push(prior);
            }
        }
        contractions.push(anchor);

        self.extend(bars, &mut contractions, highest_high, lowest_low, low_bar);

        let breakout_index = (high_bar + 1..n).find(|&i| bars[i].close >= highest_high);
        let base_length_bars = breakout_index.unwrap_or(n - 1) - high_bar;

        Some(VcpResult {
            contractions,
            highest_high,
            highest_high_index: high_bar,
            lowest_low,
            base_length_bars,
            base_depth_percent: depth_percent(highest_high, lowest_low),
            breakout_confirmed: breakout_index.is_some(),
            breakout_index,
            current_price: bars[n - 1].close,
        })
    }

    /// Highest high in the window before the anchor, then the lowest low
    /// between it and the bar before the anchor.
    fn prior_contraction(&self, bars: &[PriceBar], high_bar: usize) -> Option<Contraction> {
        let start = high_bar.saturating_sub(self.prior_window_start);
        let end = high_bar.checked_sub(self.prior_window_end)?;
        let peak = argmax_high(bars, start..end)?;
        let trough = argmin_low(bars, peak + 1..high_bar.saturating_sub(1))?;
        Some(Contraction::new(bars, peak, trough))
    }

    /// Walk forward from the anchor trough collecting tighter contractions.
    fn extend(
        &self,
        bars: &[PriceBar],
        contractions: &mut Vec<Contraction>,
        highest_high: f64,
        lowest_low: f64,
        low_bar: usize,
    ) {
        let n = bars.len();
        let range = highest_high - lowest_low;
        let retracement_level = lowest_low + self.retracement * range;
        let drop = self.drop_threshold * range;

        let mut previous_depth = depth_percent(highest_high, lowest_low);
        let mut searching = true;
        let mut running_high = 0.0;
        let mut running_high_index = low_bar;
        let mut trigger = f64::NEG_INFINITY;
        let mut current = low_bar + 1;

        while current < n {
            let bar = &bars[current];
            if searching {
                if bar.close >= retracement_level {
                    running_high = bar.close;
                    running_high_index = current;
                    trigger = running_high - drop;
                    searching = false;
                }
            } else {
                if bar.high > running_high {
                    running_high = bar.high;
                    running_high_index = current;
                    trigger = running_high - drop;
                }

                if bar.close <= trigger {
                    let Some(trough) = argmin_low(bars, running_high_index + 1..n) else {
                        break;
                    };
                    let next = Contraction::with_prices(
                        bars,
                        running_high_index,
                        running_high,
                        trough,
                        bars[trough].low,
                    );
                    if next.depth_percent >= previous_depth {
                        break;
                    }
                    previous_depth = next.depth_percent;
                    contractions.push(next);
                    current = trough;
                    searching = true;
                }
            }
            current += 1;
        }
    }
}

/// VCP analysis with default parameters. `None` below 150 bars.
pub fn vcp_analysis(series: &PriceSeries) -> Option<VcpResult> {
    VcpParams::default().analyze(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars};

    /// Piecewise-linear close path; high/low are close +/- 0.5.
    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let data: Vec<_> = closes.iter().map(|&c| (c, c + 0.5, c - 0.5, c)).collect();
        PriceSeries::new(make_ohlc_bars(&data)).unwrap()
    }

    /// 200 bars: prior pullback 60→75, anchor 100→120, then two tighter
    /// pullbacks 135→145 and 160→170, breakout at 195.
    fn vcp_closes() -> Vec<f64> {
        (0..200)
            .map(|i| {
                let x = i as f64;
                match i {
                    0..=60 => 60.0 + 0.5 * x,
                    61..=75 => 90.0 - 1.8 * (x - 60.0),
                    76..=100 => 63.0 + 1.48 * (x - 75.0),
                    101..=120 => 100.0 - (x - 100.0),
                    121..=135 => 80.0 + 16.0 / 15.0 * (x - 120.0),
                    136..=145 => 96.0 - 0.8 * (x - 135.0),
                    146..=160 => 88.0 + 0.5 * (x - 145.0),
                    161..=170 => 95.5 - 0.35 * (x - 160.0),
                    171..=194 => 92.0 + 0.25 * (x - 170.0),
                    _ => 101.0 + 0.5 * (x - 195.0),
                }
            })
            .collect()
    }

    #[test]
    fn short_history_not_applicable() {
        let series = series_from_closes(&vec![100.0; 149]);
        assert!(vcp_analysis(&series).is_none());
    }

    #[test]
    fn detects_tightening_contractions() {
        let result = vcp_analysis(&series_from_closes(&vcp_closes())).unwrap();

        let pivots: Vec<(usize, usize)> = result
            .contractions
            .iter()
            .map(|c| (c.peak_index, c.trough_index))
            .collect();
        assert_eq!(pivots, vec![(60, 75), (100, 120), (135, 145), (160, 170)]);

        for pair in result.contractions.windows(2) {
            assert!(pair[1].depth_percent < pair[0].depth_percent);
        }

        assert_approx(result.highest_high, 100.5, 1e-9);
        assert_eq!(result.highest_high_index, 100);
        assert_eq!(result.lowest_low, 79.5);
        assert_approx(result.base_depth_percent, 21.0 / 100.5 * 100.0, 1e-9);
        assert!(result.breakout_confirmed);
        assert_eq!(result.breakout_index, Some(195));
        assert_eq!(result.base_length_bars, 95);
        assert_eq!(result.current_price, 103.0);
    }

    #[test]
    fn extension_peak_uses_running_high() {
        let result = vcp_analysis(&series_from_closes(&vcp_closes())).unwrap();
        let third = result.contractions[2];
        assert_approx(third.peak_price, 96.5, 1e-9);
        assert_approx(third.trough_price, 87.5, 1e-9);
        assert_approx(third.depth_percent, 9.0 / 96.5 * 100.0, 1e-9);
    }

    #[test]
    fn no_breakout_measures_to_latest_bar() {
        let mut closes = vcp_closes();
        for c in closes.iter_mut().skip(195) {
            *c = 98.0;
        }
        let result = vcp_analysis(&series_from_closes(&closes)).unwrap();
        assert!(!result.breakout_confirmed);
        assert_eq!(result.breakout_index, None);
        assert_eq!(result.base_length_bars, 199 - 100);
    }

    #[test]
    fn shallow_prior_pullback_is_dropped() {
        // Prior pullback 60→75 made shallower than the anchor's 21%.
        let closes: Vec<f64> = vcp_closes()
            .into_iter()
            .enumerate()
            .map(|(i, c)| if (61..=89).contains(&i) { c.max(85.0) } else { c })
            .collect();
        let result = vcp_analysis(&series_from_closes(&closes)).unwrap();
        assert_eq!(result.contractions[0].peak_index, 100);
    }

    #[test]
    fn deeper_pullback_stops_extension() {
        // Third swing tops at 99.75 and falls to 89.25: 10.5% against 9.3%.
        let closes: Vec<f64> = vcp_closes()
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let x = i as f64;
                match i {
                    146..=160 => 88.0 + 0.75 * (x - 145.0),
                    161..=170 => 99.25 - 0.95 * (x - 160.0),
                    _ => c,
                }
            })
            .collect();
        let result = vcp_analysis(&series_from_closes(&closes)).unwrap();
        let peaks: Vec<usize> = result.contractions.iter().map(|c| c.peak_index).collect();
        assert_eq!(peaks, vec![60, 100, 135]);
        assert_eq!(result.contractions[2].trough_index, 145);
    }
}
