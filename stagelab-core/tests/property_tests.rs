//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Score bounds: direction and surprise scores in [0, 1], composite in [0, 100]
//! 2. VCP contractions are strictly depth-decreasing with troughs after peaks
//! 3. Indicator computation is idempotent
//! 4. A strictly rising history orders the moving averages
//! 5. Transition markers alternate

use chrono::NaiveDate;
use proptest::prelude::*;
use stagelab_core::backtest::{transitions, ScreenPoint};
use stagelab_core::domain::{EarningsSurprise, PriceBar, PriceSeries, QuarterlyFinancial};
use stagelab_core::fundamental::{continuous_direction, eps_surprise_score};
use stagelab_core::{compute_indicators, fundamental_screen, vcp_analysis, TrendTemplate};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_optional_series() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.85, -1.0e6..1.0e6_f64), 0..16)
}

fn date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 2).unwrap() + chrono::Duration::days(i as i64)
}

fn bars_from_closes(closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: date(i),
                open,
                high: open.max(close) + 0.5,
                low: (open.min(close) - 0.5).max(0.01),
                close,
                volume: 1000.0,
            }
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

fn walk(start: f64, deltas: &[f64]) -> Vec<f64> {
    let mut price = start;
    deltas
        .iter()
        .map(|d| {
            price = (price + d).max(5.0);
            price
        })
        .collect()
}

// ── 1. Score bounds ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn direction_score_bounded(
        series in arb_optional_series(),
        decay in 0.1..1.0_f64,
        weigher in 0.1..20.0_f64,
    ) {
        let score = continuous_direction(&series, decay, weigher);
        prop_assert!((0.0..=1.0).contains(&score), "score {}", score);
    }

    #[test]
    fn surprise_score_bounded(series in arb_optional_series(), decay in 0.1..1.0_f64) {
        let score = eps_surprise_score(&series, decay);
        prop_assert!((0.0..=1.0).contains(&score), "score {}", score);
    }

    #[test]
    fn composite_score_bounded(
        revenue in prop::collection::vec(0.0..1.0e9_f64, 4..12),
        margin in prop::collection::vec(-0.5..0.5_f64, 12),
        eps in prop::collection::vec(-5.0..5.0_f64, 12),
        surprises in prop::collection::vec(-1.0..1.0_f64, 3..8),
    ) {
        let financials: Vec<QuarterlyFinancial> = revenue
            .iter()
            .enumerate()
            .map(|(i, &r)| QuarterlyFinancial {
                date: date(i * 91),
                revenue: Some(r),
                net_income: Some(r * margin[i]),
                eps: Some(eps[i]),
            })
            .collect();
        let surprise_records: Vec<EarningsSurprise> = surprises
            .iter()
            .enumerate()
            .map(|(i, &s)| EarningsSurprise {
                date: date(i * 91 + 30),
                eps_estimate: None,
                eps_actual: None,
                surprise_percent: Some(s),
            })
            .collect();

        let result = fundamental_screen(&financials, &surprise_records).unwrap().unwrap();
        prop_assert!(result.total_score >= 0.0 && result.total_score <= 100.0);
        for c in [
            result.components.eps,
            result.components.npm,
            result.components.sales,
            result.components.surprise,
        ] {
            prop_assert!((0.0..=1.0).contains(&c));
        }
    }
}

// ── 2. VCP monotonicity ──────────────────────────────────────────────

proptest! {
    #[test]
    fn vcp_contractions_strictly_tighten(
        deltas in prop::collection::vec(-3.0..3.0_f64, 150..320),
    ) {
        let series = bars_from_closes(&walk(100.0, &deltas));
        let result = vcp_analysis(&series);
        prop_assert!(result.is_some());
        let result = result.unwrap();

        for c in &result.contractions {
            prop_assert!(c.trough_index > c.peak_index);
        }
        for pair in result.contractions.windows(2) {
            prop_assert!(pair[1].depth_percent < pair[0].depth_percent);
            prop_assert!(pair[1].peak_index > pair[0].peak_index);
        }
        if let Some(b) = result.breakout_index {
            prop_assert_eq!(result.base_length_bars, b - result.highest_high_index);
        }
    }
}

// ── 3. Idempotence ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn indicators_idempotent(deltas in prop::collection::vec(-2.0..2.0_f64, 1..260)) {
        let series = bars_from_closes(&walk(50.0, &deltas));
        prop_assert_eq!(compute_indicators(&series), compute_indicators(&series));
    }

    // ── 4. Rising history orders the averages ───────────────────────

    #[test]
    fn rising_history_orders_moving_averages(
        steps in prop::collection::vec(0.01..2.0_f64, 260..320),
    ) {
        let frame = compute_indicators(&bars_from_closes(&walk(20.0, &steps)));
        let check = TrendTemplate::default().evaluate(&frame, frame.len() - 1).unwrap();
        prop_assert!(check.ma_ordered);
        prop_assert!(check.ma200_rising);
    }
}

// ── 5. Transition markers alternate ─────────────────────────────────

proptest! {
    #[test]
    fn transitions_alternate(values in prop::collection::vec(any::<bool>(), 0..60)) {
        let series: Vec<ScreenPoint> = values
            .iter()
            .enumerate()
            .map(|(i, &passed)| ScreenPoint { date: date(i), passed })
            .collect();
        let markers = transitions(&series);

        if let Some(first) = markers.first() {
            prop_assert!(first.passed);
        }
        for pair in markers.windows(2) {
            prop_assert_ne!(pair[0].passed, pair[1].passed);
            prop_assert!(pair[0].date < pair[1].date);
        }
    }
}
