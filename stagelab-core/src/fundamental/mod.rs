//! Fundamental scorer.
//!
//! Turns quarterly EPS, revenue and net-margin series plus an
//! earnings-surprise series into a bounded composite quality score:
//!
//! total = eps * 52 + npm * 21 + sales * 21 + surprise * 6
//!
//! Each component score lies in [0, 1], so the total lies in [0, 100].

pub mod direction;
pub mod surprise;

use serde::{Deserialize, Serialize};

use crate::domain::{
    validate_financials, validate_surprises, EarningsSurprise, FinancialError, QuarterlyFinancial,
};

pub use direction::continuous_direction;
pub use surprise::eps_surprise_score;

/// Weights, decays and minimum history for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalParams {
    pub eps_weight: f64,
    pub npm_weight: f64,
    pub sales_weight: f64,
    pub surprise_weight: f64,
    /// Decay for `continuous_direction` (EPS, NPM, sales).
    pub direction_decay: f64,
    pub eps_weigher: f64,
    pub npm_weigher: f64,
    pub sales_weigher: f64,
    pub surprise_decay: f64,
    pub min_quarters: usize,
    pub min_surprises: usize,
}

impl Default for FundamentalParams {
    fn default() -> Self {
        Self {
            eps_weight: 52.0,
            npm_weight: 21.0,
            sales_weight: 21.0,
            surprise_weight: 6.0,
            direction_decay: 0.8,
            eps_weigher: 5.0,
            npm_weigher: 5.0,
            sales_weigher: 10.0,
            surprise_decay: 0.5,
            min_quarters: 4,
            min_surprises: 3,
        }
    }
}

/// Component scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub eps: f64,
    pub npm: f64,
    pub sales: f64,
    pub surprise: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: f64,
    pub components: ScoreComponents,
}

/// Fill interior gaps with the mean of their neighbours.
///
/// Runs left to right, so a gap may use the value just filled before it.
/// A gap next to another gap (or at either end) stays missing.
pub fn interpolate_gaps(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut filled = series.to_vec();
    for i in 1..filled.len().saturating_sub(1) {
        if filled[i].is_none() {
            filled[i] = match (filled[i - 1], filled[i + 1]) {
                (Some(prev), Some(next)) => Some((prev + next) / 2.0),
                _ => None,
            };
        }
    }
    filled
}

/// Net profit margin per quarter; zero revenue is treated as 1.
pub fn net_profit_margin(net_income: &[Option<f64>], revenue: &[Option<f64>]) -> Vec<Option<f64>> {
    net_income
        .iter()
        .zip(revenue)
        .map(|(ni, rev)| match (ni, rev) {
            (Some(ni), Some(rev)) => {
                let denom = if *rev == 0.0 { 1.0 } else { *rev };
                Some(ni / denom)
            }
            _ => None,
        })
        .collect()
}

impl FundamentalParams {
    /// Score validated records. `None` when history is too short.
    pub fn score(
        &self,
        financials: &[QuarterlyFinancial],
        surprises: &[EarningsSurprise],
    ) -> Result<Option<ScoreResult>, FinancialError> {
        validate_financials(financials)?;
        validate_surprises(surprises)?;

        if financials.len() < self.min_quarters || surprises.len() < self.min_surprises {
            return Ok(None);
        }

        let column = |f: fn(&QuarterlyFinancial) -> Option<f64>| -> Vec<Option<f64>> {
            interpolate_gaps(&financials.iter().map(f).collect::<Vec<_>>())
        };
        let net_income = column(|q| q.net_income);
        let sales = column(|q| q.revenue);
        let eps = column(|q| q.eps);
        let npm = net_profit_margin(&net_income, &sales);
        let surprise_series = interpolate_gaps(
            &surprises
                .iter()
                .map(|s| s.surprise_percent)
                .collect::<Vec<_>>(),
        );

        let components = ScoreComponents {
            eps: continuous_direction(&eps, self.direction_decay, self.eps_weigher),
            npm: continuous_direction(&npm, self.direction_decay, self.npm_weigher),
            sales: continuous_direction(&sales, self.direction_decay, self.sales_weigher),
            surprise: eps_surprise_score(&surprise_series, self.surprise_decay),
        };

        let total_score = components.eps * self.eps_weight
            + components.npm * self.npm_weight
            + components.sales * self.sales_weight
            + components.surprise * self.surprise_weight;

        Ok(Some(ScoreResult {
            total_score,
            components,
        }))
    }
}

/// Composite fundamental score with default weights.
///
/// `Ok(None)` means "no signal" (fewer than 4 quarters or 3 surprises);
/// `Err` means the records themselves are malformed.
pub fn fundamental_screen(
    financials: &[QuarterlyFinancial],
    surprises: &[EarningsSurprise],
) -> Result<Option<ScoreResult>, FinancialError> {
    FundamentalParams::default().score(financials, surprises)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quarter_end(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 3, 31).unwrap() + chrono::Duration::days(91 * i as i64)
    }

    fn financials(revenue: &[f64], net_income: &[f64], eps: &[f64]) -> Vec<QuarterlyFinancial> {
        (0..revenue.len())
            .map(|i| QuarterlyFinancial {
                date: quarter_end(i),
                revenue: Some(revenue[i]),
                net_income: Some(net_income[i]),
                eps: Some(eps[i]),
            })
            .collect()
    }

    fn surprises(values: &[f64]) -> Vec<EarningsSurprise> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EarningsSurprise {
                date: quarter_end(i) + chrono::Duration::days(30),
                eps_estimate: None,
                eps_actual: None,
                surprise_percent: Some(v),
            })
            .collect()
    }

    #[test]
    fn growing_company_scores_well() {
        let result = fundamental_screen(
            &financials(
                &[100.0, 110.0, 120.0, 130.0],
                &[10.0, 11.0, 12.0, 13.0],
                &[1.0, 1.1, 1.2, 1.3],
            ),
            &surprises(&[0.1, 0.1, 0.1, 0.1]),
        )
        .unwrap()
        .unwrap();

        assert!(result.total_score > 0.0);
        assert!(result.components.eps > 0.5);
        assert!(result.components.sales > 0.5);
        assert!(result.components.surprise > 0.5);
        // Margin is a constant 10%, which is neutral.
        assert!((result.components.npm - 0.5).abs() < 1e-9);
        assert!(result.total_score <= 100.0);
    }

    #[test]
    fn undefined_surprises_contribute_nothing() {
        let mut surp = surprises(&[0.0; 3]);
        for s in &mut surp {
            s.surprise_percent = None;
        }
        let result = fundamental_screen(
            &financials(
                &[100.0, 110.0, 120.0, 130.0],
                &[10.0, 11.0, 12.0, 13.0],
                &[1.0, 1.1, 1.2, 1.3],
            ),
            &surp,
        )
        .unwrap()
        .unwrap();

        assert_eq!(result.components.surprise, 0.0);
        let c = result.components;
        let expected = c.eps * 52.0 + c.npm * 21.0 + c.sales * 21.0;
        assert!((result.total_score - expected).abs() < 1e-12);
    }

    #[test]
    fn total_is_weighted_sum() {
        let result = fundamental_screen(
            &financials(
                &[100.0, 90.0, 120.0, 125.0, 140.0],
                &[5.0, 4.0, 9.0, 11.0, 15.0],
                &[0.5, 0.4, 0.9, 1.1, 1.5],
            ),
            &surprises(&[0.05, -0.02, 0.08]),
        )
        .unwrap()
        .unwrap();
        let c = result.components;
        let expected = c.eps * 52.0 + c.npm * 21.0 + c.sales * 21.0 + c.surprise * 6.0;
        assert!((result.total_score - expected).abs() < 1e-12);
    }

    #[test]
    fn short_history_is_no_signal() {
        let fin = financials(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]);
        assert_eq!(fundamental_screen(&fin, &surprises(&[0.1; 4])), Ok(None));

        let fin = financials(&[1.0; 4], &[1.0; 4], &[1.0; 4]);
        assert_eq!(fundamental_screen(&fin, &surprises(&[0.1, 0.1])), Ok(None));
    }

    #[test]
    fn malformed_dates_are_errors() {
        let mut fin = financials(&[1.0; 4], &[1.0; 4], &[1.0; 4]);
        fin.swap(1, 2);
        assert!(fundamental_screen(&fin, &surprises(&[0.1; 4])).is_err());
    }

    #[test]
    fn interior_gaps_are_averaged() {
        let filled = interpolate_gaps(&[Some(1.0), None, Some(3.0), None]);
        assert_eq!(filled, vec![Some(1.0), Some(2.0), Some(3.0), None]);
    }

    #[test]
    fn edge_and_adjacent_gaps_stay_missing() {
        let filled = interpolate_gaps(&[None, Some(2.0), None, None, Some(8.0)]);
        assert_eq!(filled[0], None);
        assert_eq!(filled[2], None);
        assert_eq!(filled[3], None);
    }

    #[test]
    fn zero_revenue_does_not_divide_by_zero() {
        let npm = net_profit_margin(&[Some(5.0), Some(2.0)], &[Some(0.0), Some(4.0)]);
        assert_eq!(npm, vec![Some(5.0), Some(0.5)]);
    }

    #[test]
    fn missing_quarter_is_interpolated_not_dropped() {
        let mut fin = financials(
            &[100.0, 110.0, 120.0, 130.0],
            &[10.0, 11.0, 12.0, 13.0],
            &[1.0, 1.1, 1.2, 1.3],
        );
        fin[2].eps = None;
        let gappy = fundamental_screen(&fin, &surprises(&[0.1; 4])).unwrap().unwrap();
        fin[2].eps = Some(1.2);
        let dense = fundamental_screen(&fin, &surprises(&[0.1; 4])).unwrap().unwrap();
        assert!((gappy.components.eps - dense.components.eps).abs() < 1e-9);
    }
}
