//! Quarterly financial statements and earnings-surprise records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One fiscal quarter. Missing values are `None`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyFinancial {
    pub date: NaiveDate,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub eps: Option<f64>,
}

/// One earnings report and how it compared with the consensus estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarningsSurprise {
    pub date: NaiveDate,
    pub eps_estimate: Option<f64>,
    pub eps_actual: Option<f64>,
    pub surprise_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FinancialError {
    #[error("{kind} record {index}: date {date} does not follow {previous}")]
    NotAscending {
        kind: &'static str,
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("{kind} record {index}: {field} is not finite")]
    NonFinite {
        kind: &'static str,
        index: usize,
        field: &'static str,
    },
}

fn check_value(
    kind: &'static str,
    index: usize,
    field: &'static str,
    value: Option<f64>,
) -> Result<(), FinancialError> {
    match value {
        Some(v) if !v.is_finite() => Err(FinancialError::NonFinite { kind, index, field }),
        _ => Ok(()),
    }
}

fn check_order(
    kind: &'static str,
    dates: impl Iterator<Item = NaiveDate>,
) -> Result<(), FinancialError> {
    let mut previous: Option<NaiveDate> = None;
    for (index, date) in dates.enumerate() {
        if let Some(prev) = previous {
            if date <= prev {
                return Err(FinancialError::NotAscending {
                    kind,
                    index,
                    previous: prev,
                    date,
                });
            }
        }
        previous = Some(date);
    }
    Ok(())
}

/// Dates strictly ascending, present values finite.
pub fn validate_financials(records: &[QuarterlyFinancial]) -> Result<(), FinancialError> {
    const KIND: &str = "financial";
    check_order(KIND, records.iter().map(|r| r.date))?;
    for (i, r) in records.iter().enumerate() {
        check_value(KIND, i, "revenue", r.revenue)?;
        check_value(KIND, i, "net_income", r.net_income)?;
        check_value(KIND, i, "eps", r.eps)?;
    }
    Ok(())
}

/// Dates strictly ascending, present values finite.
pub fn validate_surprises(records: &[EarningsSurprise]) -> Result<(), FinancialError> {
    const KIND: &str = "surprise";
    check_order(KIND, records.iter().map(|r| r.date))?;
    for (i, r) in records.iter().enumerate() {
        check_value(KIND, i, "eps_estimate", r.eps_estimate)?;
        check_value(KIND, i, "eps_actual", r.eps_actual)?;
        check_value(KIND, i, "surprise_percent", r.surprise_percent)?;
    }
    Ok(())
}
