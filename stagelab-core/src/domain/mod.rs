//! Domain types for StageLab

pub mod bar;
pub mod financial;
pub mod trade;

pub use bar::{BarError, PriceBar, PriceSeries};
pub use financial::{
    validate_financials, validate_surprises, EarningsSurprise, FinancialError, QuarterlyFinancial,
};
pub use trade::Trade;
