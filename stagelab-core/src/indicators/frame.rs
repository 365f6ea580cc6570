//! IndicatorFrame: a price series plus its derived indicator columns.
//!
//! Columns are computed once, up front, by `compute_indicators`. Warm-up
//! positions hold NaN internally and are surfaced as `None` through
//! `IndicatorFrame::value`; they are never zero-filled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{PriceBar, PriceSeries};
use crate::indicators::provider::{IndicatorProvider, WilderProvider};
use crate::indicators::stoch_rsi::stoch_rsi;
use crate::indicators::volatility::volatility;

/// Named derived column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Ma5,
    Ma13,
    Ma50,
    Ma150,
    Ma200,
    Macd,
    MacdSignal,
    MacdHist,
    Rsi,
    StochRsi,
    StochK,
    StochD,
    PlusDi,
    MinusDi,
    Volatility,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Ma5,
        Column::Ma13,
        Column::Ma50,
        Column::Ma150,
        Column::Ma200,
        Column::Macd,
        Column::MacdSignal,
        Column::MacdHist,
        Column::Rsi,
        Column::StochRsi,
        Column::StochK,
        Column::StochD,
        Column::PlusDi,
        Column::MinusDi,
        Column::Volatility,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Ma5 => "ma5",
            Column::Ma13 => "ma13",
            Column::Ma50 => "ma50",
            Column::Ma150 => "ma150",
            Column::Ma200 => "ma200",
            Column::Macd => "macd",
            Column::MacdSignal => "macd_signal",
            Column::MacdHist => "macd_hist",
            Column::Rsi => "rsi",
            Column::StochRsi => "stoch_rsi",
            Column::StochK => "stoch_k",
            Column::StochD => "stoch_d",
            Column::PlusDi => "plus_di",
            Column::MinusDi => "minus_di",
            Column::Volatility => "volatility",
        }
    }

    /// Window of a moving-average column.
    pub fn ma_window(self) -> Option<usize> {
        match self {
            Column::Ma5 => Some(5),
            Column::Ma13 => Some(13),
            Column::Ma50 => Some(50),
            Column::Ma150 => Some(150),
            Column::Ma200 => Some(200),
            _ => None,
        }
    }
}

/// Windows for the non-MA columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub stoch_smooth_k: usize,
    pub stoch_smooth_d: usize,
    pub dmi_period: usize,
    pub volatility_median: usize,
    pub volatility_smooth: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            macd_fast: 8,
            macd_slow: 13,
            macd_signal: 5,
            rsi_period: 13,
            stoch_period: 21,
            stoch_smooth_k: 3,
            stoch_smooth_d: 5,
            dmi_period: 5,
            volatility_median: 10,
            volatility_smooth: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    series: PriceSeries,
    provider: &'static str,
    columns: BTreeMap<Column, Vec<f64>>,
}

impl IndicatorFrame {
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn bars(&self) -> &[PriceBar] {
        self.series.bars()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Name of the provider that produced the columns.
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }

    /// Full column, NaN at warm-up positions.
    pub fn column(&self, column: Column) -> &[f64] {
        self.columns
            .get(&column)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Value at `index`, or `None` during warm-up / out of range.
    pub fn value(&self, column: Column, index: usize) -> Option<f64> {
        self.column(column)
            .get(index)
            .copied()
            .filter(|v| !v.is_nan())
    }

    /// Latest value of a column.
    pub fn last(&self, column: Column) -> Option<f64> {
        self.value(column, self.len() - 1)
    }

    /// Frame restricted to bars `0..=end`.
    ///
    /// Every column is causal, so this is identical to recomputing the
    /// frame on the truncated series.
    pub fn truncated(&self, end: usize) -> Option<IndicatorFrame> {
        let series = self.series.truncated(end)?;
        let columns = self
            .columns
            .iter()
            .map(|(&col, values)| (col, values[..=end].to_vec()))
            .collect();
        Some(IndicatorFrame {
            series,
            provider: self.provider,
            columns,
        })
    }
}

impl PartialEq for IndicatorFrame {
    /// Bitwise column comparison, so matching NaN warm-ups compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.series == other.series
            && self.provider == other.provider
            && self.columns.len() == other.columns.len()
            && self.columns.iter().all(|(col, values)| {
                other.columns.get(col).is_some_and(|o| {
                    o.len() == values.len()
                        && o.iter().zip(values).all(|(a, b)| a.to_bits() == b.to_bits())
                })
            })
    }
}

/// Compute all columns with the native provider and default windows.
pub fn compute_indicators(series: &PriceSeries) -> IndicatorFrame {
    compute_indicators_with(series, &WilderProvider, &IndicatorConfig::default())
}

pub fn compute_indicators_with(
    series: &PriceSeries,
    provider: &dyn IndicatorProvider,
    config: &IndicatorConfig,
) -> IndicatorFrame {
    let closes = series.closes();
    let mut columns = BTreeMap::new();

    for col in Column::ALL {
        if let Some(window) = col.ma_window() {
            columns.insert(col, provider.sma(&closes, window));
        }
    }

    let macd = provider.macd(
        &closes,
        config.macd_fast,
        config.macd_slow,
        config.macd_signal,
    );
    columns.insert(Column::Macd, macd.line);
    columns.insert(Column::MacdSignal, macd.signal);
    columns.insert(Column::MacdHist, macd.histogram);

    let rsi = provider.rsi(&closes, config.rsi_period);
    let stoch = stoch_rsi(
        &rsi,
        config.stoch_period,
        config.stoch_smooth_k,
        config.stoch_smooth_d,
    );
    columns.insert(Column::Rsi, rsi);
    columns.insert(Column::StochRsi, stoch.raw);
    columns.insert(Column::StochK, stoch.k);
    columns.insert(Column::StochD, stoch.d);

    let di = provider.directional_index(series.bars(), config.dmi_period);
    columns.insert(Column::PlusDi, di.plus);
    columns.insert(Column::MinusDi, di.minus);

    columns.insert(
        Column::Volatility,
        volatility(&closes, config.volatility_median, config.volatility_smooth),
    );

    IndicatorFrame {
        series: series.clone(),
        provider: provider.name(),
        columns,
    }
}
