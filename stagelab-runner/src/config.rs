//! Serializable scan configuration.
//!
//! Every section is optional; anything left out takes the engine defaults.
//!
//! ```toml
//! [scan]
//! price_dir = "stockdata/prices"
//! fundamentals_dir = "stockdata/earnings"
//! provider = "reference"
//! limit = 20
//!
//! [screen]
//! rsi_ceiling = 75.0
//!
//! [backtest]
//! check_interval = 5
//! ```

use serde::{Deserialize, Serialize};
use stagelab_core::indicators::{IndicatorConfig, ProviderKind};
use stagelab_core::{FundamentalParams, TrendTemplate, VcpParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::metrics::BacktestParams;

/// Errors from reading or checking a scan configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where the data lives and what the batch scan computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Directory of `<SYMBOL>.csv` price files.
    pub price_dir: PathBuf,
    /// Directory of `<SYMBOL>/financials.csv` and `<SYMBOL>/surprises.csv`.
    pub fundamentals_dir: Option<PathBuf>,
    pub provider: ProviderKind,
    /// Scan at most this many symbols (in name order).
    pub limit: Option<usize>,
    /// Attach a backtest summary to every report.
    pub backtest: bool,
    /// Attach a VCP analysis to every report.
    pub vcp: bool,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            price_dir: PathBuf::from("stockdata"),
            fundamentals_dir: None,
            provider: ProviderKind::default(),
            limit: None,
            backtest: true,
            vcp: true,
        }
    }
}

/// Full scan configuration: data locations plus every engine parameter set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan: ScanSection,
    pub indicators: IndicatorConfig,
    pub screen: TrendTemplate,
    pub fundamentals: FundamentalParams,
    pub vcp: VcpParams,
    pub backtest: BacktestParams,
}

impl ScanConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject parameter values the engine cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("indicators.macd_fast", self.indicators.macd_fast),
            ("indicators.macd_slow", self.indicators.macd_slow),
            ("indicators.macd_signal", self.indicators.macd_signal),
            ("indicators.rsi_period", self.indicators.rsi_period),
            ("indicators.stoch_period", self.indicators.stoch_period),
            ("indicators.stoch_smooth_k", self.indicators.stoch_smooth_k),
            ("indicators.stoch_smooth_d", self.indicators.stoch_smooth_d),
            ("indicators.dmi_period", self.indicators.dmi_period),
            ("indicators.volatility_median", self.indicators.volatility_median),
            ("indicators.volatility_smooth", self.indicators.volatility_smooth),
            ("screen.week52_window", self.screen.week52_window),
            ("vcp.lookback", self.vcp.lookback),
            ("backtest.check_interval", self.backtest.check_interval),
            ("backtest.summary_window", self.backtest.summary_window),
        ];
        for (field, value) in windows {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1".into(),
                });
            }
        }

        if self.indicators.macd_fast >= self.indicators.macd_slow {
            return Err(ConfigError::Invalid {
                field: "indicators.macd_fast",
                reason: format!(
                    "{} must be below macd_slow ({})",
                    self.indicators.macd_fast, self.indicators.macd_slow
                ),
            });
        }

        if self.vcp.recent_exclusion >= self.vcp.lookback {
            return Err(ConfigError::Invalid {
                field: "vcp.recent_exclusion",
                reason: format!("must be below vcp.lookback ({})", self.vcp.lookback),
            });
        }

        if self.vcp.prior_window_end > self.vcp.prior_window_start {
            return Err(ConfigError::Invalid {
                field: "vcp.prior_window_end",
                reason: format!(
                    "must not exceed vcp.prior_window_start ({})",
                    self.vcp.prior_window_start
                ),
            });
        }

        let fractions = [
            ("vcp.retracement", self.vcp.retracement),
            ("vcp.drop_threshold", self.vcp.drop_threshold),
            ("backtest.allocation", self.backtest.allocation),
        ];
        for (field, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside (0, 1]"),
                });
            }
        }

        if !(self.backtest.starting_capital > 0.0) {
            return Err(ConfigError::Invalid {
                field: "backtest.starting_capital",
                reason: "must be positive".into(),
            });
        }

        Ok(())
    }
}
