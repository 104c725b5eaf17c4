//! Run configuration
//!
//! Every field has a default, so a JSON file only needs the keys it changes.
//! Precedence, lowest first: defaults, config file, `PAIRPIONEER_DATA_DIR`,
//! command-line flags.

use crate::data::{default_end, default_start, DateRange};
use crate::discovery::config::{default_min_samples, default_pvalue_threshold};
use crate::discovery::SelectorConfig;
use crate::strategy::pairs::{default_entry_zscore, default_exit_zscore, default_lookback};
use crate::strategy::PairStrategyConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DATA_DIR_ENV: &str = "PAIRPIONEER_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairsConfig {
    /// Directory holding `{symbol}.csv` series
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// First day of history (inclusive)
    #[serde(default = "default_start")]
    pub start: NaiveDate,

    /// Last day of history (exclusive)
    #[serde(default = "default_end")]
    pub end: NaiveDate,

    #[serde(default = "default_pvalue_threshold")]
    pub pvalue_threshold: f64,

    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    #[serde(default = "default_lookback")]
    pub lookback: usize,

    #[serde(default = "default_entry_zscore")]
    pub entry_zscore: f64,

    #[serde(default = "default_exit_zscore")]
    pub exit_zscore: f64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for PairsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            start: default_start(),
            end: default_end(),
            pvalue_threshold: default_pvalue_threshold(),
            min_samples: default_min_samples(),
            lookback: default_lookback(),
            entry_zscore: default_entry_zscore(),
            exit_zscore: default_exit_zscore(),
        }
    }
}

impl PairsConfig {
    /// Load from a JSON file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply the data-directory environment override.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        self
    }

    pub fn selector_config(&self) -> SelectorConfig {
        SelectorConfig {
            pvalue_threshold: self.pvalue_threshold,
            min_samples: self.min_samples,
        }
    }

    pub fn strategy_config(&self) -> PairStrategyConfig {
        PairStrategyConfig {
            lookback: self.lookback,
            entry_zscore: self.entry_zscore,
            exit_zscore: self.exit_zscore,
        }
    }

    pub fn date_range(&self) -> Result<DateRange, ConfigError> {
        DateRange::new(self.start, self.end).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Check every section before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.date_range()?;
        self.selector_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.strategy_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}
