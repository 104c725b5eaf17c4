//! CLI flag groups bridging arguments to [`PairsConfig`].
//!
//! Every analysis flag is optional; only the flags actually given override
//! the loaded configuration.

use crate::config::{ConfigError, PairsConfig};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Overrides shared by every analysis command
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Directory holding `{symbol}.csv` files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// First day of history, YYYY-MM-DD (inclusive)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day of history, YYYY-MM-DD (exclusive)
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Accept pairs with a cointegration p-value below this
    #[arg(long)]
    pub pvalue_threshold: Option<f64>,
    /// Warn when fewer aligned points than this
    #[arg(long)]
    pub min_samples: Option<usize>,
    /// Rolling z-score window
    #[arg(long)]
    pub lookback: Option<usize>,
    /// Z-score magnitude that opens a position
    #[arg(long)]
    pub entry_zscore: Option<f64>,
    /// Z-score magnitude that closes a position
    #[arg(long)]
    pub exit_zscore: Option<f64>,
}

impl AnalysisArgs {
    /// Overlay the given flags on `base` and validate the result.
    pub fn apply(&self, base: PairsConfig) -> Result<PairsConfig, ConfigError> {
        let config = PairsConfig {
            data_dir: self.data_dir.clone().unwrap_or(base.data_dir),
            start: self.start.unwrap_or(base.start),
            end: self.end.unwrap_or(base.end),
            pvalue_threshold: self.pvalue_threshold.unwrap_or(base.pvalue_threshold),
            min_samples: self.min_samples.unwrap_or(base.min_samples),
            lookback: self.lookback.unwrap_or(base.lookback),
            entry_zscore: self.entry_zscore.unwrap_or(base.entry_zscore),
            exit_zscore: self.exit_zscore.unwrap_or(base.exit_zscore),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Paper-trading options for the `signals` command
#[derive(Args, Debug, Clone)]
pub struct PaperArgs {
    /// Route signals through the paper executor
    #[arg(long, default_value_t = false)]
    pub paper: bool,
    /// Units of x per entry
    #[arg(long, default_value = "1")]
    pub quantity_x: Decimal,
    /// Units of y per entry
    #[arg(long, default_value = "1")]
    pub quantity_y: Decimal,
    /// CSV journal for paper trades
    #[arg(long, default_value = "paper_trades.csv")]
    pub trades_csv: PathBuf,
}
