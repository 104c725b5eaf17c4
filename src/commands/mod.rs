//! CLI command handlers.
//!
//! Each handler takes a validated [`PairsConfig`] and writes its result as
//! pretty JSON to stdout or a file.

mod discover;
mod evaluate;
mod signals;

pub use discover::run_discover;
pub use evaluate::run_evaluate;
pub use signals::run_signals;

use crate::config::PairsConfig;
use crate::data::{CsvSeriesCache, SeriesProvider};
use crate::types::TimeSeries;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tracing::info;

fn load_series(
    provider: &dyn SeriesProvider,
    config: &PairsConfig,
    symbol: &str,
) -> Result<TimeSeries, Box<dyn Error>> {
    let range = config.date_range()?;
    provider
        .fetch_series(symbol, &range)?
        .ok_or_else(|| {
            format!(
                "no data for {} in [{}, {}) under {}",
                symbol,
                range.start,
                range.end,
                config.data_dir.display()
            )
            .into()
        })
}

fn cache_for(config: &PairsConfig) -> CsvSeriesCache {
    CsvSeriesCache::new(&config.data_dir)
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            info!(path = %path.display(), "Results written");
        }
        None => println!("{}", json),
    }
    Ok(())
}
