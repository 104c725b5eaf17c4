//! `discover` command handler.

use super::{cache_for, write_json};
use crate::config::PairsConfig;
use crate::discovery::{scan_pairs, PairSelector};
use std::error::Error;
use std::path::Path;
use tracing::{info, warn};

/// Scan every pair of `symbols_arg` (comma-separated) and output the accepted ones.
///
/// # Errors
/// Returns error if fewer than two symbols are given or the output cannot be written.
pub fn run_discover(
    config: &PairsConfig,
    symbols_arg: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let symbols: Vec<String> = symbols_arg
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.len() < 2 {
        return Err("need at least 2 symbols to form pairs".into());
    }

    info!(
        candidates = symbols.len(),
        data_dir = %config.data_dir.display(),
        "--- pairpioneer: pair discovery ---"
    );

    let selector = PairSelector::new(config.selector_config())?;
    let range = config.date_range()?;
    let pairs = scan_pairs(&selector, &cache_for(config), &symbols, &range);

    if pairs.is_empty() {
        warn!("No cointegrated pairs found");
    }
    write_json(&pairs, output)
}
