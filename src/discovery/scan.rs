//! Universe scan: test every pair of a symbol list

use super::selector::PairSelector;
use crate::data::{DateRange, SeriesProvider};
use crate::types::TimeSeries;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A pair that passed the cointegration filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    /// Independent leg (x)
    pub symbol_x: String,
    /// Dependent leg (y)
    pub symbol_y: String,
    pub p_value: f64,
    pub hedge_ratio: f64,
}

/// Fetch every symbol and evaluate each unordered pair once.
///
/// Symbols the provider cannot serve are skipped. Results are sorted by
/// p-value, most significant first.
pub fn scan_pairs<P: SeriesProvider + ?Sized>(
    selector: &PairSelector,
    provider: &P,
    symbols: &[String],
    range: &DateRange,
) -> Vec<CandidatePair> {
    let mut series: Vec<TimeSeries> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match provider.fetch_series(symbol, range) {
            Ok(Some(s)) => series.push(s),
            Ok(None) => warn!(symbol = %symbol, "No data, skipping symbol"),
            Err(e) => warn!(symbol = %symbol, error = %e, "Failed to load series, skipping symbol"),
        }
    }

    info!(
        candidates = series.len(),
        threshold = selector.config().pvalue_threshold,
        "Scanning pair candidates"
    );

    let mut results = Vec::new();
    for i in 0..series.len() {
        for j in (i + 1)..series.len() {
            let (x, y) = (&series[i], &series[j]);
            if let Some(result) = selector.evaluate(x, y) {
                results.push(CandidatePair {
                    symbol_x: x.name().to_string(),
                    symbol_y: y.name().to_string(),
                    p_value: result.p_value,
                    hedge_ratio: result.hedge_ratio,
                });
            }
        }
    }

    results.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));

    info!(viable_pairs = results.len(), "Scan complete");
    results
}
