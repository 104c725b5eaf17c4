//! `evaluate` command handler.

use super::{cache_for, load_series, write_json};
use crate::config::PairsConfig;
use crate::discovery::PairSelector;
use crate::error::AnalysisError;
use crate::types::TimeSeries;
use serde::Serialize;
use std::error::Error;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct EvaluationReport {
    symbol_x: String,
    symbol_y: String,
    /// Absent when the data was too thin to test
    statistic: Option<f64>,
    p_value: Option<f64>,
    accepted: bool,
    /// Only reported for accepted pairs
    hedge_ratio: Option<f64>,
    nobs: Option<usize>,
}

/// Test one pair and print the outcome.
///
/// # Errors
/// Returns error if either series is unavailable.
pub fn run_evaluate(config: &PairsConfig, x: &str, y: &str) -> Result<(), Box<dyn Error>> {
    info!(x = %x, y = %y, "--- pairpioneer: evaluate ---");
    let cache = cache_for(config);
    let series_x = load_series(&cache, config, x)?;
    let series_y = load_series(&cache, config, y)?;

    let selector = PairSelector::new(config.selector_config())?;
    let report = evaluate_pair(&selector, &series_x, &series_y)?;
    write_json(&report, None)
}

fn evaluate_pair(
    selector: &PairSelector,
    x: &TimeSeries,
    y: &TimeSeries,
) -> Result<EvaluationReport, AnalysisError> {
    let mut report = EvaluationReport {
        symbol_x: x.name().to_string(),
        symbol_y: y.name().to_string(),
        statistic: None,
        p_value: None,
        accepted: false,
        hedge_ratio: None,
        nobs: None,
    };

    let details = match selector.test_cointegration(x, y) {
        Ok(details) => details,
        Err(e) if e.is_data_error() => {
            warn!(x = %x.name(), y = %y.name(), error = %e, "Pair could not be tested");
            return Ok(report);
        }
        Err(e) => return Err(e),
    };

    let accepted = selector.accept(&format!("{}-{}", x.name(), y.name()), &details);
    report.statistic = Some(details.statistic);
    report.p_value = Some(details.p_value);
    report.accepted = accepted.is_some();
    report.hedge_ratio = accepted.map(|r| r.hedge_ratio);
    report.nobs = Some(details.nobs);
    Ok(report)
}
