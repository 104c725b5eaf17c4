//! Cointegration-based pair acceptance
//!
//! Aligns two series, runs the Engle-Granger test and, for accepted pairs,
//! estimates the hedge ratio used to build the spread.

use super::config::SelectorConfig;
use crate::error::AnalysisError;
use crate::math::{engle_granger, fit_simple, CointegrationTest};
use crate::types::{align, AlignedPair, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome for an accepted pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairTestResult {
    /// Engle-Granger p-value (strictly below the configured threshold)
    pub p_value: f64,
    /// Slope of `y` on `x`; the spread is `y - hedge_ratio * x`
    pub hedge_ratio: f64,
}

/// Decides whether two series form a tradeable pair
#[derive(Debug, Clone)]
pub struct PairSelector {
    config: SelectorConfig,
}

impl PairSelector {
    /// Build a selector, rejecting invalid thresholds up front.
    pub fn new(config: SelectorConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Test the pair and return its p-value and hedge ratio when accepted.
    ///
    /// Data problems (no overlap, too few points) are logged and reported
    /// as "no pair".
    pub fn evaluate(&self, x: &TimeSeries, y: &TimeSeries) -> Option<PairTestResult> {
        match self.try_evaluate(x, y) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    pair = format!("{}-{}", x.name(), y.name()),
                    error = %e,
                    data_error = e.is_data_error(),
                    "Pair could not be tested"
                );
                None
            }
        }
    }

    /// Like [`evaluate`](Self::evaluate) but surfaces data errors.
    pub fn try_evaluate(
        &self,
        x: &TimeSeries,
        y: &TimeSeries,
    ) -> Result<Option<PairTestResult>, AnalysisError> {
        let aligned = self.aligned(x, y)?;
        let coint = engle_granger(&aligned.y, &aligned.x)?;
        Ok(self.accept(&format!("{}-{}", x.name(), y.name()), &coint))
    }

    /// Apply the p-value threshold to a finished test.
    ///
    /// The hedge ratio is the slope of the cointegrating regression.
    pub fn accept(&self, pair: &str, coint: &CointegrationTest) -> Option<PairTestResult> {
        if coint.p_value.is_nan() || coint.p_value >= self.config.pvalue_threshold {
            info!(
                pair = %pair,
                p_value = format!("{:.4}", coint.p_value),
                threshold = self.config.pvalue_threshold,
                "Pair rejected: not cointegrated"
            );
            return None;
        }

        info!(
            pair = %pair,
            p_value = format!("{:.4}", coint.p_value),
            hedge_ratio = format!("{:.4}", coint.slope),
            nobs = coint.nobs,
            "Cointegrated pair found"
        );
        Some(PairTestResult {
            p_value: coint.p_value,
            hedge_ratio: coint.slope,
        })
    }

    /// Full Engle-Granger output for the aligned pair.
    pub fn test_cointegration(
        &self,
        x: &TimeSeries,
        y: &TimeSeries,
    ) -> Result<CointegrationTest, AnalysisError> {
        let aligned = self.aligned(x, y)?;
        engle_granger(&aligned.y, &aligned.x)
    }

    /// OLS slope of `y` on `x` over their common timestamps.
    pub fn hedge_ratio(&self, x: &TimeSeries, y: &TimeSeries) -> Result<f64, AnalysisError> {
        hedge_ratio(x, y)
    }

    fn aligned(&self, x: &TimeSeries, y: &TimeSeries) -> Result<AlignedPair, AnalysisError> {
        let aligned = align(x, y);
        if aligned.is_empty() {
            return Err(AnalysisError::EmptyAlignment);
        }
        if aligned.len() < self.config.min_samples {
            warn!(
                pair = format!("{}-{}", x.name(), y.name()),
                samples = aligned.len(),
                min_samples = self.config.min_samples,
                "Too few aligned points for a reliable cointegration test"
            );
        } else {
            debug!(
                pair = format!("{}-{}", x.name(), y.name()),
                samples = aligned.len(),
                "Series aligned"
            );
        }
        Ok(aligned)
    }
}

/// OLS slope of `y` on `x` over their common timestamps.
pub fn hedge_ratio(x: &TimeSeries, y: &TimeSeries) -> Result<f64, AnalysisError> {
    let aligned = align(x, y);
    if aligned.is_empty() {
        return Err(AnalysisError::EmptyAlignment);
    }
    Ok(fit_simple(&aligned.y, &aligned.x)?.slope)
}
