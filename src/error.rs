//! Error types for the pair analysis core

use thiserror::Error;

/// Errors raised by alignment, statistics and strategy construction.
///
/// `InsufficientData` and `EmptyAlignment` describe the data, not the caller:
/// the pair selector turns them into "no pair found". `Configuration` is
/// raised when a strategy or selector is built and never mid-computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Fewer aligned points than a statistical computation needs
    #[error("Insufficient data: expected at least {required} aligned points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The two series share no usable timestamp
    #[error("Series have no timestamps in common")]
    EmptyAlignment,

    /// Invalid parameter values or ordering
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Series violates the ordering contract
    #[error("Invalid series: {0}")]
    InvalidSeries(String),
}

impl AnalysisError {
    /// True for errors caused by the data content rather than by the caller.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientData { .. } | AnalysisError::EmptyAlignment
        )
    }
}
