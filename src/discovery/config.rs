//! Configuration for the pair selector

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Acceptance criteria for a candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// A pair is accepted when the cointegration p-value is strictly below this
    #[serde(default = "default_pvalue_threshold")]
    pub pvalue_threshold: f64,

    /// Below this many aligned points the test still runs but is flagged as unreliable
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
}

// Default value functions for serde
pub(crate) fn default_pvalue_threshold() -> f64 {
    0.05
}
pub(crate) fn default_min_samples() -> usize {
    50
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            pvalue_threshold: default_pvalue_threshold(),
            min_samples: default_min_samples(),
        }
    }
}

impl SelectorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.pvalue_threshold > 0.0 && self.pvalue_threshold < 1.0) {
            return Err(AnalysisError::Configuration(format!(
                "pvalue_threshold must be in (0, 1), got {}",
                self.pvalue_threshold
            )));
        }
        if self.min_samples == 0 {
            return Err(AnalysisError::Configuration(
                "min_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SelectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pvalue_threshold, 0.05);
        assert_eq!(config.min_samples, 50);
    }

    #[test]
    fn test_threshold_bounds() {
        for bad in [0.0, 1.0, -0.1, f64::NAN] {
            let config = SelectorConfig {
                pvalue_threshold: bad,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(AnalysisError::Configuration(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_zero_min_samples_invalid() {
        let config = SelectorConfig {
            min_samples: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SelectorConfig = serde_json::from_str(r#"{"pvalue_threshold": 0.01}"#).unwrap();
        assert_eq!(config.pvalue_threshold, 0.01);
        assert_eq!(config.min_samples, 50);
    }
}
