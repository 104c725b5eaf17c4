//! Spread and rolling z-score.
//!
//! `spread[t] = y[t] − β·x[t]` over the common timestamps of the two legs.
//! `z[t]` is the spread's distance from the mean of the trailing `lookback`
//! values (including t) in sample standard deviations. The first
//! `lookback − 1` entries, and any window with zero or non-finite deviation,
//! have no z-score.

use crate::error::AnalysisError;
use crate::math::mean_and_sample_std;
use crate::types::{align, TimeSeries};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Spread rows with the leg prices they were computed from
#[derive(Debug, Clone, PartialEq)]
pub struct Spread {
    pub beta: f64,
    pub timestamps: Vec<DateTime<Utc>>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub values: Vec<f64>,
}

impl Spread {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The spread as a named series.
    pub fn to_series(&self, name: impl Into<String>) -> Result<TimeSeries, AnalysisError> {
        TimeSeries::from_parts(name, &self.timestamps, &self.values)
    }
}

/// Z-score per spread row; `None` where undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationSeries {
    pub lookback: usize,
    pub timestamps: Vec<DateTime<Utc>>,
    pub zscores: Vec<Option<f64>>,
}

impl DeviationSeries {
    pub fn len(&self) -> usize {
        self.zscores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zscores.is_empty()
    }

    /// Number of rows with a defined z-score.
    pub fn defined(&self) -> usize {
        self.zscores.iter().filter(|z| z.is_some()).count()
    }
}

/// Build `y − β·x` over the common timestamps of `x` and `y`.
pub fn compute_spread(x: &TimeSeries, y: &TimeSeries, beta: f64) -> Result<Spread, AnalysisError> {
    if !beta.is_finite() {
        return Err(AnalysisError::Configuration(format!(
            "hedge ratio must be finite, got {}",
            beta
        )));
    }
    let aligned = align(x, y);
    if aligned.is_empty() {
        return Err(AnalysisError::EmptyAlignment);
    }
    let values = aligned
        .x
        .iter()
        .zip(aligned.y.iter())
        .map(|(x, y)| y - beta * x)
        .collect();
    Ok(Spread {
        beta,
        timestamps: aligned.timestamps,
        x: aligned.x,
        y: aligned.y,
        values,
    })
}

/// Rolling z-score of every spread row.
pub fn compute_zscore(spread: &Spread, lookback: usize) -> Result<DeviationSeries, AnalysisError> {
    let mut rolling = RollingZScore::new(lookback)?;
    let zscores = spread.values.iter().map(|v| rolling.push(*v)).collect();
    Ok(DeviationSeries {
        lookback,
        timestamps: spread.timestamps.clone(),
        zscores,
    })
}

/// Streaming z-score over a fixed-size trailing window.
#[derive(Debug, Clone)]
pub struct RollingZScore {
    lookback: usize,
    window: VecDeque<f64>,
}

impl RollingZScore {
    pub fn new(lookback: usize) -> Result<Self, AnalysisError> {
        if lookback < 2 {
            return Err(AnalysisError::Configuration(format!(
                "lookback must be at least 2, got {}",
                lookback
            )));
        }
        Ok(Self {
            lookback,
            window: VecDeque::with_capacity(lookback),
        })
    }

    /// Add a value and return its z-score against the window that ends with it.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.lookback {
            self.window.pop_front();
        }
        if self.window.len() < self.lookback {
            return None;
        }

        let (mean, std) = mean_and_sample_std(self.window.iter().copied())?;
        if std == 0.0 || !std.is_finite() {
            return None;
        }
        let z = (value - mean) / std;
        z.is_finite().then_some(z)
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() == self.lookback
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{daily, day};
    use crate::types::Observation;

    #[test]
    fn test_spread_uses_y_minus_beta_x() {
        let x = daily("X", &[1.0, 2.0, 3.0]);
        let y = daily("Y", &[5.0, 7.0, 10.0]);
        let spread = compute_spread(&x, &y, 2.0).unwrap();
        assert_eq!(spread.values, vec![3.0, 3.0, 4.0]);
    }

    #[test]
    fn test_spread_length_matches_alignment() {
        let x = daily("X", &[1.0, f64::NAN, 3.0, 4.0]);
        let y = TimeSeries::new(
            "Y",
            vec![
                Observation::new(day(0), 1.0),
                Observation::new(day(1), 1.0),
                Observation::new(day(3), 1.0),
                Observation::new(day(5), 1.0),
            ],
        )
        .unwrap();
        let spread = compute_spread(&x, &y, 1.0).unwrap();
        assert_eq!(spread.timestamps, vec![day(0), day(3)]);
    }

    #[test]
    fn test_spread_without_overlap() {
        let x = daily("X", &[1.0]);
        let y = TimeSeries::new("Y", vec![Observation::new(day(4), 1.0)]).unwrap();
        assert_eq!(
            compute_spread(&x, &y, 1.0),
            Err(AnalysisError::EmptyAlignment)
        );
    }

    #[test]
    fn test_zscore_undefined_until_window_full() {
        let spread = compute_spread(
            &daily("X", &[0.0; 5]),
            &daily("Y", &[1.0, 2.0, 3.0, 4.0, 6.0]),
            1.0,
        )
        .unwrap();
        let dev = compute_zscore(&spread, 3).unwrap();
        assert_eq!(dev.zscores[0], None);
        assert_eq!(dev.zscores[1], None);
        // window [1,2,3]: mean 2, sample std 1
        assert!((dev.zscores[2].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(dev.defined(), 3);
    }

    #[test]
    fn test_flat_window_is_undefined_not_zero() {
        let mut rolling = RollingZScore::new(3).unwrap();
        assert_eq!(rolling.push(2.0), None);
        assert_eq!(rolling.push(2.0), None);
        assert_eq!(rolling.push(2.0), None);
        assert!(rolling.is_ready());
        assert!(rolling.push(5.0).is_some());
    }

    #[test]
    fn test_flat_window_of_inexact_values_is_undefined() {
        let mut rolling = RollingZScore::new(3).unwrap();
        for _ in 0..5 {
            assert_eq!(rolling.push(0.1), None);
        }
    }

    #[test]
    fn test_lookback_below_two_rejected() {
        assert!(matches!(
            RollingZScore::new(1),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_non_finite_beta_rejected() {
        let x = daily("X", &[1.0]);
        assert!(matches!(
            compute_spread(&x, &x, f64::NAN),
            Err(AnalysisError::Configuration(_))
        ));
    }
}
