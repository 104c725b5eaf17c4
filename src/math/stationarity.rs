//! Unit-root and cointegration tests.
//!
//! # Augmented Dickey-Fuller
//!
//! ```text
//! Δy[t] = γ·y[t-1] + Σ φᵢ·Δy[t-i] + (c) + ε
//! ```
//!
//! H0: γ = 0 (unit root, non-stationary). The statistic is the t-value of γ;
//! more negative means more evidence of mean reversion. The number of lagged
//! differences is chosen by AIC between 0 and
//! `min(n/2 − k − 1, ⌈12·(n/100)^¼⌉)`, then the regression is re-run on the
//! longest sample that lag order allows.
//!
//! # Engle-Granger
//!
//! 1. Regress `y = α + β·x + e`.
//! 2. Run ADF (no deterministic term) on the residuals `e`.
//! 3. Convert the statistic with the two-variable MacKinnon surface.
//!
//! # References
//!
//! - MacKinnon, J.G. (1994). "Approximate Asymptotic Distribution Functions
//!   for Unit-Root and Cointegration Tests"
//! - Engle, R.F. & Granger, C.W.J. (1987). "Co-integration and Error
//!   Correction"

use super::regression::{fit_simple, least_squares};
use crate::error::AnalysisError;
use nalgebra::{DMatrix, DVector};
use statrs::function::erf::erfc;
use tracing::debug;

/// Deterministic terms in the ADF regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// No constant (used on Engle-Granger residuals, which have mean zero)
    None,
    /// Constant term
    Constant,
}

impl Trend {
    fn terms(self) -> usize {
        match self {
            Trend::None => 0,
            Trend::Constant => 1,
        }
    }
}

/// Raw ADF regression output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfStatistic {
    pub statistic: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// ADF statistic with its approximate p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// Outcome of the Engle-Granger two-step test of `y` on `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CointegrationTest {
    pub statistic: f64,
    pub p_value: f64,
    /// Slope of the cointegrating regression (`y ≈ α + β·x`)
    pub slope: f64,
    pub intercept: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// Coefficients of one MacKinnon (1994) response surface.
#[derive(Debug, Clone, Copy)]
pub struct PValueSurface {
    max_stat: f64,
    min_stat: f64,
    star_stat: f64,
    small_p: [f64; 3],
    large_p: [f64; 4],
}

/// Constant term, one series (plain ADF with intercept).
pub const ADF_CONSTANT: PValueSurface = PValueSurface {
    max_stat: 2.74,
    min_stat: -18.83,
    star_stat: -1.61,
    small_p: [2.1659, 1.4412, 3.8269e-2],
    large_p: [1.7339, 9.3202e-1, -1.2745e-1, -1.0368e-2],
};

/// Constant term, two series (Engle-Granger on a pair).
pub const ENGLE_GRANGER_PAIR: PValueSurface = PValueSurface {
    max_stat: 0.92,
    min_stat: -18.86,
    star_stat: -2.62,
    small_p: [2.92, 1.5012, 3.9796e-2],
    large_p: [2.1945, 6.4695e-1, -2.9198e-1, -4.2377e-2],
};

/// Approximate asymptotic p-value of a unit-root / cointegration statistic.
pub fn mackinnon_p_value(statistic: f64, surface: &PValueSurface) -> f64 {
    if statistic.is_nan() || statistic > surface.max_stat {
        return 1.0;
    }
    if statistic < surface.min_stat {
        return 0.0;
    }
    let z = if statistic <= surface.star_stat {
        polyval(&surface.small_p, statistic)
    } else {
        polyval(&surface.large_p, statistic)
    };
    standard_normal_cdf(z)
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// Build the ADF design for a given lag order over the last `nobs` rows.
///
/// Column 0 is the lagged level, then `lag` lagged differences, then the
/// deterministic terms.
fn adf_design(
    levels: &[f64],
    diffs: &[f64],
    lag: usize,
    skip: usize,
    trend: Trend,
) -> (DMatrix<f64>, DVector<f64>) {
    let nobs = diffs.len() - skip;
    let cols = 1 + lag + trend.terms();
    let design = DMatrix::from_fn(nobs, cols, |r, c| {
        let t = skip + r;
        if c == 0 {
            levels[t]
        } else if c <= lag {
            diffs[t - c]
        } else {
            1.0
        }
    });
    let target = DVector::from_fn(nobs, |r, _| diffs[skip + r]);
    (design, target)
}

/// Augmented Dickey-Fuller statistic with AIC lag selection.
pub fn adf_statistic(series: &[f64], trend: Trend) -> Result<AdfStatistic, AnalysisError> {
    let n = series.len();
    let required = 3 + trend.terms();
    if n < required {
        return Err(AnalysisError::InsufficientData {
            required,
            actual: n,
        });
    }

    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lag = (n / 2).saturating_sub(trend.terms() + 1).min(schwert);

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // Lag search on a common sample so AIC values are comparable
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let (design, target) = adf_design(series, &diffs, lag, max_lag, trend);
        if let Some(fit) = least_squares(&design, &target) {
            let aic = fit.aic();
            if best.map_or(true, |(best_aic, _)| aic < best_aic) {
                best = Some((aic, lag));
            }
        }
    }
    let used_lag = best.map_or(0, |(_, lag)| lag);

    let (design, target) = adf_design(series, &diffs, used_lag, used_lag, trend);
    let nobs = target.len();
    let statistic = match least_squares(&design, &target) {
        Some(fit) => {
            let t = fit.t_value(0);
            if t.is_finite() {
                t
            } else if fit.coefficients[0] < 0.0 {
                // zero residual variance with a mean-reverting coefficient
                f64::NEG_INFINITY
            } else {
                0.0
            }
        }
        None => {
            debug!(nobs, used_lag, "Degenerate ADF regression");
            0.0
        }
    };

    Ok(AdfStatistic {
        statistic,
        used_lag,
        nobs,
    })
}

/// ADF test with a constant term, p-value from the one-series surface.
pub fn adf_test(series: &[f64]) -> Result<AdfResult, AnalysisError> {
    let adf = adf_statistic(series, Trend::Constant)?;
    Ok(AdfResult {
        statistic: adf.statistic,
        p_value: mackinnon_p_value(adf.statistic, &ADF_CONSTANT),
        used_lag: adf.used_lag,
        nobs: adf.nobs,
    })
}

/// Engle-Granger cointegration test of `y` on `x`.
///
/// Inputs must already be aligned. Needs at least three points.
pub fn engle_granger(y: &[f64], x: &[f64]) -> Result<CointegrationTest, AnalysisError> {
    if y.len() < 3 {
        return Err(AnalysisError::InsufficientData {
            required: 3,
            actual: y.len(),
        });
    }
    let fit = fit_simple(y, x)?;

    if fit.is_perfect() {
        debug!(slope = fit.slope, "Cointegrating regression fits exactly");
        return Ok(CointegrationTest {
            statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            slope: fit.slope,
            intercept: fit.intercept,
            used_lag: 0,
            nobs: y.len(),
        });
    }

    let adf = adf_statistic(&fit.residuals, Trend::None)?;
    Ok(CointegrationTest {
        statistic: adf.statistic,
        p_value: mackinnon_p_value(adf.statistic, &ENGLE_GRANGER_PAIR),
        slope: fit.slope,
        intercept: fit.intercept,
        used_lag: adf.used_lag,
        nobs: adf.nobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{noise, random_walk};

    #[test]
    fn test_mackinnon_reproduces_five_percent_critical_values() {
        // ADF with constant: 5% critical value ≈ -2.86
        let p = mackinnon_p_value(-2.86, &ADF_CONSTANT);
        assert!((p - 0.05).abs() < 0.005, "got {}", p);
        // Two-variable Engle-Granger: 5% critical value ≈ -3.34
        let p = mackinnon_p_value(-3.34, &ENGLE_GRANGER_PAIR);
        assert!((p - 0.05).abs() < 0.005, "got {}", p);
    }

    #[test]
    fn test_mackinnon_bounds() {
        assert_eq!(mackinnon_p_value(5.0, &ENGLE_GRANGER_PAIR), 1.0);
        assert_eq!(mackinnon_p_value(-25.0, &ENGLE_GRANGER_PAIR), 0.0);
        assert_eq!(mackinnon_p_value(f64::NEG_INFINITY, &ENGLE_GRANGER_PAIR), 0.0);
        assert_eq!(mackinnon_p_value(f64::NAN, &ENGLE_GRANGER_PAIR), 1.0);
    }

    #[test]
    fn test_mackinnon_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..200 {
            let stat = -10.0 + i as f64 * 0.05;
            let p = mackinnon_p_value(stat, &ENGLE_GRANGER_PAIR);
            assert!(p >= prev - 1e-3, "p-value dropped at {}: {} < {}", stat, p, prev);
            prev = p;
        }
    }

    #[test]
    fn test_adf_rejects_unit_root_for_white_noise() {
        let series = noise(7, 300);
        let result = adf_test(&series).unwrap();
        assert!(result.statistic < -5.0, "stat {}", result.statistic);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_adf_keeps_unit_root_for_random_walk() {
        let not_rejected = (0..10u64)
            .filter(|seed| adf_test(&random_walk(*seed, 300)).unwrap().p_value > 0.05)
            .count();
        assert!(not_rejected >= 6, "only {} of 10 walks kept the unit root", not_rejected);
    }

    #[test]
    fn test_adf_insufficient_data() {
        assert_eq!(
            adf_statistic(&[1.0, 2.0], Trend::None),
            Err(AnalysisError::InsufficientData {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_adf_constant_series_is_degenerate() {
        let result = adf_test(&[5.0; 50]).unwrap();
        assert!(result.p_value > 0.5);
    }

    #[test]
    fn test_engle_granger_detects_cointegrated_pair() {
        let x = random_walk(3, 250);
        let e = noise(5, 250);
        let y: Vec<f64> = x.iter().zip(e.iter()).map(|(x, e)| 10.0 + 1.5 * x + e).collect();

        let result = engle_granger(&y, &x).unwrap();
        assert!(result.p_value < 0.01, "p {}", result.p_value);
        assert!((result.slope - 1.5).abs() < 0.1);
    }

    #[test]
    fn test_engle_granger_exact_relationship() {
        let x: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        let result = engle_granger(&y, &x).unwrap();
        assert_eq!(result.p_value, 0.0);
        assert_eq!(result.statistic, f64::NEG_INFINITY);
    }

    #[test]
    fn test_engle_granger_requires_three_points() {
        assert!(matches!(
            engle_granger(&[1.0, 2.0], &[1.0, 3.0]),
            Err(AnalysisError::InsufficientData { required: 3, .. })
        ));
    }
}
