//! Ordinary least squares.
//!
//! Two entry points:
//! - [`fit_simple`]: closed-form `y = α + β·x` used for hedge ratios and the
//!   first step of the Engle-Granger test.
//! - [`least_squares`]: multiple regression through the normal equations,
//!   used by the augmented Dickey-Fuller regression where the lag order
//!   varies.
//!
//! # Hedge-ratio convention
//!
//! The slope of `y` on `x` is the hedge ratio β and the spread is `y − β·x`.
//! Every caller in the crate regresses in this direction.

use crate::error::AnalysisError;
use nalgebra::{DMatrix, DVector};

/// Result of a single-regressor fit with intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleFit {
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
    pub residuals: Vec<f64>,
}

impl SimpleFit {
    /// True when the regression explains the dependent series exactly
    /// (to within floating point noise).
    pub fn is_perfect(&self) -> bool {
        self.r_squared >= 1.0 - 100.0 * f64::EPSILON.sqrt()
    }
}

/// Fit `y = α + β·x` by least squares.
///
/// A constant regressor carries no information about the slope; in that case
/// β is 0 and α is the mean of `y`.
pub fn fit_simple(y: &[f64], x: &[f64]) -> Result<SimpleFit, AnalysisError> {
    if y.len() != x.len() {
        return Err(AnalysisError::InvalidSeries(format!(
            "regression inputs differ in length: {} vs {}",
            y.len(),
            x.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let n_f64 = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f64;
    let mean_y = y.iter().sum::<f64>() / n_f64;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let intercept = mean_y - slope * mean_x;

    let residuals: Vec<f64> = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| yi - (intercept + slope * xi))
        .collect();
    let ssr: f64 = residuals.iter().map(|r| r * r).sum();
    // A constant dependent series has nothing to explain
    let r_squared = if syy == 0.0 { 0.0 } else { 1.0 - ssr / syy };

    Ok(SimpleFit {
        intercept,
        slope,
        r_squared,
        residuals,
    })
}

/// Coefficients and diagnostics of a multiple regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Akaike information criterion under Gaussian errors.
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let k = self.coefficients.len() as f64;
        n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0) + 2.0 * k
    }
}

/// Solve `target = design · b + e` through the normal equations.
///
/// Returns `None` when there are not more rows than columns or `XᵀX` is
/// singular.
pub fn least_squares(design: &DMatrix<f64>, target: &DVector<f64>) -> Option<OlsFit> {
    let (n, k) = design.shape();
    if n <= k || target.len() != n {
        return None;
    }

    let xtx = design.transpose() * design;
    let xtx_inv = xtx.try_inverse()?;
    let beta = &xtx_inv * (design.transpose() * target);

    let residuals = target - design * &beta;
    let ssr = residuals.dot(&residuals);
    let sigma2 = ssr / (n - k) as f64;

    let std_errors = (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()).collect();

    Some(OlsFit {
        coefficients: beta.iter().copied().collect(),
        std_errors,
        ssr,
        nobs: n,
    })
}
