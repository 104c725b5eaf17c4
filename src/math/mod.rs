//! Statistical primitives for pair analysis.
//!
//! Descriptive statistics, least-squares regression, and the unit-root and
//! cointegration tests built on top of them.

pub mod regression;
pub mod stationarity;
pub mod stats;

pub use regression::{fit_simple, least_squares, OlsFit, SimpleFit};
pub use stationarity::{
    adf_statistic, adf_test, engle_granger, mackinnon_p_value, AdfResult, AdfStatistic,
    CointegrationTest, Trend,
};
pub use stats::{mean, mean_and_sample_std};
