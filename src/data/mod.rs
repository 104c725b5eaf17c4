//! Historical series sources
//!
//! A [`SeriesProvider`] hands out one closing-price series per symbol over a
//! date range. [`CsvSeriesCache`] serves series from per-symbol CSV files and
//! [`CachedProvider`] puts that cache in front of any upstream provider.

pub mod cached;
pub mod csv_cache;

pub use cached::CachedProvider;
pub use csv_cache::CsvSeriesCache;

use crate::types::TimeSeries;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing series
#[derive(Error, Debug)]
pub enum DataError {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV framing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cell that could not be interpreted
    #[error("{path}:{line}: {message}")]
    Parse {
        path: String,
        line: u64,
        message: String,
    },

    /// Rows violate the series ordering contract (e.g. duplicate timestamps)
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Date range with `start >= end`
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

/// Half-open calendar range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub(crate) fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub(crate) fn default_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MAX)
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
        }
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DataError> {
        if start >= end {
            return Err(DataError::InvalidRange(format!(
                "start {} must be before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Range bounds as UTC midnights.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.start.and_time(NaiveTime::default()).and_utc(),
            self.end.and_time(NaiveTime::default()).and_utc(),
        )
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds();
        ts >= start && ts < end
    }
}

/// Source of per-symbol series.
///
/// `Ok(None)` means the source has no data for the symbol in the range;
/// errors are reserved for I/O and format failures.
#[cfg_attr(test, mockall::automock)]
pub trait SeriesProvider: Send + Sync {
    fn fetch_series(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Option<TimeSeries>, DataError>;
}
