//! Per-symbol CSV series cache
//!
//! One file per symbol at `{dir}/{symbol}.csv` with header
//! `timestamp,<symbol>`. Timestamps are read as RFC 3339,
//! `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (midnight UTC) and always written
//! back as RFC 3339. An empty value cell is a missing observation.

use super::{DataError, DateRange, SeriesProvider};
use crate::types::{Observation, TimeSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, Writer};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory-backed store of closing-price series
#[derive(Debug, Clone)]
pub struct CsvSeriesCache {
    dir: PathBuf,
}

impl CsvSeriesCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `symbol`. Path separators in the symbol are replaced.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        let file_stem: String = symbol
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.csv", file_stem))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.path_for(symbol).is_file()
    }

    /// Read the whole cached series, `Ok(None)` when no file exists.
    pub fn load(&self, symbol: &str) -> Result<Option<TimeSeries>, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            warn!(symbol = %symbol, path = %path.display(), "No cached series");
            return Ok(None);
        }

        let display = path.display().to_string();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let mut observations = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let parse_err = |message: String| DataError::Parse {
                path: display.clone(),
                line,
                message,
            };

            let raw_ts = record
                .get(0)
                .ok_or_else(|| parse_err("missing timestamp column".to_string()))?;
            let timestamp = parse_timestamp(raw_ts)
                .ok_or_else(|| parse_err(format!("unrecognised timestamp '{}'", raw_ts)))?;

            let value = match record.get(1).unwrap_or("") {
                "" => f64::NAN,
                raw => raw
                    .parse::<f64>()
                    .map_err(|e| parse_err(format!("bad value '{}': {}", raw, e)))?,
            };
            observations.push(Observation::new(timestamp, value));
        }

        observations.sort_by_key(|o| o.timestamp);
        let series = TimeSeries::new(symbol, observations)
            .map_err(|e| DataError::InvalidSeries(format!("{}: {}", display, e)))?;

        debug!(symbol = %symbol, rows = series.len(), "Loaded cached series");
        Ok(Some(series))
    }

    /// Write `series` to its cache file, creating the directory if needed.
    pub fn store(&self, series: &TimeSeries) -> Result<PathBuf, DataError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(series.name());
        let mut writer = Writer::from_path(&path)?;

        writer.write_record(["timestamp", series.name()])?;
        for obs in series.observations() {
            let value = if obs.is_missing() {
                String::new()
            } else {
                obs.value.to_string()
            };
            writer.write_record([obs.timestamp.to_rfc3339(), value])?;
        }
        writer.flush()?;

        info!(
            symbol = %series.name(),
            rows = series.len(),
            path = %path.display(),
            "Series cached"
        );
        Ok(path)
    }
}

impl SeriesProvider for CsvSeriesCache {
    fn fetch_series(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Option<TimeSeries>, DataError> {
        let Some(series) = self.load(symbol)? else {
            return Ok(None);
        };
        let (start, end) = range.bounds();
        let sliced = series.slice(start, end);
        if sliced.is_empty() {
            warn!(
                symbol = %symbol,
                start = %range.start,
                end = %range.end,
                "Cached series has no rows in range"
            );
            return Ok(None);
        }
        Ok(Some(sliced))
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
