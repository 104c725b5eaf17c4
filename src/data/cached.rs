//! Read-through cache in front of an upstream provider

use super::{CsvSeriesCache, DataError, DateRange, SeriesProvider};
use crate::types::{Observation, TimeSeries};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Serves series from the CSV cache, falling back to `upstream` when the
/// symbol is not cached or the cached file has no rows in the range.
/// Upstream rows are merged into the cache file.
///
/// Upstream failures are logged and reported as "no data"; only cache
/// read errors propagate.
pub struct CachedProvider<P> {
    cache: CsvSeriesCache,
    upstream: P,
}

impl<P: SeriesProvider> CachedProvider<P> {
    pub fn new(cache: CsvSeriesCache, upstream: P) -> Self {
        Self { cache, upstream }
    }

    pub fn cache(&self) -> &CsvSeriesCache {
        &self.cache
    }
}

impl<P: SeriesProvider> SeriesProvider for CachedProvider<P> {
    fn fetch_series(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Option<TimeSeries>, DataError> {
        let cached = self.cache.load(symbol)?;
        if let Some(full) = &cached {
            let (start, end) = range.bounds();
            let sliced = full.slice(start, end);
            if !sliced.is_empty() {
                return Ok(Some(sliced));
            }
        }

        info!(symbol = %symbol, cached = cached.is_some(), "Cache miss, fetching from upstream");
        match self.upstream.fetch_series(symbol, range) {
            Ok(Some(series)) => {
                let persisted = match cached {
                    Some(existing) => merge(&existing, &series),
                    None => Ok(series.clone()),
                };
                match persisted {
                    Ok(merged) => {
                        if let Err(e) = self.cache.store(&merged) {
                            error!(symbol = %symbol, error = %e, "Failed to persist series");
                        }
                    }
                    Err(e) => error!(symbol = %symbol, error = %e, "Failed to merge series"),
                }
                let (start, end) = range.bounds();
                let sliced = series.slice(start, end);
                Ok((!sliced.is_empty()).then_some(sliced))
            }
            Ok(None) => {
                warn!(symbol = %symbol, "Upstream returned no data");
                Ok(None)
            }
            Err(e) => {
                error!(symbol = %symbol, error = %e, "Upstream fetch failed");
                Ok(None)
            }
        }
    }
}

/// Union of two series' rows; `newer` wins on shared timestamps.
fn merge(older: &TimeSeries, newer: &TimeSeries) -> Result<TimeSeries, DataError> {
    let mut rows: BTreeMap<_, f64> = older
        .observations()
        .iter()
        .map(|o| (o.timestamp, o.value))
        .collect();
    rows.extend(newer.observations().iter().map(|o| (o.timestamp, o.value)));
    let observations = rows
        .into_iter()
        .map(|(ts, v)| Observation::new(ts, v))
        .collect();
    TimeSeries::new(newer.name(), observations).map_err(|e| DataError::InvalidSeries(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::MockSeriesProvider;
    use super::*;
    use crate::types::test_support::{daily, day};
    use mockall::predicate::*;
    use tempfile::TempDir;

    #[test]
    fn test_miss_fetches_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut upstream = MockSeriesProvider::new();
        upstream
            .expect_fetch_series()
            .with(eq("MSFT"), always())
            .times(1)
            .returning(|_, _| Ok(Some(daily("MSFT", &[1.0, 2.0, 3.0]))));

        let provider = CachedProvider::new(CsvSeriesCache::new(dir.path()), upstream);
        let range = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap();

        let first = provider.fetch_series("MSFT", &range).unwrap().unwrap();
        assert_eq!(first.len(), 3);
        assert!(provider.cache().contains("MSFT"));

        // Second call is served from disk; the mock would panic on a second call
        let second = provider.fetch_series("MSFT", &range).unwrap().unwrap();
        assert_eq!(second.values().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_upstream_error_is_no_data() {
        let dir = TempDir::new().unwrap();
        let mut upstream = MockSeriesProvider::new();
        upstream.expect_fetch_series().returning(|_, _| {
            Err(DataError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "offline",
            )))
        });

        let provider = CachedProvider::new(CsvSeriesCache::new(dir.path()), upstream);
        let result = provider.fetch_series("IBM", &DateRange::default()).unwrap();
        assert!(result.is_none());
        assert!(!provider.cache().contains("IBM"));
    }

    #[test]
    fn test_upstream_empty_is_no_data() {
        let dir = TempDir::new().unwrap();
        let mut upstream = MockSeriesProvider::new();
        upstream.expect_fetch_series().returning(|_, _| Ok(None));

        let provider = CachedProvider::new(CsvSeriesCache::new(dir.path()), upstream);
        assert!(provider
            .fetch_series("ORCL", &DateRange::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_uncovered_range_falls_back_and_merges() {
        let dir = TempDir::new().unwrap();
        let cache = CsvSeriesCache::new(dir.path());
        cache.store(&daily("GLD", &[1.0, 2.0])).unwrap();

        let later: Vec<_> = (10..13).map(day).collect();
        let mut upstream = MockSeriesProvider::new();
        upstream
            .expect_fetch_series()
            .with(eq("GLD"), always())
            .times(1)
            .returning(move |_, _| {
                Ok(Some(
                    TimeSeries::from_parts("GLD", &later, &[5.0, 6.0, 7.0]).unwrap(),
                ))
            });

        let provider = CachedProvider::new(cache, upstream);
        let range = DateRange::new(day(10).date_naive(), day(20).date_naive()).unwrap();
        let series = provider.fetch_series("GLD", &range).unwrap().unwrap();
        assert_eq!(series.values().collect::<Vec<_>>(), vec![5.0, 6.0, 7.0]);

        // both the old and the new rows are on disk now
        let all = provider.cache().load("GLD").unwrap().unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all.timestamps().next(), Some(day(0)));
    }
}
