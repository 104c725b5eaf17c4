//! Common Types Module
//!
//! Time series, alignment and order sides shared across the codebase.

use crate::error::AnalysisError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side that unwinds a position opened with `self`.
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// A single timestamped value.
///
/// A non-finite `value` marks a missing observation; it is kept in the
/// series but dropped when two series are aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    pub fn is_missing(&self) -> bool {
        !self.value.is_finite()
    }
}

/// Ordered, timestamp-indexed numeric series (e.g. closing prices of one symbol).
///
/// Timestamps are strictly increasing. Gaps are fine, duplicates are not.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series, rejecting unordered or duplicate timestamps.
    pub fn new(
        name: impl Into<String>,
        observations: Vec<Observation>,
    ) -> Result<Self, AnalysisError> {
        let name = name.into();
        for (i, pair) in observations.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(AnalysisError::InvalidSeries(format!(
                    "{}: timestamp {} at index {} does not follow {}",
                    name,
                    pair[1].timestamp,
                    i + 1,
                    pair[0].timestamp
                )));
            }
        }
        Ok(Self { name, observations })
    }

    /// Build a series from parallel timestamp/value slices.
    pub fn from_parts(
        name: impl Into<String>,
        timestamps: &[DateTime<Utc>],
        values: &[f64],
    ) -> Result<Self, AnalysisError> {
        if timestamps.len() != values.len() {
            return Err(AnalysisError::InvalidSeries(format!(
                "{} timestamps but {} values",
                timestamps.len(),
                values.len()
            )));
        }
        let observations = timestamps
            .iter()
            .zip(values.iter())
            .map(|(ts, v)| Observation::new(*ts, *v))
            .collect();
        Self::new(name, observations)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.observations.iter().map(|o| o.timestamp)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.value)
    }

    /// Keep observations with `start <= timestamp < end`.
    pub fn slice(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            name: self.name.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| o.timestamp >= start && o.timestamp < end)
                .copied()
                .collect(),
        }
    }
}

/// Two series joined on their common timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPair {
    pub timestamps: Vec<DateTime<Utc>>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Inner-join `x` and `y` on timestamp, dropping rows missing on either side.
///
/// Both inputs are sorted, so this is a single merge pass.
pub fn align(x: &TimeSeries, y: &TimeSeries) -> AlignedPair {
    let xs = x.observations();
    let ys = y.observations();
    let mut out = AlignedPair {
        timestamps: Vec::with_capacity(xs.len().min(ys.len())),
        x: Vec::with_capacity(xs.len().min(ys.len())),
        y: Vec::with_capacity(xs.len().min(ys.len())),
    };

    let (mut i, mut j) = (0, 0);
    while i < xs.len() && j < ys.len() {
        let (a, b) = (&xs[i], &ys[j]);
        match a.timestamp.cmp(&b.timestamp) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                if !a.is_missing() && !b.is_missing() {
                    out.timestamps.push(a.timestamp);
                    out.x.push(a.value);
                    out.y.push(b.value);
                }
                i += 1;
                j += 1;
            }
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Daily timestamps starting 2024-01-01.
    pub fn day(i: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i as i64)
    }

    pub fn daily(name: &str, values: &[f64]) -> TimeSeries {
        let ts: Vec<_> = (0..values.len()).map(day).collect();
        TimeSeries::from_parts(name, &ts, values).unwrap()
    }

    /// Deterministic standard normal draws (LCG + Box-Muller).
    pub fn noise(seed: u64, n: usize) -> Vec<f64> {
        let mut state = seed
            .wrapping_mul(2862933555777941757)
            .wrapping_add(3037000493);
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 11) as f64 + 0.5) / (1u64 << 53) as f64
        };
        (0..n)
            .map(|_| {
                let (u1, u2) = (next(), next());
                (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
            })
            .collect()
    }

    /// Gaussian random walk starting at 100.
    pub fn random_walk(seed: u64, n: usize) -> Vec<f64> {
        noise(seed, n)
            .into_iter()
            .scan(100.0, |level, e| {
                *level += e;
                Some(*level)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_rejects_duplicate_timestamps() {
        let obs = vec![Observation::new(day(0), 1.0), Observation::new(day(0), 2.0)];
        assert!(matches!(
            TimeSeries::new("A", obs),
            Err(AnalysisError::InvalidSeries(_))
        ));
    }

    #[test]
    fn test_rejects_unordered_timestamps() {
        let obs = vec![Observation::new(day(2), 1.0), Observation::new(day(1), 2.0)];
        assert!(TimeSeries::new("A", obs).is_err());
    }

    #[test]
    fn test_align_inner_join_with_gaps() {
        let x = TimeSeries::new(
            "X",
            vec![
                Observation::new(day(0), 1.0),
                Observation::new(day(1), 2.0),
                Observation::new(day(3), 4.0),
            ],
        )
        .unwrap();
        let y = TimeSeries::new(
            "Y",
            vec![
                Observation::new(day(1), 20.0),
                Observation::new(day(2), 30.0),
                Observation::new(day(3), 40.0),
            ],
        )
        .unwrap();

        let aligned = align(&x, &y);
        assert_eq!(aligned.timestamps, vec![day(1), day(3)]);
        assert_eq!(aligned.x, vec![2.0, 4.0]);
        assert_eq!(aligned.y, vec![20.0, 40.0]);
    }

    #[test]
    fn test_align_drops_missing_values() {
        let x = daily("X", &[1.0, f64::NAN, 3.0]);
        let y = daily("Y", &[10.0, 20.0, f64::INFINITY]);
        let aligned = align(&x, &y);
        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned.timestamps[0], day(0));
    }

    #[test]
    fn test_slice_is_half_open() {
        let s = daily("X", &[1.0, 2.0, 3.0, 4.0]);
        let sliced = s.slice(day(1), day(3));
        assert_eq!(sliced.values().collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_order_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.to_string(), "sell");
    }
}
