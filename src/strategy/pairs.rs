//! Z-score driven pairs strategy.
//!
//! # State machine
//!
//! ```text
//!            z > entry                       |z| < exit
//!   Flat ─────────────────▶ ShortSpread ─────────────────▶ Flat
//!   Flat ─────────────────▶ LongSpread  ─────────────────▶ Flat
//!            z < -entry                      |z| < exit
//! ```
//!
//! All comparisons are strict, so a z-score exactly at a threshold never
//! triggers. Rows without a z-score are skipped. A position still open at the
//! end of the input stays open; [`SignalStateMachine::flatten`] closes it
//! explicitly, unless it was opened on the last row.

use super::spread::{compute_spread, compute_zscore, RollingZScore};
use super::{Position, Signal, SignalSide};
use crate::error::AnalysisError;
use crate::types::TimeSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Thresholds and window of the strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairStrategyConfig {
    /// Rolling window size for the z-score (observations)
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Z-score magnitude that opens a position (must be positive)
    #[serde(default = "default_entry_zscore")]
    pub entry_zscore: f64,
    /// Z-score magnitude below which a position closes (must be < entry_zscore)
    #[serde(default = "default_exit_zscore")]
    pub exit_zscore: f64,
}

pub(crate) fn default_lookback() -> usize {
    20
}
pub(crate) fn default_entry_zscore() -> f64 {
    2.0
}
pub(crate) fn default_exit_zscore() -> f64 {
    0.5
}

impl Default for PairStrategyConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            entry_zscore: default_entry_zscore(),
            exit_zscore: default_exit_zscore(),
        }
    }
}

impl PairStrategyConfig {
    pub fn builder() -> PairStrategyConfigBuilder {
        PairStrategyConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.lookback < 2 {
            return Err(AnalysisError::Configuration(format!(
                "lookback must be at least 2, got {}",
                self.lookback
            )));
        }
        if !self.entry_zscore.is_finite() || self.entry_zscore <= 0.0 {
            return Err(AnalysisError::Configuration(format!(
                "entry_zscore must be positive, got {}",
                self.entry_zscore
            )));
        }
        if !self.exit_zscore.is_finite()
            || self.exit_zscore < 0.0
            || self.exit_zscore >= self.entry_zscore
        {
            return Err(AnalysisError::Configuration(format!(
                "exit_zscore must be in [0, entry_zscore), got {} with entry {}",
                self.exit_zscore, self.entry_zscore
            )));
        }
        Ok(())
    }
}

/// Fluent builder for [`PairStrategyConfig`], validated on `build`.
#[derive(Debug, Clone, Default)]
pub struct PairStrategyConfigBuilder {
    config: PairStrategyConfig,
}

impl PairStrategyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rolling window size
    pub fn lookback(mut self, lookback: usize) -> Self {
        self.config.lookback = lookback;
        self
    }

    /// Set the entry threshold
    pub fn entry_zscore(mut self, z: f64) -> Self {
        self.config.entry_zscore = z;
        self
    }

    /// Set the exit threshold
    pub fn exit_zscore(mut self, z: f64) -> Self {
        self.config.exit_zscore = z;
        self
    }

    pub fn build(self) -> Result<PairStrategyConfig, AnalysisError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Position state machine fed one z-score at a time.
#[derive(Debug, Clone)]
pub struct SignalStateMachine {
    entry_zscore: f64,
    exit_zscore: f64,
    position: Position,
}

impl SignalStateMachine {
    /// Thresholds are assumed validated (see [`PairStrategyConfig::validate`]).
    pub fn new(entry_zscore: f64, exit_zscore: f64) -> Self {
        Self {
            entry_zscore,
            exit_zscore,
            position: Position::Flat,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Apply one z-score, returning the signal if the position changed.
    pub fn on_zscore(&mut self, z: f64) -> Option<SignalSide> {
        let (next, side) = match self.position {
            Position::Flat if z > self.entry_zscore => {
                (Position::ShortSpread, SignalSide::EnterShortSpread)
            }
            Position::Flat if z < -self.entry_zscore => {
                (Position::LongSpread, SignalSide::EnterLongSpread)
            }
            Position::LongSpread | Position::ShortSpread if z.abs() < self.exit_zscore => {
                (Position::Flat, SignalSide::Exit)
            }
            _ => return None,
        };
        self.position = next;
        Some(side)
    }

    /// Close any open position regardless of the z-score.
    pub fn flatten(&mut self) -> Option<SignalSide> {
        if self.position == Position::Flat {
            return None;
        }
        self.position = Position::Flat;
        Some(SignalSide::Exit)
    }
}

/// Pairs strategy for a fixed hedge ratio.
///
/// Immutable; every call owns its own state machine, so one strategy can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct PairStrategy {
    beta: f64,
    config: PairStrategyConfig,
    window: RollingZScore,
}

impl PairStrategy {
    pub fn new(beta: f64, config: PairStrategyConfig) -> Result<Self, AnalysisError> {
        if !beta.is_finite() {
            return Err(AnalysisError::Configuration(format!(
                "hedge ratio must be finite, got {}",
                beta
            )));
        }
        config.validate()?;
        let window = RollingZScore::new(config.lookback)?;
        Ok(Self {
            beta,
            config,
            window,
        })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn config(&self) -> &PairStrategyConfig {
        &self.config
    }

    /// Ordered entry/exit signals for the pair. Open positions stay open.
    pub fn generate_signals(&self, x: &TimeSeries, y: &TimeSeries) -> Vec<Signal> {
        self.walk(x, y, false)
    }

    /// Like [`generate_signals`](Self::generate_signals), closing any open
    /// position at the last row with a z-score. A position entered on that
    /// row stays open so no two signals share a timestamp.
    pub fn generate_signals_closed(&self, x: &TimeSeries, y: &TimeSeries) -> Vec<Signal> {
        self.walk(x, y, true)
    }

    /// Incremental form for prices arriving one row at a time.
    pub fn stream(&self) -> SignalStream {
        SignalStream {
            beta: self.beta,
            rolling: self.window.clone(),
            machine: self.machine(),
            last: None,
            last_fired: false,
        }
    }

    fn machine(&self) -> SignalStateMachine {
        SignalStateMachine::new(self.config.entry_zscore, self.config.exit_zscore)
    }

    fn walk(&self, x: &TimeSeries, y: &TimeSeries, close: bool) -> Vec<Signal> {
        let spread = match compute_spread(x, y, self.beta) {
            Ok(spread) => spread,
            Err(e) => {
                debug!(pair = format!("{}-{}", x.name(), y.name()), error = %e, "No spread, no signals");
                return Vec::new();
            }
        };
        let deviation = match compute_zscore(&spread, self.config.lookback) {
            Ok(deviation) => deviation,
            Err(e) => {
                debug!(error = %e, "No z-score, no signals");
                return Vec::new();
            }
        };

        let mut machine = self.machine();
        let mut signals = Vec::new();
        // last row with a z-score, and whether it fired
        let mut last_row = None;

        for (i, z) in deviation.zscores.iter().enumerate() {
            let Some(z) = *z else { continue };
            let side = machine.on_zscore(z);
            last_row = Some((i, z, side.is_some()));
            if let Some(side) = side {
                signals.push(Signal {
                    timestamp: spread.timestamps[i],
                    side,
                    price_x: spread.x[i],
                    price_y: spread.y[i],
                    zscore: z,
                });
            }
        }

        if close {
            match last_row {
                Some((i, _, true)) if machine.position() != Position::Flat => {
                    warn!(
                        pair = format!("{}-{}", x.name(), y.name()),
                        timestamp = %spread.timestamps[i],
                        position = %machine.position(),
                        "Entry on the last row, position left open"
                    );
                }
                Some((i, z, _)) => {
                    if let Some(side) = machine.flatten() {
                        signals.push(Signal {
                            timestamp: spread.timestamps[i],
                            side,
                            price_x: spread.x[i],
                            price_y: spread.y[i],
                            zscore: z,
                        });
                    }
                }
                None => {}
            }
        }

        debug!(
            pair = format!("{}-{}", x.name(), y.name()),
            rows = spread.len(),
            defined = deviation.defined(),
            signals = signals.len(),
            "Signals generated"
        );
        signals
    }
}

/// Row-at-a-time signal generation sharing the batch semantics.
#[derive(Debug, Clone)]
pub struct SignalStream {
    beta: f64,
    rolling: RollingZScore,
    machine: SignalStateMachine,
    last: Option<(DateTime<Utc>, f64, f64, f64)>,
    last_fired: bool,
}

impl SignalStream {
    /// Feed one aligned price pair. Rows with missing prices are ignored.
    pub fn push(&mut self, timestamp: DateTime<Utc>, price_x: f64, price_y: f64) -> Option<Signal> {
        if !price_x.is_finite() || !price_y.is_finite() {
            return None;
        }
        let z = self.rolling.push(price_y - self.beta * price_x)?;
        self.last = Some((timestamp, price_x, price_y, z));
        let side = self.machine.on_zscore(z);
        self.last_fired = side.is_some();
        side.map(|side| Signal {
            timestamp,
            side,
            price_x,
            price_y,
            zscore: z,
        })
    }

    pub fn position(&self) -> Position {
        self.machine.position()
    }

    /// Close an open position at the last row that had a z-score.
    ///
    /// Signals stay strictly ordered by timestamp, so a position opened on
    /// that same row is left open.
    pub fn close(&mut self) -> Option<Signal> {
        let (timestamp, price_x, price_y, zscore) = self.last?;
        if self.last_fired {
            return None;
        }
        let side = self.machine.flatten()?;
        Some(Signal {
            timestamp,
            side,
            price_x,
            price_y,
            zscore,
        })
    }
}

/// One-shot signal generation.
///
/// Fails only on invalid parameters; degenerate data yields no signals.
pub fn generate_signals(
    x: &TimeSeries,
    y: &TimeSeries,
    beta: f64,
    lookback: usize,
    entry_zscore: f64,
    exit_zscore: f64,
) -> Result<Vec<Signal>, AnalysisError> {
    let config = PairStrategyConfig {
        lookback,
        entry_zscore,
        exit_zscore,
    };
    Ok(PairStrategy::new(beta, config)?.generate_signals(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{daily, day, noise, random_walk};

    /// `level ± 0.1`; every rolling z-score stays near ±1.
    fn alternating(level: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| if i % 2 == 0 { level + 0.1 } else { level - 0.1 })
            .collect()
    }

    fn sides(machine: &mut SignalStateMachine, zs: &[f64]) -> Vec<(usize, SignalSide)> {
        zs.iter()
            .enumerate()
            .filter_map(|(i, z)| machine.on_zscore(*z).map(|s| (i, s)))
            .collect()
    }

    #[test]
    fn test_reference_sequence() {
        let mut machine = SignalStateMachine::new(2.0, 0.5);
        let out = sides(&mut machine, &[0.0, 0.0, 3.1, 0.2, -3.2, 0.1]);
        assert_eq!(
            out,
            vec![
                (2, SignalSide::EnterShortSpread),
                (3, SignalSide::Exit),
                (4, SignalSide::EnterLongSpread),
                (5, SignalSide::Exit),
            ]
        );
        assert_eq!(machine.position(), Position::Flat);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut machine = SignalStateMachine::new(2.0, 0.5);
        assert_eq!(machine.on_zscore(2.0), None);
        assert_eq!(machine.on_zscore(-2.0), None);
        assert_eq!(machine.on_zscore(2.0 + 1e-9), Some(SignalSide::EnterShortSpread));
        assert_eq!(machine.on_zscore(0.5), None);
        assert_eq!(machine.on_zscore(-0.5), None);
        assert_eq!(machine.on_zscore(0.49), Some(SignalSide::Exit));
    }

    #[test]
    fn test_no_flip_without_exit() {
        let mut machine = SignalStateMachine::new(2.0, 0.5);
        let out = sides(&mut machine, &[3.0, -3.0, 3.0]);
        assert_eq!(out, vec![(0, SignalSide::EnterShortSpread)]);
        assert_eq!(machine.position(), Position::ShortSpread);
    }

    #[test]
    fn test_flatten() {
        let mut machine = SignalStateMachine::new(2.0, 0.5);
        assert_eq!(machine.flatten(), None);
        machine.on_zscore(-2.5);
        assert_eq!(machine.flatten(), Some(SignalSide::Exit));
        assert_eq!(machine.position(), Position::Flat);
    }

    #[test]
    fn test_builder_validation() {
        assert!(PairStrategyConfig::builder().build().is_ok());
        assert!(PairStrategyConfig::builder().lookback(1).build().is_err());
        assert!(PairStrategyConfig::builder().entry_zscore(0.0).build().is_err());
        assert!(PairStrategyConfig::builder()
            .entry_zscore(1.0)
            .exit_zscore(1.0)
            .build()
            .is_err());
        assert!(PairStrategyConfig::builder().exit_zscore(-0.1).build().is_err());
        assert!(PairStrategyConfig::builder().entry_zscore(f64::NAN).build().is_err());
    }

    #[test]
    fn test_non_finite_beta_rejected() {
        assert!(matches!(
            PairStrategy::new(f64::INFINITY, PairStrategyConfig::default()),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_spike_produces_round_trip() {
        // alternating spread with one excursion above and a return to the mean
        let mut y = alternating(100.0, 60);
        y[40] += 5.0;
        let x = vec![50.0; 60];
        let signals = generate_signals(&daily("X", &x), &daily("Y", &y), 1.0, 20, 2.0, 0.5).unwrap();

        assert_eq!(signals[0].side, SignalSide::EnterShortSpread);
        assert_eq!(signals[0].timestamp, day(40));
        assert_eq!(signals[0].price_y, y[40]);
        assert!(signals.iter().skip(1).any(|s| s.side == SignalSide::Exit));
    }

    #[test]
    fn test_degenerate_data_yields_empty() {
        let strategy = PairStrategy::new(1.0, PairStrategyConfig::default()).unwrap();
        // shorter than the lookback
        let x = daily("X", &[1.0, 2.0, 3.0]);
        let y = daily("Y", &[2.0, 1.0, 3.0]);
        assert!(strategy.generate_signals(&x, &y).is_empty());
        // constant spread: z undefined everywhere
        let flat = daily("F", &[1.0; 40]);
        assert!(strategy.generate_signals(&flat, &flat).is_empty());
    }

    #[test]
    fn test_invalid_parameters_error() {
        let x = daily("X", &[1.0, 2.0, 3.0]);
        assert!(matches!(
            generate_signals(&x, &x, 1.0, 20, 1.0, 2.0),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_stream_matches_batch() {
        let x = random_walk(31, 200);
        let y: Vec<f64> = x.iter().zip(noise(32, 200)).map(|(x, e)| 1.3 * x + e).collect();
        let (sx, sy) = (daily("X", &x), daily("Y", &y));
        let strategy = PairStrategy::new(1.3, PairStrategyConfig::default()).unwrap();

        let batch = strategy.generate_signals_closed(&sx, &sy);
        let mut stream = strategy.stream();
        let mut streamed: Vec<Signal> = sx
            .observations()
            .iter()
            .zip(sy.observations())
            .filter_map(|(a, b)| stream.push(a.timestamp, a.value, b.value))
            .collect();
        streamed.extend(stream.close());

        assert_eq!(batch, streamed);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_closed_variant_exits_after_last_entry() {
        // level shift on the last two rows: entry on row 38, still extended on row 39
        let mut y = alternating(10.0, 40);
        y[38] += 3.0;
        y[39] += 3.0;
        let x = vec![1.0; 40];
        let strategy = PairStrategy::new(0.0, PairStrategyConfig::default()).unwrap();
        let open = strategy.generate_signals(&daily("X", &x), &daily("Y", &y));
        let closed = strategy.generate_signals_closed(&daily("X", &x), &daily("Y", &y));

        assert_eq!(open.last().map(|s| (s.side, s.timestamp)), Some((SignalSide::EnterShortSpread, day(38))));
        assert_eq!(closed.len(), open.len() + 1);
        let last = closed[closed.len() - 1];
        assert_eq!(last.side, SignalSide::Exit);
        assert_eq!(last.timestamp, day(39));
    }

    #[test]
    fn test_entry_on_last_row_is_not_closed() {
        let mut y = alternating(10.0, 40);
        y[39] += 3.0;
        let x = vec![1.0; 40];
        let strategy = PairStrategy::new(0.0, PairStrategyConfig::default()).unwrap();
        let open = strategy.generate_signals(&daily("X", &x), &daily("Y", &y));
        let closed = strategy.generate_signals_closed(&daily("X", &x), &daily("Y", &y));

        assert_eq!(open.last().map(|s| (s.side, s.timestamp)), Some((SignalSide::EnterShortSpread, day(39))));
        assert_eq!(closed, open);
        assert!(closed.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        let mut stream = strategy.stream();
        for (i, (px, py)) in x.iter().zip(&y).enumerate() {
            stream.push(day(i), *px, *py);
        }
        assert_eq!(stream.close(), None);
        assert_eq!(stream.position(), Position::ShortSpread);
    }

    #[test]
    fn test_flat_inexact_spread_emits_nothing() {
        let x = daily("X", &[0.0; 10]);
        let y = daily("Y", &[0.1; 10]);
        assert!(generate_signals(&x, &y, 1.0, 3, 0.5, 0.1).unwrap().is_empty());
    }
}
