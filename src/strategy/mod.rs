//! Spread construction and signal generation for a single pair.
//!
//! [`spread`] turns two aligned series and a hedge ratio into a spread and
//! its rolling z-score; [`pairs`] walks the z-score through a position state
//! machine and emits entry/exit [`Signal`]s.

pub mod pairs;
pub mod spread;

pub use pairs::{
    generate_signals, PairStrategy, PairStrategyConfig, PairStrategyConfigBuilder,
    SignalStateMachine, SignalStream,
};
pub use spread::{compute_spread, compute_zscore, DeviationSeries, RollingZScore, Spread};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a signal asks the position to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSide {
    /// Buy y, sell x (spread is unusually low)
    EnterLongSpread,
    /// Sell y, buy x (spread is unusually high)
    EnterShortSpread,
    /// Close whatever is open
    Exit,
}

impl std::fmt::Display for SignalSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalSide::EnterLongSpread => write!(f, "enter_long_spread"),
            SignalSide::EnterShortSpread => write!(f, "enter_short_spread"),
            SignalSide::Exit => write!(f, "exit"),
        }
    }
}

/// Position held in the spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Position {
    #[default]
    Flat,
    LongSpread,
    ShortSpread,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Flat => write!(f, "Flat"),
            Position::LongSpread => write!(f, "LongSpread"),
            Position::ShortSpread => write!(f, "ShortSpread"),
        }
    }
}

/// A position change at one timestamp, with the prices and z-score that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub side: SignalSide,
    pub price_x: f64,
    pub price_y: f64,
    pub zscore: f64,
}
