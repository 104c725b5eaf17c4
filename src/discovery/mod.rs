//! Pair Discovery Module
//!
//! Decides whether two series are cointegrated and, if so, with which hedge
//! ratio. [`scan_pairs`] applies the same test to every pair in a universe.
//!
//! # Example
//!
//! ```ignore
//! use pairpioneer::discovery::{PairSelector, SelectorConfig};
//!
//! let selector = PairSelector::new(SelectorConfig::default())?;
//! if let Some(pair) = selector.evaluate(&series_x, &series_y) {
//!     println!("p = {:.4}, beta = {:.4}", pair.p_value, pair.hedge_ratio);
//! }
//! ```

pub mod config;
pub mod scan;
pub mod selector;

pub use config::SelectorConfig;
pub use scan::{scan_pairs, CandidatePair};
pub use selector::{hedge_ratio, PairSelector, PairTestResult};
