//! Execution Sink
//!
//! Capability interface for turning market orders into receipts. Only a
//! paper implementation ships; [`SignalRouter`] maps strategy signals onto
//! per-leg orders.

pub mod paper;
pub mod router;

pub use paper::PaperExecutor;
pub use router::{LegQuantities, SignalRouter};

use crate::logging::TradeRecord;
use crate::types::OrderSide;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by executors and the signal router
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    /// The executor refused the order (bad symbol, non-positive size, ...)
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// Signal does not fit the open legs (entry while open, exit while flat)
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The executor could not be reached
    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OrderStatus {
    Submitted,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Submitted => write!(f, "submitted"),
        }
    }
}

/// Acknowledgement of an accepted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub status: OrderStatus,
    pub trade: TradeRecord,
}

/// Something that accepts market orders
#[async_trait]
pub trait Executor: Send + Sync {
    async fn submit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderReceipt, ExecutionError>;
}

// --- Time Abstraction ---

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
