//! Trade Recording System
//!
//! Provides a pluggable `TradeRecorder` trait for recording simulated fills:
//! - CSV (paper-trading journal)
//! - tracing (structured logs)

use crate::strategy::SignalSide;
use crate::types::OrderSide;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for trade recording operations
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A single order as submitted to an executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Unique trade identifier
    pub trade_id: String,
    /// Submission time
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: OrderSide,
    /// Order size in units of `symbol`
    pub quantity: Decimal,
    /// Pair label ("X/Y") when the order is one leg of a spread trade
    pub pair: Option<String>,
    /// Signal that caused the order
    pub signal: Option<SignalSide>,
    /// Whether this is a paper trade
    pub is_paper: bool,
}

impl TradeRecord {
    /// Create a new trade record with explicit timestamp (deterministic).
    pub fn with_timestamp(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        is_paper: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            trade_id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            symbol: symbol.into(),
            side,
            quantity,
            pair: None,
            signal: None,
            is_paper,
        }
    }

    /// Tag the record with the pair it belongs to
    #[must_use]
    pub fn with_pair(mut self, pair: impl Into<String>) -> Self {
        self.pair = Some(pair.into());
        self
    }

    /// Tag the record with the signal that caused it
    #[must_use]
    pub fn with_signal(mut self, signal: SignalSide) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Format as CSV line
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{}",
            self.trade_id,
            self.timestamp.to_rfc3339(),
            self.symbol,
            self.side,
            self.quantity,
            self.pair.as_deref().unwrap_or(""),
            self.signal.map(|s| s.to_string()).unwrap_or_default(),
            self.is_paper,
        )
    }

    /// CSV header
    pub fn csv_header() -> &'static str {
        "trade_id,timestamp,symbol,side,quantity,pair,signal,is_paper"
    }
}

/// Trait for recording trades to various backends
#[async_trait]
pub trait TradeRecorder: Send + Sync {
    /// Record a trade. Implementations should be non-blocking.
    async fn record(&self, trade: &TradeRecord) -> Result<(), RecordError>;

    /// Flush any buffered records (optional, default no-op)
    async fn flush(&self) -> Result<(), RecordError> {
        Ok(())
    }
}

/// A recorder that fans out to multiple backends
pub struct MultiRecorder {
    recorders: Vec<Box<dyn TradeRecorder>>,
}

impl MultiRecorder {
    /// Create a new multi-recorder with the given backends
    pub fn new(recorders: Vec<Box<dyn TradeRecorder>>) -> Self {
        Self { recorders }
    }

    /// Add a recorder
    pub fn add(&mut self, recorder: Box<dyn TradeRecorder>) {
        self.recorders.push(recorder);
    }
}

#[async_trait]
impl TradeRecorder for MultiRecorder {
    async fn record(&self, trade: &TradeRecord) -> Result<(), RecordError> {
        let mut error_count = 0;
        let mut last_error = None;

        for recorder in &self.recorders {
            if let Err(e) = recorder.record(trade).await {
                tracing::error!(error = %e, "Failed to record trade to backend");
                last_error = Some(e);
                error_count += 1;
            }
        }

        // Only fail when every backend failed
        if error_count > 0 && error_count == self.recorders.len() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(())
    }

    async fn flush(&self) -> Result<(), RecordError> {
        for recorder in &self.recorders {
            recorder.flush().await?;
        }
        Ok(())
    }
}
