//! Tracing-based Trade Recorder
//!
//! Emits one structured event per trade on the `trades` target.

use super::recorder::{RecordError, TradeRecord, TradeRecorder};
use async_trait::async_trait;
use tracing::info;

/// Recorder that emits structured tracing logs
pub struct TracingRecorder;

impl TracingRecorder {
    /// Create a new tracing recorder
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeRecorder for TracingRecorder {
    async fn record(&self, trade: &TradeRecord) -> Result<(), RecordError> {
        info!(
            target: "trades",
            trade_id = %trade.trade_id,
            timestamp = %trade.timestamp.to_rfc3339(),
            symbol = %trade.symbol,
            side = %trade.side,
            quantity = %trade.quantity,
            pair = trade.pair.as_deref().unwrap_or("-"),
            signal = trade.signal.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            is_paper = trade.is_paper,
            "Trade submitted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderSide;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_tracing_recorder_does_not_error() {
        let recorder = TracingRecorder::new();
        let trade = TradeRecord::with_timestamp("XOM", OrderSide::Sell, dec!(1.5), false, Utc::now());
        recorder.record(&trade).await.unwrap();
    }
}
