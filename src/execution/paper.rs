//! In-memory paper executor

use super::{Clock, ExecutionError, Executor, OrderReceipt, OrderStatus, SystemClock};
use crate::logging::TradeRecord;
use crate::types::OrderSide;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Accepts every well-formed order and keeps it in memory.
#[derive(Debug)]
pub struct PaperExecutor {
    clock: Arc<dyn Clock>,
    trades: Mutex<Vec<TradeRecord>>,
}

impl Default for PaperExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            trades: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of every order submitted so far, in submission order.
    pub fn trades(&self) -> Vec<TradeRecord> {
        self.trades
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Executor for PaperExecutor {
    async fn submit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderReceipt, ExecutionError> {
        if symbol.is_empty() {
            return Err(ExecutionError::Rejected("empty symbol".to_string()));
        }
        if quantity <= Decimal::ZERO {
            return Err(ExecutionError::Rejected(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }

        let trade = TradeRecord::with_timestamp(symbol, side, quantity, true, self.clock.now());
        info!(
            trade_id = %trade.trade_id,
            symbol = %symbol,
            side = %side,
            quantity = %quantity,
            "Paper order submitted"
        );
        self.trades
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(trade.clone());

        Ok(OrderReceipt {
            status: OrderStatus::Submitted,
            trade,
        })
    }
}
