//! Signal-to-order routing for one pair.
//!
//! | Signal | Leg y | Leg x |
//! |---|---|---|
//! | enter_long_spread | buy | sell |
//! | enter_short_spread | sell | buy |
//! | exit | reverse of entry | reverse of entry |
//!
//! Sizes are supplied by the caller on entry and reused on exit.

use super::{ExecutionError, Executor, OrderReceipt};
use crate::logging::TradeRecorder;
use crate::strategy::{Position, Signal, SignalSide};
use crate::types::OrderSide;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Order size for each leg of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegQuantities {
    pub x: Decimal,
    pub y: Decimal,
}

#[derive(Debug, Clone)]
struct OpenLeg {
    symbol: String,
    side: OrderSide,
    quantity: Decimal,
}

/// Translates signals for `(symbol_x, symbol_y)` into market orders.
pub struct SignalRouter<E> {
    executor: Arc<E>,
    symbol_x: String,
    symbol_y: String,
    recorder: Option<Arc<dyn TradeRecorder>>,
    position: Position,
    open_legs: Vec<OpenLeg>,
}

impl<E: Executor> SignalRouter<E> {
    pub fn new(executor: Arc<E>, symbol_x: impl Into<String>, symbol_y: impl Into<String>) -> Self {
        Self {
            executor,
            symbol_x: symbol_x.into(),
            symbol_y: symbol_y.into(),
            recorder: None,
            position: Position::Flat,
            open_legs: Vec::new(),
        }
    }

    /// Journal every accepted order, tagged with the pair and signal.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn TradeRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn position(&self) -> Position {
        self.position
    }

    fn pair_label(&self) -> String {
        format!("{}/{}", self.symbol_x, self.symbol_y)
    }

    /// Submit the orders for `signal`. `quantities` is only read on entries.
    ///
    /// If an entry fails halfway the filled leg stays open, so the next exit
    /// unwinds it.
    pub async fn route(
        &mut self,
        signal: &Signal,
        quantities: LegQuantities,
    ) -> Result<Vec<OrderReceipt>, ExecutionError> {
        match signal.side {
            SignalSide::EnterLongSpread | SignalSide::EnterShortSpread => {
                self.enter(signal, quantities).await
            }
            SignalSide::Exit => self.exit(signal).await,
        }
    }

    async fn enter(
        &mut self,
        signal: &Signal,
        quantities: LegQuantities,
    ) -> Result<Vec<OrderReceipt>, ExecutionError> {
        if self.position != Position::Flat || !self.open_legs.is_empty() {
            return Err(ExecutionError::InvalidTransition(format!(
                "{} while {} on {}",
                signal.side,
                self.position,
                self.pair_label()
            )));
        }
        if quantities.x <= Decimal::ZERO || quantities.y <= Decimal::ZERO {
            return Err(ExecutionError::Rejected(format!(
                "leg quantities must be positive, got x={} y={}",
                quantities.x, quantities.y
            )));
        }

        let (y_side, position) = if signal.side == SignalSide::EnterLongSpread {
            (OrderSide::Buy, Position::LongSpread)
        } else {
            (OrderSide::Sell, Position::ShortSpread)
        };
        let legs = [
            OpenLeg {
                symbol: self.symbol_y.clone(),
                side: y_side,
                quantity: quantities.y,
            },
            OpenLeg {
                symbol: self.symbol_x.clone(),
                side: y_side.opposite(),
                quantity: quantities.x,
            },
        ];

        let mut receipts = Vec::with_capacity(legs.len());
        for leg in legs {
            let receipt = self.submit(&leg, signal.side).await?;
            self.open_legs.push(leg);
            self.position = position;
            receipts.push(receipt);
        }

        info!(
            pair = %self.pair_label(),
            signal = %signal.side,
            zscore = format!("{:.3}", signal.zscore),
            "Spread position opened"
        );
        Ok(receipts)
    }

    async fn exit(&mut self, signal: &Signal) -> Result<Vec<OrderReceipt>, ExecutionError> {
        if self.open_legs.is_empty() {
            return Err(ExecutionError::InvalidTransition(format!(
                "exit with no open legs on {}",
                self.pair_label()
            )));
        }

        let mut receipts = Vec::with_capacity(self.open_legs.len());
        while let Some(leg) = self.open_legs.first().cloned() {
            let unwind = OpenLeg {
                side: leg.side.opposite(),
                ..leg
            };
            let receipt = self.submit(&unwind, SignalSide::Exit).await?;
            self.open_legs.remove(0);
            receipts.push(receipt);
        }
        self.position = Position::Flat;

        info!(
            pair = %self.pair_label(),
            zscore = format!("{:.3}", signal.zscore),
            "Spread position closed"
        );
        Ok(receipts)
    }

    async fn submit(
        &self,
        leg: &OpenLeg,
        signal: SignalSide,
    ) -> Result<OrderReceipt, ExecutionError> {
        let receipt = match self
            .executor
            .submit_order(&leg.symbol, leg.side, leg.quantity)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(
                    pair = %self.pair_label(),
                    symbol = %leg.symbol,
                    side = %leg.side,
                    error = %e,
                    open_legs = self.open_legs.len(),
                    "Leg order failed"
                );
                return Err(e);
            }
        };

        if let Some(recorder) = &self.recorder {
            let trade = receipt
                .trade
                .clone()
                .with_pair(self.pair_label())
                .with_signal(signal);
            if let Err(e) = recorder.record(&trade).await {
                warn!(trade_id = %trade.trade_id, error = %e, "Failed to journal trade");
            }
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::PaperExecutor;
    use crate::types::test_support::day;
    use rust_decimal_macros::dec;

    fn signal(side: SignalSide) -> Signal {
        Signal {
            timestamp: day(0),
            side,
            price_x: 50.0,
            price_y: 100.0,
            zscore: 2.5,
        }
    }

    fn qty() -> LegQuantities {
        LegQuantities {
            x: dec!(20),
            y: dec!(10),
        }
    }

    #[tokio::test]
    async fn test_long_spread_buys_y_sells_x_and_exit_reverses() {
        let executor = Arc::new(PaperExecutor::new());
        let mut router = SignalRouter::new(Arc::clone(&executor), "X", "Y");

        router
            .route(&signal(SignalSide::EnterLongSpread), qty())
            .await
            .unwrap();
        assert_eq!(router.position(), Position::LongSpread);

        // exit quantities are ignored
        let unused = LegQuantities {
            x: dec!(1),
            y: dec!(1),
        };
        router.route(&signal(SignalSide::Exit), unused).await.unwrap();
        assert_eq!(router.position(), Position::Flat);

        let trades: Vec<_> = executor
            .trades()
            .into_iter()
            .map(|t| (t.symbol, t.side, t.quantity))
            .collect();
        assert_eq!(
            trades,
            vec![
                ("Y".to_string(), OrderSide::Buy, dec!(10)),
                ("X".to_string(), OrderSide::Sell, dec!(20)),
                ("Y".to_string(), OrderSide::Sell, dec!(10)),
                ("X".to_string(), OrderSide::Buy, dec!(20)),
            ]
        );
    }

    #[tokio::test]
    async fn test_short_spread_sells_y_buys_x() {
        let executor = Arc::new(PaperExecutor::new());
        let mut router = SignalRouter::new(Arc::clone(&executor), "X", "Y");
        let receipts = router
            .route(&signal(SignalSide::EnterShortSpread), qty())
            .await
            .unwrap();
        assert_eq!(receipts[0].trade.side, OrderSide::Sell);
        assert_eq!(receipts[1].trade.side, OrderSide::Buy);
        assert_eq!(router.position(), Position::ShortSpread);
    }

    #[tokio::test]
    async fn test_invalid_transitions() {
        let executor = Arc::new(PaperExecutor::new());
        let mut router = SignalRouter::new(Arc::clone(&executor), "X", "Y");

        assert!(matches!(
            router.route(&signal(SignalSide::Exit), qty()).await,
            Err(ExecutionError::InvalidTransition(_))
        ));

        router
            .route(&signal(SignalSide::EnterShortSpread), qty())
            .await
            .unwrap();
        assert!(matches!(
            router.route(&signal(SignalSide::EnterLongSpread), qty()).await,
            Err(ExecutionError::InvalidTransition(_))
        ));
        assert_eq!(executor.trades().len(), 2);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected_before_submitting() {
        let executor = Arc::new(PaperExecutor::new());
        let mut router = SignalRouter::new(Arc::clone(&executor), "X", "Y");
        let bad = LegQuantities {
            x: dec!(0),
            y: dec!(5),
        };
        assert!(matches!(
            router.route(&signal(SignalSide::EnterLongSpread), bad).await,
            Err(ExecutionError::Rejected(_))
        ));
        assert!(executor.trades().is_empty());
        assert_eq!(router.position(), Position::Flat);
    }
}
