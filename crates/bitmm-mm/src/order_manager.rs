//! Order lifecycle management.
//!
//! Sole owner of the live order set. State machine per order set:
//!
//! ```text
//! Empty ──place──▶ Live ──cancel_all──▶ Cancelling ──confirmed──▶ Empty
//! ```
//!
//! Safety rules:
//! - New orders are never submitted while a cancel is unresolved
//! - Cancel-all is retried until the exchange confirms, with no cap
//! - A failed or partial submission leaves the set Empty; the accepted
//!   remainder is cancelled and the next cycle re-decides

use std::time::Duration;

use bitmm_core::{OrderId, OrderIntent};
use bitmm_exchange::DynExchange;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::MakerConfig;
use crate::error::{MakerError, MakerResult};
use crate::requote::update_required;
use crate::tiering::QuoteDecision;

/// Lifecycle state of the order set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderSetState {
    #[default]
    Empty,
    Live,
    Cancelling,
}

/// An order believed to be resting at the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveOrder {
    pub order_id: OrderId,
    pub intent: OrderIntent,
}

/// Cache of what is resting at the exchange. The exchange is the source
/// of truth; when `has_orders` is true every entry is believed live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveOrderSet {
    pub orders: Vec<LiveOrder>,
    /// Theo the live orders were priced from.
    pub last_theo: Decimal,
    /// Position the live orders were sized for.
    pub last_position: Decimal,
    pub has_orders: bool,
}

impl LiveOrderSet {
    fn clear(&mut self) {
        self.orders.clear();
        self.has_orders = false;
    }
}

/// Executes cancel-then-place transitions against the exchange.
pub struct OrderManager {
    exchange: DynExchange,
    symbol: String,
    config: MakerConfig,
    live: LiveOrderSet,
    state: OrderSetState,
}

impl OrderManager {
    pub fn new(exchange: DynExchange, symbol: impl Into<String>, config: MakerConfig) -> Self {
        Self {
            exchange,
            symbol: symbol.into(),
            config,
            live: LiveOrderSet::default(),
            state: OrderSetState::Empty,
        }
    }

    /// Read-only view of the live order set.
    pub fn live(&self) -> &LiveOrderSet {
        &self.live
    }

    pub fn state(&self) -> OrderSetState {
        self.state
    }

    /// Whether `decision` differs materially from what is live.
    pub fn needs_update(&self, decision: &QuoteDecision, position: Decimal) -> bool {
        update_required(decision.theo, position, &self.live, &self.config)
    }

    /// Replace the live orders with `decision.intents`.
    ///
    /// Cancels anything live first and blocks until the exchange confirms.
    /// Returns the number of orders now live. Submission is never retried
    /// within a call.
    pub async fn place(&mut self, decision: &QuoteDecision, position: Decimal) -> MakerResult<usize> {
        if self.state == OrderSetState::Live || self.live.has_orders {
            self.cancel_all().await;
        }

        if decision.intents.is_empty() {
            debug!(theo = %decision.theo, position = %position, "No orders to place");
            return Ok(0);
        }

        let requested = decision.intents.len();
        let acks = match self.exchange.submit_orders(&self.symbol, &decision.intents).await {
            Ok(acks) => acks,
            Err(e) => {
                warn!(error = %e, requested, "Order submission failed");
                if e.is_transport_like() {
                    // The request may have reached the exchange.
                    self.cancel_all().await;
                }
                return Err(MakerError::Exchange(e));
            }
        };

        let orders: Vec<LiveOrder> = decision
            .intents
            .iter()
            .zip(acks.iter())
            .filter_map(|(intent, ack)| {
                ack.order_id.map(|order_id| LiveOrder {
                    order_id,
                    intent: *intent,
                })
            })
            .collect();

        let accepted = orders.len();
        if accepted != requested {
            warn!(requested, accepted, "Exchange did not accept every order");
            if accepted > 0 {
                self.cancel_all().await;
            }
            return Err(MakerError::SubmissionRejected {
                requested,
                accepted,
            });
        }

        for order in &orders {
            info!(
                order_id = %order.order_id,
                side = %order.intent.side,
                size = %order.intent.size,
                price = %order.intent.price,
                "Order placed"
            );
        }

        self.live = LiveOrderSet {
            orders,
            last_theo: decision.theo,
            last_position: position,
            has_orders: true,
        };
        self.state = OrderSetState::Live;
        Ok(accepted)
    }

    /// Cancel every open order, retrying until the exchange confirms.
    ///
    /// Safe to call in any state. Returns the number of attempts made.
    pub async fn cancel_all(&mut self) -> u32 {
        self.state = OrderSetState::Cancelling;
        let delay = Duration::from_millis(self.config.cancel_retry_delay_ms);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let err = match self.exchange.cancel_all().await {
                Ok(true) => break,
                Ok(false) => MakerError::InconsistentCancel(
                    "exchange did not confirm cancellation".to_string(),
                ),
                Err(e) => MakerError::Exchange(e),
            };
            warn!(error = %err, attempt = attempts, "Cancel-all failed, retrying");
            tokio::time::sleep(delay).await;
        }

        if attempts > 1 || self.live.has_orders {
            info!(attempts, cancelled = self.live.orders.len(), "All orders cancelled");
        }
        self.live.clear();
        self.state = OrderSetState::Empty;
        attempts
    }

    /// Cancel everything before exit.
    pub async fn shutdown(&mut self) -> u32 {
        info!(live = self.live.orders.len(), "Shutting down order manager");
        self.cancel_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitmm_core::OrderSide;
    use bitmm_exchange::{ExchangeError, MockCall, MockExchange, OrderAck};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn config() -> MakerConfig {
        MakerConfig {
            cancel_retry_delay_ms: 0,
            ..Default::default()
        }
    }

    fn decision() -> QuoteDecision {
        QuoteDecision {
            theo: dec!(100),
            edge: dec!(0.10),
            intents: vec![
                OrderIntent::new(OrderSide::Buy, dec!(1.0), dec!(99.90)).unwrap(),
                OrderIntent::new(OrderSide::Sell, dec!(1.0), dec!(100.10)).unwrap(),
            ],
        }
    }

    fn manager(mock: &Arc<MockExchange>) -> OrderManager {
        OrderManager::new(mock.clone(), "btcusd", config())
    }

    #[tokio::test]
    async fn test_place_from_empty_submits_without_cancel() {
        let mock = Arc::new(MockExchange::new());
        let mut mgr = manager(&mock);

        let placed = mgr.place(&decision(), dec!(0)).await.unwrap();

        assert_eq!(placed, 2);
        assert_eq!(mgr.state(), OrderSetState::Live);
        assert!(mgr.live().has_orders);
        assert_eq!(mgr.live().last_theo, dec!(100));
        assert_eq!(mock.cancel_count(), 0);
        assert_eq!(mock.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_retried_until_success_before_submit() {
        let mock = Arc::new(MockExchange::new());
        let mut mgr = manager(&mock);
        mgr.place(&decision(), dec!(0)).await.unwrap();
        mock.clear_calls();

        mock.push_cancel(Err(ExchangeError::Transport("timeout".to_string())));
        mock.push_cancel(Ok(false));
        mock.push_cancel(Ok(true));

        mgr.place(&decision(), dec!(0.5)).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[..3].iter().all(|c| *c == MockCall::CancelAll));
        assert!(matches!(calls[3], MockCall::SubmitOrders(_)));
        assert_eq!(mgr.live().last_position, dec!(0.5));
    }

    #[tokio::test]
    async fn test_partial_acceptance_leaves_set_empty() {
        let mock = Arc::new(MockExchange::new());
        mock.push_submit(Ok(vec![OrderAck::accepted(OrderId(9)), OrderAck::rejected()]));
        let mut mgr = manager(&mock);

        let err = mgr.place(&decision(), dec!(0)).await.unwrap_err();

        assert!(matches!(
            err,
            MakerError::SubmissionRejected {
                requested: 2,
                accepted: 1
            }
        ));
        assert_eq!(mgr.state(), OrderSetState::Empty);
        assert!(!mgr.live().has_orders);
        // Safety cancel for the accepted remainder, no resubmission.
        assert_eq!(mock.cancel_count(), 1);
        assert_eq!(mock.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_orders_returned_is_failure() {
        let mock = Arc::new(MockExchange::new());
        mock.push_submit(Ok(Vec::new()));
        let mut mgr = manager(&mock);

        let err = mgr.place(&decision(), dec!(0)).await.unwrap_err();
        assert!(matches!(err, MakerError::SubmissionRejected { accepted: 0, .. }));
        assert!(!mgr.live().has_orders);
    }

    #[tokio::test]
    async fn test_transport_failure_on_submit_triggers_cancel() {
        let mock = Arc::new(MockExchange::new());
        mock.push_submit(Err(ExchangeError::Decode("truncated".to_string())));
        let mut mgr = manager(&mock);

        let err = mgr.place(&decision(), dec!(0)).await.unwrap_err();
        assert!(matches!(err, MakerError::Exchange(ExchangeError::Decode(_))));
        assert_eq!(mock.cancel_count(), 1);
        assert_eq!(mgr.state(), OrderSetState::Empty);
    }

    #[tokio::test]
    async fn test_rejection_on_submit_does_not_cancel() {
        let mock = Arc::new(MockExchange::new());
        mock.push_submit(Err(ExchangeError::Rejected("Invalid order".to_string())));
        let mut mgr = manager(&mock);

        assert!(mgr.place(&decision(), dec!(0)).await.is_err());
        assert_eq!(mock.cancel_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_intents_cancel_without_submit() {
        let mock = Arc::new(MockExchange::new());
        let mut mgr = manager(&mock);
        mgr.place(&decision(), dec!(0)).await.unwrap();
        mock.clear_calls();

        let empty = QuoteDecision {
            intents: Vec::new(),
            ..decision()
        };
        assert_eq!(mgr.place(&empty, dec!(0)).await.unwrap(), 0);
        assert_eq!(mock.calls(), vec![MockCall::CancelAll]);
        assert_eq!(mgr.state(), OrderSetState::Empty);
    }

    #[tokio::test]
    async fn test_needs_update_after_place() {
        let mock = Arc::new(MockExchange::new());
        let mut mgr = manager(&mock);
        assert!(mgr.needs_update(&decision(), dec!(0)));

        mgr.place(&decision(), dec!(0)).await.unwrap();
        assert!(!mgr.needs_update(&decision(), dec!(0)));
        assert!(mgr.needs_update(&decision(), dec!(0.2)));
    }

    #[tokio::test]
    async fn test_shutdown_counts_attempts() {
        let mock = Arc::new(MockExchange::new());
        mock.push_cancel(Ok(false));
        let mut mgr = manager(&mock);
        mgr.place(&decision(), dec!(0)).await.unwrap();

        assert_eq!(mgr.shutdown().await, 2);
        assert!(mgr.live().orders.is_empty());
    }
}
