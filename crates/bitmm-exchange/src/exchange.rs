//! Exchange capability trait.
//!
//! Abstracts the four remote operations the quoting engine depends on,
//! allowing for:
//! - Unit testing with the scripted [`crate::MockExchange`]
//! - Swapping the venue without touching the engine
//!
//! Authentication is entirely internal to implementations.

use std::pin::Pin;
use std::sync::Arc;

use bitmm_core::{OrderBook, OrderId, OrderIntent, Trade};
use rust_decimal::Decimal;

use crate::error::ExchangeResult;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Per-order result of a batch submission, in request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAck {
    /// Exchange order ID when the order was accepted.
    pub order_id: Option<OrderId>,
}

impl OrderAck {
    pub fn accepted(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
        }
    }

    pub fn rejected() -> Self {
        Self { order_id: None }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.order_id.is_some()
    }
}

/// Trait for the remote operations of a single-instrument market maker.
pub trait Exchange: Send + Sync {
    /// Fetch the `count` most recent trades, newest first.
    fn fetch_trades<'a>(
        &'a self,
        symbol: &'a str,
        count: usize,
    ) -> BoxFuture<'a, ExchangeResult<Vec<Trade>>>;

    /// Fetch the order book to the requested depth on each side.
    fn fetch_order_book<'a>(
        &'a self,
        symbol: &'a str,
        depth_bid: usize,
        depth_ask: usize,
    ) -> BoxFuture<'a, ExchangeResult<OrderBook>>;

    /// Fetch the signed position in `symbol` (zero if flat or not found).
    fn fetch_position<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, ExchangeResult<Decimal>>;

    /// Submit all intents as a single multi-order request.
    ///
    /// Returns one ack per intent, in request order.
    fn submit_orders<'a>(
        &'a self,
        symbol: &'a str,
        intents: &'a [OrderIntent],
    ) -> BoxFuture<'a, ExchangeResult<Vec<OrderAck>>>;

    /// Cancel every open order. `Ok(false)` means the exchange did not
    /// confirm a complete cancellation.
    fn cancel_all(&self) -> BoxFuture<'_, ExchangeResult<bool>>;
}

/// Arc wrapper for Exchange trait objects.
pub type DynExchange = Arc<dyn Exchange>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_ack_properties() {
        assert!(OrderAck::accepted(OrderId(7)).is_accepted());
        assert!(!OrderAck::rejected().is_accepted());
    }
}
