//! Scripted exchange for tests.
//!
//! Each operation pops its next result from a queue; once the queue is
//! drained the operation falls back to a benign default (empty data,
//! flat position, every order accepted, cancel succeeded). Every call is
//! recorded in order so tests can assert on sequencing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use bitmm_core::{OrderBook, OrderId, OrderIntent, Trade};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::error::ExchangeResult;
use crate::exchange::{BoxFuture, Exchange, OrderAck};

/// A call observed by [`MockExchange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    FetchTrades { count: usize },
    FetchOrderBook,
    FetchPosition,
    SubmitOrders(Vec<OrderIntent>),
    CancelAll,
}

#[derive(Debug, Default)]
struct Script {
    trades: VecDeque<ExchangeResult<Vec<Trade>>>,
    books: VecDeque<ExchangeResult<OrderBook>>,
    positions: VecDeque<ExchangeResult<Decimal>>,
    submits: VecDeque<ExchangeResult<Vec<OrderAck>>>,
    cancels: VecDeque<ExchangeResult<bool>>,
    /// Returned once `trades` drains.
    default_trades: Vec<Trade>,
    /// Returned once `positions` drains.
    default_position: Decimal,
}

/// Mock exchange for testing.
#[derive(Debug)]
pub struct MockExchange {
    script: Mutex<Script>,
    calls: Mutex<Vec<MockCall>>,
    next_order_id: AtomicU64,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExchange {
    /// Create a new mock exchange.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            calls: Mutex::new(Vec::new()),
            next_order_id: AtomicU64::new(1),
        }
    }

    /// Trades returned whenever no scripted trades result is queued.
    pub fn set_default_trades(&self, trades: Vec<Trade>) {
        self.script.lock().default_trades = trades;
    }

    /// Position returned whenever no scripted position result is queued.
    pub fn set_default_position(&self, position: Decimal) {
        self.script.lock().default_position = position;
    }

    pub fn push_trades(&self, result: ExchangeResult<Vec<Trade>>) {
        self.script.lock().trades.push_back(result);
    }

    pub fn push_order_book(&self, result: ExchangeResult<OrderBook>) {
        self.script.lock().books.push_back(result);
    }

    pub fn push_position(&self, result: ExchangeResult<Decimal>) {
        self.script.lock().positions.push_back(result);
    }

    pub fn push_submit(&self, result: ExchangeResult<Vec<OrderAck>>) {
        self.script.lock().submits.push_back(result);
    }

    pub fn push_cancel(&self, result: ExchangeResult<bool>) {
        self.script.lock().cancels.push_back(result);
    }

    /// Get recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Clear recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Number of `cancel_all` calls seen.
    pub fn cancel_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, MockCall::CancelAll))
            .count()
    }

    /// Every batch passed to `submit_orders`, in order.
    pub fn submitted(&self) -> Vec<Vec<OrderIntent>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                MockCall::SubmitOrders(intents) => Some(intents.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }

    fn accept_all(&self, intents: &[OrderIntent]) -> Vec<OrderAck> {
        intents
            .iter()
            .map(|_| {
                let id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
                OrderAck::accepted(OrderId(id))
            })
            .collect()
    }
}

impl Exchange for MockExchange {
    fn fetch_trades<'a>(
        &'a self,
        _symbol: &'a str,
        count: usize,
    ) -> BoxFuture<'a, ExchangeResult<Vec<Trade>>> {
        Box::pin(async move {
            self.record(MockCall::FetchTrades { count });
            let mut script = self.script.lock();
            match script.trades.pop_front() {
                Some(result) => result,
                None => Ok(script.default_trades.iter().take(count).cloned().collect()),
            }
        })
    }

    fn fetch_order_book<'a>(
        &'a self,
        _symbol: &'a str,
        _depth_bid: usize,
        _depth_ask: usize,
    ) -> BoxFuture<'a, ExchangeResult<OrderBook>> {
        Box::pin(async move {
            self.record(MockCall::FetchOrderBook);
            self.script
                .lock()
                .books
                .pop_front()
                .unwrap_or_else(|| Ok(OrderBook::default()))
        })
    }

    fn fetch_position<'a>(&'a self, _symbol: &'a str) -> BoxFuture<'a, ExchangeResult<Decimal>> {
        Box::pin(async move {
            self.record(MockCall::FetchPosition);
            let mut script = self.script.lock();
            match script.positions.pop_front() {
                Some(result) => result,
                None => Ok(script.default_position),
            }
        })
    }

    fn submit_orders<'a>(
        &'a self,
        _symbol: &'a str,
        intents: &'a [OrderIntent],
    ) -> BoxFuture<'a, ExchangeResult<Vec<OrderAck>>> {
        Box::pin(async move {
            self.record(MockCall::SubmitOrders(intents.to_vec()));
            let scripted = self.script.lock().submits.pop_front();
            match scripted {
                Some(result) => result,
                None => Ok(self.accept_all(intents)),
            }
        })
    }

    fn cancel_all(&self) -> BoxFuture<'_, ExchangeResult<bool>> {
        Box::pin(async move {
            self.record(MockCall::CancelAll);
            self.script.lock().cancels.pop_front().unwrap_or(Ok(true))
        })
    }
}
