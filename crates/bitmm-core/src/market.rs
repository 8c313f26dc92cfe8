//! Market data fetched each cycle.
//!
//! Trades drive the fair-value estimate; the order book is only
//! displayed.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Price, Size};

/// An executed trade reported by the exchange.
///
/// Windows of trades are ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Exchange-assigned, monotonically increasing trade id.
    pub sequence_id: u64,
    /// Exchange timestamp (unix seconds).
    pub timestamp: i64,
    /// Execution price.
    pub price: Price,
    /// Trade amount. Sign carries aggressor side on some venues; only the
    /// magnitude is used for weighting.
    pub size: Decimal,
}

impl Trade {
    pub fn new(sequence_id: u64, timestamp: i64, price: Decimal, size: Decimal) -> Self {
        Self {
            sequence_id,
            timestamp,
            price: Price::new(price),
            size,
        }
    }

    /// Exchange timestamp as UTC time, if representable.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.timestamp, 0).single()
    }
}

/// One price level of the order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Size,
}

impl BookLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self {
            price: Price::new(price),
            size: Size::new(size),
        }
    }
}

/// Order book snapshot.
///
/// Bids are sorted best (highest) first, asks best (lowest) first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    /// Mid price of the top of book, if both sides are present.
    pub fn mid_price(&self) -> Option<Price> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(Price::new((bid.price.inner() + ask.price.inner()) / Decimal::TWO))
    }
}
