//! Order-related types and identifiers.
//!
//! Provides order side, exchange order IDs and the `OrderIntent` value
//! the tiering policy emits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::{Price, Size};

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Exchange-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single order the engine wants resting at the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub side: OrderSide,
    pub size: Size,
    pub price: Price,
}

impl OrderIntent {
    /// Create an intent, rejecting non-positive sizes and prices.
    pub fn new(side: OrderSide, size: Decimal, price: Decimal) -> Result<Self> {
        if size <= Decimal::ZERO {
            return Err(CoreError::InvalidSize(format!("{side} size {size} is not positive")));
        }
        if price <= Decimal::ZERO {
            return Err(CoreError::InvalidPrice(format!("{side} price {price} is not positive")));
        }
        Ok(Self {
            side,
            size: Size::new(size),
            price: Price::new(price),
        })
    }

    /// Reflect this intent across `theo`: flip the side and mirror the price.
    pub fn mirrored(&self, theo: Decimal) -> Self {
        Self {
            side: self.side.opposite(),
            size: self.size,
            price: Price::new(theo * Decimal::TWO - self.price.inner()),
        }
    }
}

impl fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {}", self.side, self.size, self.price)
    }
}
