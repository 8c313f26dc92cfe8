//! Bitfinex v1 REST client.
//!
//! Public endpoints (trades, book) are plain GETs; account endpoints
//! (positions, multi-order, cancel-all) are signed POSTs.

use std::time::Duration;

use bitmm_core::{BookLevel, OrderBook, OrderId, OrderIntent, OrderSide, Trade};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{encode_payload, Credentials, NonceSource, SignedRequest};
use crate::error::{ExchangeError, ExchangeResult};
use crate::exchange::{BoxFuture, Exchange, OrderAck};

/// Result strings the exchange uses for a complete cancel-all.
const CANCEL_ALL_OK: [&str; 2] = ["All orders cancelled", "None to cancel"];

/// Client settings.
#[derive(Debug, Clone)]
pub struct BitfinexConfig {
    /// API base URL, e.g. "https://api.bitfinex.com".
    pub base_url: String,
    /// Order type for quotes ("limit" on margin, "exchange limit" on spot).
    pub order_type: String,
    /// Routing venue field sent with every order.
    pub venue: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for BitfinexConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bitfinex.com".to_string(),
            order_type: "limit".to_string(),
            venue: "bitfinex".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    tid: u64,
    timestamp: i64,
    price: Decimal,
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct RawBookEntry {
    price: Decimal,
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct RawBook {
    #[serde(default)]
    bids: Vec<RawBookEntry>,
    #[serde(default)]
    asks: Vec<RawBookEntry>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    symbol: String,
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    #[serde(default)]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawMultiOrderResponse {
    #[serde(default)]
    order_ids: Vec<RawOrder>,
}

#[derive(Debug, Deserialize)]
struct RawCancellation {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Debug, Serialize)]
struct NoParams {}

#[derive(Debug, Serialize)]
struct NewOrderParams<'a> {
    symbol: &'a str,
    amount: Decimal,
    price: Decimal,
    exchange: &'a str,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'a str,
}

#[derive(Debug, Serialize)]
struct MultiOrderParams<'a> {
    orders: Vec<NewOrderParams<'a>>,
}

/// Decode a response body.
///
/// A `{"message": ...}` body is a rejection regardless of status. Any other
/// non-success status is a transport failure, and an undecodable success
/// body is a decode failure.
fn parse_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> ExchangeResult<T> {
    if let Ok(err) = serde_json::from_str::<ErrorMessage>(body) {
        return Err(ExchangeError::Rejected(err.message));
    }
    if !status.is_success() {
        return Err(ExchangeError::Transport(format!("HTTP {status}: {body}")));
    }
    serde_json::from_str::<T>(body).map_err(|e| ExchangeError::Decode(e.to_string()))
}

/// Map a multi-order response onto the submitted intents, in order.
fn acks_from_response(response: RawMultiOrderResponse, requested: usize) -> Vec<OrderAck> {
    (0..requested)
        .map(|i| match response.order_ids.get(i) {
            Some(order) if order.id != 0 => OrderAck::accepted(OrderId(order.id)),
            _ => OrderAck::rejected(),
        })
        .collect()
}

/// Client for the Bitfinex v1 REST API.
pub struct BitfinexClient {
    client: Client,
    config: BitfinexConfig,
    credentials: Credentials,
    nonces: NonceSource,
}

impl BitfinexClient {
    /// Create a new client.
    pub fn new(config: BitfinexConfig, credentials: Credentials) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ExchangeError::Transport(format!("Failed to create HTTP client: {e}")))?;

        if !credentials.has_secret() {
            warn!("No API secret configured, authenticated requests will be rejected");
        }
        info!(base_url = %config.base_url, order_type = %config.order_type, "Bitfinex client ready");

        Ok(Self {
            client,
            config,
            credentials,
            nonces: NonceSource::new(),
        })
    }

    /// Unauthenticated GET.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(format!("Failed to read body: {e}")))?;
        parse_response(status, &body)
    }

    /// Authenticated POST.
    async fn post<P: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        params: P,
    ) -> ExchangeResult<T> {
        let request = SignedRequest {
            request: path,
            nonce: self.nonces.next().to_string(),
            params,
        };
        let payload = encode_payload(&request)?;
        let signature = self.credentials.sign(&payload)?;

        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("X-BFX-APIKEY", self.credentials.api_key())
            .header("X-BFX-PAYLOAD", &payload)
            .header("X-BFX-SIGNATURE", signature)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(format!("Failed to read body: {e}")))?;
        parse_response(status, &body)
    }
}

impl Exchange for BitfinexClient {
    fn fetch_trades<'a>(
        &'a self,
        symbol: &'a str,
        count: usize,
    ) -> BoxFuture<'a, ExchangeResult<Vec<Trade>>> {
        Box::pin(async move {
            let path = format!("/v1/trades/{symbol}?limit_trades={count}");
            let raw: Vec<RawTrade> = self.get(&path).await?;
            let mut trades: Vec<Trade> = raw
                .into_iter()
                .map(|t| Trade::new(t.tid, t.timestamp, t.price, t.amount))
                .collect();
            // Newest first, regardless of how the venue orders them.
            trades.sort_by(|a, b| b.sequence_id.cmp(&a.sequence_id));
            debug!(symbol, count = trades.len(), "Fetched trades");
            Ok(trades)
        })
    }

    fn fetch_order_book<'a>(
        &'a self,
        symbol: &'a str,
        depth_bid: usize,
        depth_ask: usize,
    ) -> BoxFuture<'a, ExchangeResult<OrderBook>> {
        Box::pin(async move {
            let path = format!("/v1/book/{symbol}?limit_bids={depth_bid}&limit_asks={depth_ask}");
            let raw: RawBook = self.get(&path).await?;
            let to_levels = |entries: Vec<RawBookEntry>| {
                entries
                    .into_iter()
                    .map(|e| BookLevel::new(e.price, e.amount))
                    .collect()
            };
            Ok(OrderBook {
                bids: to_levels(raw.bids),
                asks: to_levels(raw.asks),
            })
        })
    }

    fn fetch_position<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, ExchangeResult<Decimal>> {
        Box::pin(async move {
            let positions: Vec<RawPosition> = self.post("/v1/positions", NoParams {}).await?;
            let position = positions
                .iter()
                .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
                .map(|p| p.amount)
                .unwrap_or(Decimal::ZERO);
            debug!(symbol, position = %position, "Fetched position");
            Ok(position)
        })
    }

    fn submit_orders<'a>(
        &'a self,
        symbol: &'a str,
        intents: &'a [OrderIntent],
    ) -> BoxFuture<'a, ExchangeResult<Vec<OrderAck>>> {
        Box::pin(async move {
            let orders = intents
                .iter()
                .map(|intent| NewOrderParams {
                    symbol,
                    amount: intent.size.inner(),
                    price: intent.price.inner(),
                    exchange: &self.config.venue,
                    side: intent.side,
                    order_type: &self.config.order_type,
                })
                .collect();
            let response: RawMultiOrderResponse = self
                .post("/v1/order/new/multi", MultiOrderParams { orders })
                .await?;
            Ok(acks_from_response(response, intents.len()))
        })
    }

    fn cancel_all(&self) -> BoxFuture<'_, ExchangeResult<bool>> {
        Box::pin(async move {
            let response: RawCancellation = self.post("/v1/order/cancel/all", NoParams {}).await?;
            let success = CANCEL_ALL_OK.contains(&response.result.as_str());
            if !success {
                warn!(result = %response.result, "Cancel-all not confirmed");
            }
            Ok(success)
        })
    }
}
