//! Request authentication for the Bitfinex v1 API.
//!
//! Payload = JSON request object, base64 encoded.
//! Signature = hex(HMAC-SHA384(payload, api_secret)).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha384;
use zeroize::Zeroizing;

use crate::error::{ExchangeError, ExchangeResult};

type HmacSha384 = Hmac<Sha384>;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "BITFINEX_KEY";
/// Environment variable holding the API secret.
pub const API_SECRET_ENV: &str = "BITFINEX_SECRET";

/// API key pair. The secret is wiped from memory on drop.
pub struct Credentials {
    api_key: String,
    api_secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        }
    }

    /// Load credentials from `BITFINEX_KEY` / `BITFINEX_SECRET`.
    ///
    /// Missing variables yield empty credentials; public endpoints still
    /// work and authenticated calls are rejected by the exchange.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(API_KEY_ENV).unwrap_or_default(),
            std::env::var(API_SECRET_ENV).unwrap_or_default(),
        )
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_secret(&self) -> bool {
        !self.api_secret.is_empty()
    }

    /// Sign a base64 payload.
    pub fn sign(&self, payload_b64: &str) -> ExchangeResult<String> {
        let mut mac = HmacSha384::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| ExchangeError::Transport(format!("Invalid API secret: {e}")))?;
        mac.update(payload_b64.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Strictly increasing nonce generator (microseconds since epoch).
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next nonce: the current clock, or `last + 1` if the clock has not advanced.
    pub fn next(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_micros().max(0) as u64;
        let mut current = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(current + 1);
            match self
                .last
                .compare_exchange(current, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Authenticated request body: `{"request": path, "nonce": "...", ...params}`.
#[derive(Debug, Serialize)]
pub(crate) struct SignedRequest<'a, P: Serialize> {
    pub request: &'a str,
    pub nonce: String,
    #[serde(flatten)]
    pub params: P,
}

/// Encode a request body as the base64 payload header value.
pub(crate) fn encode_payload<P: Serialize>(request: &SignedRequest<'_, P>) -> ExchangeResult<String> {
    let json = serde_json::to_vec(request)
        .map_err(|e| ExchangeError::Decode(format!("Failed to encode request: {e}")))?;
    Ok(BASE64.encode(json))
}
