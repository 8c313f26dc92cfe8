//! Quoting engine configuration.

use bitmm_core::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How trades are weighted when computing theo.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TheoWeighting {
    /// Σ(price·|size|) / Σ|size|
    Volume,
    /// Weight = |size| / (age_from_newest + half_life): recent trades dominate.
    #[default]
    VolumeRecency,
}

/// Quoting engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Maximum order size per side, and the position cap.
    #[serde(default = "default_max_size")]
    pub max_size: Decimal,

    /// Minimum order size. Positions smaller than this count as flat.
    #[serde(default = "default_min_size")]
    pub min_size: Decimal,

    /// Floor for the volatility-scaled edge.
    #[serde(default = "default_min_edge")]
    pub min_edge: Decimal,

    /// Fraction of edge used for inventory-reducing orders, in (0, 1].
    #[serde(default = "default_exit_edge_factor")]
    pub exit_edge_factor: Decimal,

    /// Minimum theo move that triggers a requote.
    #[serde(default = "default_min_theo_change")]
    pub min_theo_change: Decimal,

    /// Minimum position change that triggers a requote.
    #[serde(default = "default_min_position_change")]
    pub min_position_change: Decimal,

    /// Number of recent trades used for theo and volatility.
    #[serde(default = "default_trade_window")]
    pub trade_window: usize,

    #[serde(default)]
    pub theo_weighting: TheoWeighting,

    /// Recency decay constant in seconds (volume_recency weighting only).
    #[serde(default = "default_recency_half_life_secs")]
    pub recency_half_life_secs: Decimal,

    /// Volatility is scaled by this before being used as edge.
    #[serde(default = "default_volatility_multiplier")]
    pub volatility_multiplier: Decimal,

    /// Price tick. Quote offsets from theo round up to it. Zero disables.
    #[serde(default = "default_price_tick")]
    pub price_tick: Decimal,

    /// Pause between cancel-all retries.
    #[serde(default = "default_cancel_retry_delay_ms")]
    pub cancel_retry_delay_ms: u64,
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            min_size: default_min_size(),
            min_edge: default_min_edge(),
            exit_edge_factor: default_exit_edge_factor(),
            min_theo_change: default_min_theo_change(),
            min_position_change: default_min_position_change(),
            trade_window: default_trade_window(),
            theo_weighting: TheoWeighting::default(),
            recency_half_life_secs: default_recency_half_life_secs(),
            volatility_multiplier: default_volatility_multiplier(),
            price_tick: default_price_tick(),
            cancel_retry_delay_ms: default_cancel_retry_delay_ms(),
        }
    }
}

impl MakerConfig {
    /// Reject configurations the engine cannot quote safely with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: String| -> Result<(), CoreError> { Err(CoreError::InvalidConfig(msg)) };

        if self.max_size <= Decimal::ZERO {
            return invalid(format!("max_size must be positive, got {}", self.max_size));
        }
        if self.min_size <= Decimal::ZERO {
            return invalid(format!("min_size must be positive, got {}", self.min_size));
        }
        if self.min_size >= self.max_size {
            return invalid(format!(
                "min_size ({}) must be below max_size ({})",
                self.min_size, self.max_size
            ));
        }
        if self.exit_edge_factor <= Decimal::ZERO || self.exit_edge_factor > Decimal::ONE {
            return invalid(format!(
                "exit_edge_factor must be in (0, 1], got {}",
                self.exit_edge_factor
            ));
        }
        for (name, value) in [
            ("min_edge", self.min_edge),
            ("min_theo_change", self.min_theo_change),
            ("min_position_change", self.min_position_change),
            ("volatility_multiplier", self.volatility_multiplier),
            ("price_tick", self.price_tick),
        ] {
            if value < Decimal::ZERO {
                return invalid(format!("{name} must not be negative, got {value}"));
            }
        }
        if self.trade_window < 2 {
            return invalid(format!(
                "trade_window must be at least 2, got {}",
                self.trade_window
            ));
        }
        if self.theo_weighting == TheoWeighting::VolumeRecency
            && self.recency_half_life_secs <= Decimal::ZERO
        {
            return invalid(format!(
                "recency_half_life_secs must be positive, got {}",
                self.recency_half_life_secs
            ));
        }
        Ok(())
    }
}

fn default_max_size() -> Decimal {
    Decimal::ONE
}
fn default_min_size() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
fn default_min_edge() -> Decimal {
    Decimal::new(10, 2) // 0.10
}
fn default_exit_edge_factor() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_min_theo_change() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
fn default_min_position_change() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_trade_window() -> usize {
    30
}
fn default_recency_half_life_secs() -> Decimal {
    Decimal::new(30, 0)
}
fn default_volatility_multiplier() -> Decimal {
    Decimal::ONE
}
fn default_price_tick() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_cancel_retry_delay_ms() -> u64 {
    1000
}
