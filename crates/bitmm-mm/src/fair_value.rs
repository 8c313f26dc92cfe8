//! Fair value (theo) and volatility from a recent trade window.

use bitmm_core::Trade;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::config::{MakerConfig, TheoWeighting};
use crate::error::{MakerError, MakerResult};

/// Minimum trades for a defined volatility, and so for a quote.
pub const MIN_TRADES_FOR_VOLATILITY: usize = 2;

/// Output of the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FairValue {
    /// Weighted average trade price.
    pub theo: Decimal,
    /// Scaled standard deviation of consecutive price differences.
    pub volatility: Decimal,
    /// Number of trades used.
    pub trades: usize,
}

/// Estimate theo and volatility from `trades` (newest first).
///
/// Fails with `InsufficientData` when fewer than two trades are available,
/// and with `NoVolume` when every trade has zero size.
pub fn estimate(trades: &[Trade], config: &MakerConfig) -> MakerResult<FairValue> {
    let newest = match trades {
        [newest, _, ..] => newest,
        _ => {
            return Err(MakerError::InsufficientData {
                needed: MIN_TRADES_FOR_VOLATILITY,
                got: trades.len(),
            })
        }
    };

    let mut weighted = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;
    for trade in trades {
        let weight = match config.theo_weighting {
            TheoWeighting::Volume => trade.size.abs(),
            TheoWeighting::VolumeRecency => {
                let age = Decimal::from((newest.timestamp - trade.timestamp).max(0));
                trade.size.abs() / (age + config.recency_half_life_secs)
            }
        };
        weighted += trade.price.inner() * weight;
        total_weight += weight;
    }

    if total_weight.is_zero() {
        return Err(MakerError::NoVolume {
            trades: trades.len(),
        });
    }

    Ok(FairValue {
        theo: weighted / total_weight,
        volatility: price_change_std_dev(trades) * config.volatility_multiplier,
        trades: trades.len(),
    })
}

/// Sample standard deviation of consecutive price differences.
fn price_change_std_dev(trades: &[Trade]) -> Decimal {
    let diffs: Vec<Decimal> = trades
        .windows(2)
        .map(|pair| pair[0].price.inner() - pair[1].price.inner())
        .collect();
    if diffs.len() < 2 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(diffs.len());
    let mean = diffs.iter().sum::<Decimal>() / n;
    let sum_sq: Decimal = diffs.iter().map(|d| (*d - mean) * (*d - mean)).sum();
    let variance = sum_sq / (n - Decimal::ONE);

    decimal_sqrt(variance)
}

/// Square root via f64 (the only lossy step in the estimator).
fn decimal_sqrt(value: Decimal) -> Decimal {
    let v = value.to_f64().unwrap_or(0.0);
    if v <= 0.0 {
        return Decimal::ZERO;
    }
    Decimal::from_f64(v.sqrt()).unwrap_or(Decimal::ZERO)
}
