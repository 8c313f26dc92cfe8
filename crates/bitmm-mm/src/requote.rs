//! Quote change detection (hysteresis against cancel/replace churn).

use rust_decimal::Decimal;

use crate::config::MakerConfig;
use crate::order_manager::LiveOrderSet;

/// True when the live quotes no longer reflect `theo`/`position`.
///
/// Always true when nothing is live, so the first cycle always quotes.
pub fn update_required(
    theo: Decimal,
    position: Decimal,
    live: &LiveOrderSet,
    config: &MakerConfig,
) -> bool {
    !live.has_orders
        || (theo - live.last_theo).abs() >= config.min_theo_change
        || (position - live.last_position).abs() >= config.min_position_change
}
