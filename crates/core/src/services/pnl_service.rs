use crate::models::trade::Direction;

/// Price delta → pips-equivalent, assuming 5-digit pricing and 1 lot = 100k units.
pub const PIP_MULTIPLIER: f64 = 100_000.0;

/// Profit/loss of a position in pips-equivalent units:
///
/// ```text
/// (exit - entry) × sign(direction) × size × 100_000
/// ```
///
/// Returns `None` unless entry, exit and size are all present, finite and
/// non-zero. Zero is treated as "not entered": form inputs default empty
/// numeric fields to 0, so a zero size or price never yields a pnl. NaN and
/// infinities never yield one either.
#[must_use]
pub fn calculate_pnl(
    direction: Direction,
    entry_price: Option<f64>,
    exit_price: Option<f64>,
    position_size: Option<f64>,
) -> Option<f64> {
    let entry = entry_price.filter(|v| is_entered(*v))?;
    let exit = exit_price.filter(|v| is_entered(*v))?;
    let size = position_size.filter(|v| is_entered(*v))?;

    let price_diff = (exit - entry) * direction.sign();
    Some(price_diff * size * PIP_MULTIPLIER)
}

fn is_entered(value: f64) -> bool {
    value.is_finite() && value != 0.0
}
