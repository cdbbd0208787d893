//! Shared rounding rules for monetary and percentage values.
//!
//! Everything rounds half away from zero. Banker's rounding would drift
//! totals by fractions of a cent and break exact reconciliation against
//! published figures.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary value to cents.
pub fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage quote to two decimal places.
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to whole units (progress percentage points).
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
