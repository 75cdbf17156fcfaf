//! Monetary rounding and tolerance helpers

use bigdecimal::{BigDecimal, RoundingMode};

/// Number of decimal places every returned monetary field carries
pub const MONEY_SCALE: i64 = 2;

/// Maximum absolute difference still treated as equal (one minor unit)
pub fn tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), MONEY_SCALE)
}

/// Round a value to two decimals, half away from zero
pub fn round_money(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

/// `true` when `|a - b| < 0.01`
pub fn within_tolerance(a: &BigDecimal, b: &BigDecimal) -> bool {
    (a - b).abs() < tolerance()
}

/// `true` when the value is strictly greater than zero
pub fn is_positive(amount: &BigDecimal) -> bool {
    *amount > BigDecimal::from(0)
}

/// `rate` percent of `base`, unrounded
pub fn percent_of(rate: &BigDecimal, base: &BigDecimal) -> BigDecimal {
    (rate * base) / BigDecimal::from(100)
}
