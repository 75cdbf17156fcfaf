//! Discount resolution for invoices
//!
//! An invoice may carry a discount as a percentage, as a fixed amount, or
//! both. A positive amount always wins; the percentage is then derived from
//! it. Each returned field is rounded to two decimals on its own, so the
//! percentage may not cross-multiply exactly to the amount after rounding.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::money::{is_positive, percent_of, round_money};

/// Canonical discount for one invoice revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountResult {
    pub discount_amount: BigDecimal,
    pub discount_percentage: BigDecimal,
    /// Subtotal after discount, never negative
    pub net_total: BigDecimal,
}

impl DiscountResult {
    /// Resolve a percentage and/or fixed-amount discount against a subtotal
    pub fn resolve(
        subtotal: &BigDecimal,
        discount_percentage: Option<&BigDecimal>,
        discount_amount: Option<&BigDecimal>,
    ) -> PostingResult<Self> {
        let zero = BigDecimal::from(0);
        let percentage = discount_percentage.unwrap_or(&zero);
        let amount = discount_amount.unwrap_or(&zero);

        check_bounds(subtotal, percentage, amount)?;

        let (raw_amount, raw_percentage) = if is_positive(amount) {
            let derived = (amount / subtotal) * BigDecimal::from(100);
            (amount.clone(), derived)
        } else if is_positive(percentage) {
            (percent_of(percentage, subtotal), percentage.clone())
        } else {
            (zero.clone(), zero.clone())
        };

        let discount_amount = round_money(&raw_amount);
        let net_total = round_money(&(subtotal - &discount_amount));

        Ok(Self {
            discount_amount,
            discount_percentage: round_money(&raw_percentage),
            net_total,
        })
    }

    /// No discount on the given subtotal
    pub fn none(subtotal: &BigDecimal) -> Self {
        Self {
            discount_amount: round_money(&BigDecimal::from(0)),
            discount_percentage: round_money(&BigDecimal::from(0)),
            net_total: round_money(subtotal),
        }
    }

    pub fn has_discount(&self) -> bool {
        is_positive(&self.discount_amount)
    }
}

/// Reject inputs `resolve` cannot accept, without computing anything
pub(crate) fn check_bounds(
    subtotal: &BigDecimal,
    percentage: &BigDecimal,
    amount: &BigDecimal,
) -> PostingResult<()> {
    let zero = BigDecimal::from(0);
    let hundred = BigDecimal::from(100);

    if !is_positive(subtotal) {
        return Err(PostingError::InvalidAmount {
            field: "subtotal",
            value: subtotal.clone(),
        });
    }

    if *percentage < zero || *percentage > hundred {
        return Err(PostingError::InvalidRange {
            field: "discount_percentage",
            row: None,
            value: percentage.clone(),
            min: zero,
            max: hundred,
        });
    }

    if *amount < zero || amount > subtotal {
        return Err(PostingError::InvalidRange {
            field: "discount_amount",
            row: None,
            value: amount.clone(),
            min: zero,
            max: subtotal.clone(),
        });
    }

    Ok(())
}
