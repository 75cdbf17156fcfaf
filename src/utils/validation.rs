//! Validation utilities run before posting

use bigdecimal::BigDecimal;

use crate::discount;
use crate::ledger::{PurchaseInvoice, SalesInvoice};
use crate::tax::TaxLine;
use crate::types::*;
use crate::utils::money::within_tolerance;

/// Check discount inputs without resolving them
pub fn validate_discount_input(
    subtotal: &BigDecimal,
    discount_percentage: Option<&BigDecimal>,
    discount_amount: Option<&BigDecimal>,
) -> PostingResult<()> {
    let zero = BigDecimal::from(0);
    discount::check_bounds(
        subtotal,
        discount_percentage.unwrap_or(&zero),
        discount_amount.unwrap_or(&zero),
    )
}

/// Grand total must equal net total plus the signed tax amounts
fn validate_grand_total(
    net_total: &BigDecimal,
    taxes: &[TaxLine],
    grand_total: &BigDecimal,
) -> PostingResult<()> {
    let total_taxes: BigDecimal = taxes.iter().map(|t| &t.tax_amount).sum();
    let expected = net_total + total_taxes;

    if within_tolerance(&expected, grand_total) {
        Ok(())
    } else {
        Err(PostingError::GrandTotalMismatch {
            expected,
            actual: grand_total.clone(),
        })
    }
}

/// Validate a sales invoice before it is handed to the ledger builder
pub fn validate_sales_invoice(invoice: &SalesInvoice) -> PostingResult<()> {
    invoice.check_required()?;
    validate_grand_total(&invoice.net_total, &invoice.taxes, &invoice.grand_total)
}

/// Validate a purchase invoice before it is handed to the ledger builder
pub fn validate_purchase_invoice(invoice: &PurchaseInvoice) -> PostingResult<()> {
    invoice.check_required()?;
    validate_grand_total(&invoice.net_total, &invoice.taxes, &invoice.grand_total)
}
