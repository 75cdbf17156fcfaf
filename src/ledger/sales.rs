//! Sales invoice posting

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::discount::DiscountResult;
use crate::ledger::builder::{LedgerBuilder, VoucherBuilder};
use crate::tax::{TaxLine, TaxResult};
use crate::types::*;
use crate::utils::money::is_positive;

/// Fully resolved sales invoice, as handed over by the host document system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesInvoice {
    /// Invoice number, used as the voucher number
    pub name: String,
    pub customer: String,
    /// Display name of the customer; not used for posting
    #[serde(default)]
    pub customer_name: Option<String>,
    pub posting_date: NaiveDate,
    /// Total before discount
    pub total: BigDecimal,
    #[serde(default)]
    pub discount_amount: BigDecimal,
    #[serde(default)]
    pub discount_percentage: BigDecimal,
    /// Total after discount
    pub net_total: BigDecimal,
    #[serde(default)]
    pub taxes: Vec<TaxLine>,
    pub grand_total: BigDecimal,
}

impl SalesInvoice {
    /// Assemble an invoice from its identity and the calculator outputs
    pub fn assemble(
        name: impl Into<String>,
        customer: impl Into<String>,
        posting_date: NaiveDate,
        subtotal: &BigDecimal,
        discount: &DiscountResult,
        taxes: &TaxResult,
    ) -> Self {
        Self {
            name: name.into(),
            customer: customer.into(),
            customer_name: None,
            posting_date,
            total: subtotal.clone(),
            discount_amount: discount.discount_amount.clone(),
            discount_percentage: discount.discount_percentage.clone(),
            net_total: discount.net_total.clone(),
            taxes: taxes.taxes.clone(),
            grand_total: taxes.grand_total.clone(),
        }
    }

    /// Name, customer and a non-zero grand total must be present
    pub fn check_required(&self) -> PostingResult<()> {
        if self.name.trim().is_empty() {
            return Err(PostingError::MissingField("name"));
        }
        if self.customer.trim().is_empty() {
            return Err(PostingError::MissingField("customer"));
        }
        if self.grand_total == BigDecimal::from(0) {
            return Err(PostingError::MissingField("grand_total"));
        }
        Ok(())
    }

    pub fn voucher(&self) -> VoucherRef {
        VoucherRef::sales(self.name.clone())
    }
}

impl LedgerBuilder {
    /// Post a sales invoice
    ///
    /// Lines, in order: receivable debit for the grand total, discount debit
    /// (when discounted), revenue credit for the gross total, then one line per
    /// non-zero tax row. Added taxes are credited; deducted (withheld) taxes are
    /// debited.
    pub fn build_sales(
        &self,
        invoice: &SalesInvoice,
        posting_date: Option<NaiveDate>,
    ) -> PostingResult<LedgerSet> {
        invoice.check_required()?;

        let posting_date = posting_date.unwrap_or(invoice.posting_date);
        let name = invoice.name.as_str();
        let customer = Some(invoice.customer.as_str());
        let remarks = format!("Sales Invoice {name}");

        let mut voucher = VoucherBuilder::new(VoucherType::SalesInvoice, name, posting_date).debit(
            &self.accounts.receivable,
            invoice.grand_total.clone(),
            customer,
            remarks.clone(),
        );

        if is_positive(&invoice.discount_amount) {
            voucher = voucher.debit(
                &self.accounts.sales_discount,
                invoice.discount_amount.clone(),
                None,
                format!("Discount {}% on {name}", invoice.discount_percentage),
            );
        }

        voucher = voucher.credit(&self.accounts.revenue, invoice.total.clone(), customer, remarks);

        for tax in &invoice.taxes {
            voucher = voucher.tax_row(EntryType::Credit, tax, name);
        }

        voucher.build()
    }
}
