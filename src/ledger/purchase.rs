//! Purchase invoice posting

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::discount::DiscountResult;
use crate::ledger::builder::{LedgerBuilder, VoucherBuilder};
use crate::tax::{TaxLine, TaxResult};
use crate::types::*;
use crate::utils::money::round_money;

/// Received item line, used for stock valuation only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub item_code: String,
    pub qty: BigDecimal,
    #[serde(default)]
    pub rate: BigDecimal,
}

/// Fully resolved purchase invoice, as handed over by the host document system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseInvoice {
    pub name: String,
    pub supplier: String,
    pub posting_date: NaiveDate,
    /// Total before discount
    pub total: BigDecimal,
    #[serde(default)]
    pub discount_amount: BigDecimal,
    /// Total after discount; this is the capitalized inventory cost
    pub net_total: BigDecimal,
    #[serde(default)]
    pub taxes: Vec<TaxLine>,
    pub grand_total: BigDecimal,
    #[serde(default)]
    pub items: Vec<PurchaseItem>,
}

impl PurchaseInvoice {
    /// Assemble an invoice from its identity and the calculator outputs
    pub fn assemble(
        name: impl Into<String>,
        supplier: impl Into<String>,
        posting_date: NaiveDate,
        subtotal: &BigDecimal,
        discount: &DiscountResult,
        taxes: &TaxResult,
        items: Vec<PurchaseItem>,
    ) -> Self {
        Self {
            name: name.into(),
            supplier: supplier.into(),
            posting_date,
            total: subtotal.clone(),
            discount_amount: discount.discount_amount.clone(),
            net_total: discount.net_total.clone(),
            taxes: taxes.taxes.clone(),
            grand_total: taxes.grand_total.clone(),
            items,
        }
    }

    /// Name, supplier and a non-zero grand total must be present
    pub fn check_required(&self) -> PostingResult<()> {
        if self.name.trim().is_empty() {
            return Err(PostingError::MissingField("name"));
        }
        if self.supplier.trim().is_empty() {
            return Err(PostingError::MissingField("supplier"));
        }
        if self.grand_total == BigDecimal::from(0) {
            return Err(PostingError::MissingField("grand_total"));
        }
        Ok(())
    }

    pub fn voucher(&self) -> VoucherRef {
        VoucherRef::purchase(self.name.clone())
    }

    /// Post-discount cost per received unit; zero when nothing was received
    pub fn valuation_rate(&self) -> BigDecimal {
        let total_qty: BigDecimal = self.items.iter().map(|item| &item.qty).sum();
        if total_qty == BigDecimal::from(0) {
            return round_money(&BigDecimal::from(0));
        }
        round_money(&(&self.net_total / &total_qty))
    }
}

impl LedgerBuilder {
    /// Post a purchase invoice
    ///
    /// The discount has no line of its own: it is already folded into the
    /// inventory debit for the net total. Added taxes are debited as input-tax
    /// assets, deducted taxes are credited, and the payable is credited for
    /// the grand total.
    pub fn build_purchase(
        &self,
        invoice: &PurchaseInvoice,
        posting_date: Option<NaiveDate>,
    ) -> PostingResult<LedgerSet> {
        invoice.check_required()?;

        let posting_date = posting_date.unwrap_or(invoice.posting_date);
        let name = invoice.name.as_str();
        let remarks = format!("Purchase Invoice {name}");

        let mut voucher = VoucherBuilder::new(VoucherType::PurchaseInvoice, name, posting_date)
            .debit(
                &self.accounts.inventory,
                invoice.net_total.clone(),
                None,
                remarks.clone(),
            );

        for tax in &invoice.taxes {
            voucher = voucher.tax_row(EntryType::Debit, tax, name);
        }

        voucher
            .credit(
                &self.accounts.payable,
                invoice.grand_total.clone(),
                Some(invoice.supplier.as_str()),
                remarks,
            )
            .build()
    }
}
