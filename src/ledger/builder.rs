//! Ledger line assembly shared by the sales and purchase builders

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::config::AccountMapping;
use crate::tax::TaxLine;
use crate::types::*;

/// Builds balanced ledger sets from resolved invoices
///
/// Sales and purchase postings live in their own modules as separate
/// `impl LedgerBuilder` blocks.
#[derive(Debug, Clone, Default)]
pub struct LedgerBuilder {
    pub(crate) accounts: AccountMapping,
}

impl LedgerBuilder {
    /// Create a builder posting to the given accounts
    pub fn new(accounts: AccountMapping) -> Self {
        Self { accounts }
    }

    pub fn accounts(&self) -> &AccountMapping {
        &self.accounts
    }
}

/// Collects the lines of one voucher in emission order
#[derive(Debug)]
pub(crate) struct VoucherBuilder {
    voucher_type: VoucherType,
    voucher_no: String,
    posting_date: NaiveDate,
    lines: Vec<LedgerLine>,
}

impl VoucherBuilder {
    pub(crate) fn new(voucher_type: VoucherType, voucher_no: &str, posting_date: NaiveDate) -> Self {
        Self {
            voucher_type,
            voucher_no: voucher_no.to_string(),
            posting_date,
            lines: Vec::new(),
        }
    }

    /// Add a line on the given side
    pub(crate) fn entry(
        mut self,
        entry_type: EntryType,
        account: &str,
        amount: BigDecimal,
        against: Option<&str>,
        remarks: String,
    ) -> Self {
        let (debit, credit) = match entry_type {
            EntryType::Debit => (amount, BigDecimal::from(0)),
            EntryType::Credit => (BigDecimal::from(0), amount),
        };

        self.lines.push(LedgerLine {
            account: account.to_string(),
            debit,
            credit,
            against: against.map(str::to_string),
            posting_date: self.posting_date,
            voucher_type: self.voucher_type,
            voucher_no: self.voucher_no.clone(),
            remarks,
            is_cancelled: false,
        });
        self
    }

    pub(crate) fn debit(
        self,
        account: &str,
        amount: BigDecimal,
        against: Option<&str>,
        remarks: String,
    ) -> Self {
        self.entry(EntryType::Debit, account, amount, against, remarks)
    }

    pub(crate) fn credit(
        self,
        account: &str,
        amount: BigDecimal,
        against: Option<&str>,
        remarks: String,
    ) -> Self {
        self.entry(EntryType::Credit, account, amount, against, remarks)
    }

    /// Post a signed tax amount: positive on `positive_side`, negative on the other
    pub(crate) fn tax(
        self,
        positive_side: EntryType,
        account: &str,
        tax_amount: &BigDecimal,
        remarks: String,
    ) -> Self {
        let zero = BigDecimal::from(0);
        if *tax_amount == zero {
            return self;
        }

        if *tax_amount > zero {
            self.entry(positive_side, account, tax_amount.clone(), None, remarks)
        } else {
            self.entry(positive_side.opposite(), account, tax_amount.abs(), None, remarks)
        }
    }

    /// Post one computed tax row, remarked "<description> on <invoice>"
    pub(crate) fn tax_row(self, positive_side: EntryType, tax: &TaxLine, invoice_name: &str) -> Self {
        let description = match tax.description.trim() {
            "" => "Tax",
            text => text,
        };
        let remarks = format!("{description} on {invoice_name}");
        self.tax(positive_side, &tax.account_head, &tax.tax_amount, remarks)
    }

    /// Total the lines and reject the voucher if it does not balance
    pub(crate) fn build(self) -> PostingResult<LedgerSet> {
        LedgerSet::from_lines(self.lines)
    }
}
