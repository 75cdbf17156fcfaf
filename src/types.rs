//! Core types and data structures for the posting engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::money::{round_money, within_tolerance};

/// Types of entries in double-entry bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Debit entry - increases Assets and Expenses, decreases Liabilities, Equity, and Income
    Debit,
    /// Credit entry - increases Liabilities, Equity, and Income, decreases Assets and Expenses
    Credit,
}

impl EntryType {
    /// The opposite side of the entry
    pub fn opposite(self) -> Self {
        match self {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
        }
    }
}

/// Kind of document a set of ledger lines was posted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoucherType {
    #[serde(rename = "Sales Invoice")]
    SalesInvoice,
    #[serde(rename = "Purchase Invoice")]
    PurchaseInvoice,
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoucherType::SalesInvoice => write!(f, "Sales Invoice"),
            VoucherType::PurchaseInvoice => write!(f, "Purchase Invoice"),
        }
    }
}

/// Identity of one posting event (`voucher_type` + `voucher_no`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoucherRef {
    pub voucher_type: VoucherType,
    pub voucher_no: String,
}

impl VoucherRef {
    pub fn new(voucher_type: VoucherType, voucher_no: impl Into<String>) -> Self {
        Self {
            voucher_type,
            voucher_no: voucher_no.into(),
        }
    }

    pub fn sales(voucher_no: impl Into<String>) -> Self {
        Self::new(VoucherType::SalesInvoice, voucher_no)
    }

    pub fn purchase(voucher_no: impl Into<String>) -> Self {
        Self::new(VoucherType::PurchaseInvoice, voucher_no)
    }
}

impl fmt::Display for VoucherRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.voucher_type, self.voucher_no)
    }
}

/// A single general-ledger line
///
/// Well-formed output carries exactly one non-zero side. Lines read back from
/// a host system may carry both sides; the reversal engine tolerates that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Account head the line is posted to
    pub account: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    /// Counterparty (customer or supplier), when the line is party-facing
    pub against: Option<String>,
    pub posting_date: NaiveDate,
    pub voucher_type: VoucherType,
    pub voucher_no: String,
    pub remarks: String,
    /// Set on reversal lines and on originals a host has marked as cancelled
    pub is_cancelled: bool,
}

impl LedgerLine {
    /// Signed effect of the line on its account (`debit - credit`)
    pub fn net(&self) -> BigDecimal {
        &self.debit - &self.credit
    }

    pub fn voucher(&self) -> VoucherRef {
        VoucherRef::new(self.voucher_type, self.voucher_no.clone())
    }
}

/// An ordered, balanced set of ledger lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSet {
    pub lines: Vec<LedgerLine>,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    pub is_balanced: bool,
}

impl LedgerSet {
    /// Total the lines and refuse the set unless debits equal credits within 0.01
    pub fn from_lines(lines: Vec<LedgerLine>) -> PostingResult<Self> {
        let total_debit: BigDecimal = lines.iter().map(|l| &l.debit).sum();
        let total_credit: BigDecimal = lines.iter().map(|l| &l.credit).sum();

        if !within_tolerance(&total_debit, &total_credit) {
            return Err(PostingError::UnbalancedLedger {
                total_debit,
                total_credit,
            });
        }

        Ok(Self {
            lines,
            total_debit: round_money(&total_debit),
            total_credit: round_money(&total_credit),
            is_balanced: true,
        })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Residual balance left on one account after original + reversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResidual {
    pub account: String,
    pub balance: BigDecimal,
}

impl fmt::Display for AccountResidual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.account, self.balance)
    }
}

fn join_residuals(residuals: &[AccountResidual]) -> String {
    residuals
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_row(row: &Option<usize>) -> String {
    match row {
        Some(idx) => format!(" (tax row {idx})"),
        None => String::new(),
    }
}

/// Errors that can occur while posting or reversing an invoice
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PostingError {
    #[error("Invalid amount: {field} must be greater than 0, got {value}")]
    InvalidAmount { field: &'static str, value: BigDecimal },
    #[error("Out of range: {field}{} must be between {min} and {max}, got {value}", describe_row(.row))]
    InvalidRange {
        field: &'static str,
        row: Option<usize>,
        value: BigDecimal,
        min: BigDecimal,
        max: BigDecimal,
    },
    #[error("Missing field: {0} is required")]
    MissingField(&'static str),
    #[error("Ledger not balanced: debit = {total_debit}, credit = {total_credit}")]
    UnbalancedLedger {
        total_debit: BigDecimal,
        total_credit: BigDecimal,
    },
    #[error("Missing input: {0}")]
    MissingInput(String),
    #[error("Net effect is not zero: {}", join_residuals(.residuals))]
    NetEffectMismatch { residuals: Vec<AccountResidual> },
    #[error("Grand total mismatch: expected {expected}, got {actual}")]
    GrandTotalMismatch {
        expected: BigDecimal,
        actual: BigDecimal,
    },
    #[error("Nothing to cancel for {0}")]
    NothingToCancel(VoucherRef),
    #[error("{0} is already posted")]
    AlreadyPosted(VoucherRef),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PostingError {
    /// Tax rate outside `[0, 100]` on the given row
    pub fn invalid_rate(row: usize, rate: &BigDecimal) -> Self {
        PostingError::InvalidRange {
            field: "rate",
            row: Some(row),
            value: rate.clone(),
            min: BigDecimal::from(0),
            max: BigDecimal::from(100),
        }
    }
}

/// Result type for posting operations
pub type PostingResult<T> = Result<T, PostingError>;
