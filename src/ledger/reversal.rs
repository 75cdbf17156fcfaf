//! Reversal of posted ledger lines on cancellation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;
use crate::utils::money::{round_money, tolerance};

/// Prefix marking the remarks of a reversal line
pub const REVERSAL_PREFIX: &str = "Reversal: ";

/// Mirror every line with debit and credit swapped
///
/// Reversal lines are dated `cancellation_date`; without one, each line keeps
/// the posting date of the line it reverses.
pub fn reverse(
    original_lines: &[LedgerLine],
    cancellation_date: Option<NaiveDate>,
) -> PostingResult<LedgerSet> {
    if original_lines.is_empty() {
        return Err(PostingError::MissingInput(
            "original ledger lines are required".to_string(),
        ));
    }

    let lines = original_lines
        .iter()
        .map(|line| LedgerLine {
            account: line.account.clone(),
            debit: line.credit.clone(),
            credit: line.debit.clone(),
            against: line.against.clone(),
            posting_date: cancellation_date.unwrap_or(line.posting_date),
            voucher_type: line.voucher_type,
            voucher_no: line.voucher_no.clone(),
            remarks: format!("{REVERSAL_PREFIX}{}", line.remarks),
            is_cancelled: true,
        })
        .collect();

    LedgerSet::from_lines(lines)
}

/// Per-account outcome of checking original + reversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetZeroReport {
    pub is_valid: bool,
    /// Combined `debit - credit` per account, rounded
    pub per_account_balance: BTreeMap<String, BigDecimal>,
    pub errors: Vec<String>,
    /// Accounts left with a residual of at least 0.01
    pub residuals: Vec<AccountResidual>,
}

impl NetZeroReport {
    /// Turn a failed report into `NetEffectMismatch`
    pub fn into_result(self) -> PostingResult<Self> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(PostingError::NetEffectMismatch {
                residuals: self.residuals,
            })
        }
    }
}

/// Check that original and reversal cancel out on every account
///
/// This also catches reversals built from a different (stale or partial) set
/// of lines than the ones passed in as the original.
pub fn verify_net_zero(original_lines: &[LedgerLine], reversal_lines: &[LedgerLine]) -> NetZeroReport {
    let mut balances: BTreeMap<String, BigDecimal> = BTreeMap::new();

    for line in original_lines.iter().chain(reversal_lines) {
        *balances
            .entry(line.account.clone())
            .or_insert_with(|| BigDecimal::from(0)) += line.net();
    }

    let residuals: Vec<AccountResidual> = balances
        .iter()
        .filter(|(_, balance)| balance.abs() >= tolerance())
        .map(|(account, balance)| AccountResidual {
            account: account.clone(),
            balance: round_money(balance),
        })
        .collect();

    let errors = residuals
        .iter()
        .map(|r| format!("Account {} has non-zero net balance: {}", r.account, r.balance))
        .collect();

    NetZeroReport {
        is_valid: residuals.is_empty(),
        per_account_balance: balances
            .into_iter()
            .map(|(account, balance)| (account, round_money(&balance)))
            .collect(),
        errors,
        residuals,
    }
}

/// Result of a cancellation attempt; failures carry no reversal lines
#[derive(Debug, Clone, PartialEq)]
pub enum CancellationOutcome {
    Cancelled {
        message: String,
        reversal: LedgerSet,
        verification: NetZeroReport,
    },
    Failed {
        message: String,
        error: PostingError,
    },
}

impl CancellationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CancellationOutcome::Cancelled { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            CancellationOutcome::Cancelled { message, .. } => message,
            CancellationOutcome::Failed { message, .. } => message,
        }
    }

    /// The reversal set on success, the failure reason otherwise
    pub fn into_result(self) -> PostingResult<(LedgerSet, NetZeroReport)> {
        match self {
            CancellationOutcome::Cancelled {
                reversal,
                verification,
                ..
            } => Ok((reversal, verification)),
            CancellationOutcome::Failed { error, .. } => Err(error),
        }
    }
}

/// Reverse the lines of an invoice and verify the reversal nets to zero
pub fn cancel_with_reversal(
    invoice_id: &str,
    invoice_type: VoucherType,
    original_lines: &[LedgerLine],
    cancellation_date: Option<NaiveDate>,
) -> CancellationOutcome {
    let reversal = match reverse(original_lines, cancellation_date) {
        Ok(reversal) => reversal,
        Err(error) => {
            return CancellationOutcome::Failed {
                message: format!("Cancellation failed: {error}"),
                error,
            }
        }
    };

    match verify_net_zero(original_lines, &reversal.lines).into_result() {
        Ok(verification) => CancellationOutcome::Cancelled {
            message: format!("{invoice_type} {invoice_id} cancelled successfully"),
            reversal,
            verification,
        },
        Err(error) => CancellationOutcome::Failed {
            message: "Cancellation verification failed".to_string(),
            error,
        },
    }
}
