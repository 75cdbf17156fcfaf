//! Traits for the host-facing seams: ledger storage and the posting gateway

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{CancellationOutcome, PurchaseInvoice, SalesInvoice};
use crate::types::*;

/// Storage abstraction for posted ledger lines
///
/// The engine never persists anything itself. A host implements this trait on
/// top of its own storage and is responsible for making each call atomic.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persist a freshly posted set of lines as one batch
    async fn save_lines(&mut self, lines: &[LedgerLine]) -> PostingResult<Uuid>;

    /// All lines of a voucher that have not been cancelled
    async fn active_lines(&self, voucher: &VoucherRef) -> PostingResult<Vec<LedgerLine>>;

    /// Persist reversal lines and mark the voucher's originals cancelled, in one step
    async fn save_reversal(
        &mut self,
        voucher: &VoucherRef,
        reversal_lines: &[LedgerLine],
    ) -> PostingResult<Uuid>;

    /// Lines posted to an account within a date range
    async fn account_lines(
        &self,
        account: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> PostingResult<Vec<LedgerLine>>;

    /// Net `debit - credit` of an account as of a date (all dates when `None`)
    async fn account_balance(
        &self,
        account: &str,
        as_of_date: Option<NaiveDate>,
    ) -> PostingResult<BigDecimal>;
}

/// Invoice submitted by the host, in either direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "voucher_type")]
pub enum Invoice {
    #[serde(rename = "Sales Invoice")]
    Sales(SalesInvoice),
    #[serde(rename = "Purchase Invoice")]
    Purchase(PurchaseInvoice),
}

impl Invoice {
    pub fn voucher(&self) -> VoucherRef {
        match self {
            Invoice::Sales(invoice) => invoice.voucher(),
            Invoice::Purchase(invoice) => invoice.voucher(),
        }
    }
}

/// Who triggered a posting event, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingContext {
    pub actor: String,
    pub timestamp: NaiveDateTime,
}

impl PostingContext {
    pub fn new(actor: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            actor: actor.into(),
            timestamp,
        }
    }

    /// Calendar date of the event
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Document lifecycle entry points a host system calls into
#[async_trait]
pub trait PostingGateway: Send + Sync {
    /// Post the ledger lines for a submitted invoice
    async fn on_invoice_submitted(
        &mut self,
        invoice: &Invoice,
        ctx: &PostingContext,
    ) -> PostingResult<LedgerSet>;

    /// Reverse every active line of a cancelled invoice
    async fn on_invoice_cancelled(
        &mut self,
        voucher: &VoucherRef,
        ctx: &PostingContext,
    ) -> PostingResult<CancellationOutcome>;
}
