//! Posting service: the gateway a host calls at submit and cancel time

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::config::PostingConfig;
use crate::ledger::{cancel_with_reversal, CancellationOutcome, LedgerBuilder};
use crate::tax::TaxCalculator;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{validate_purchase_invoice, validate_sales_invoice};

/// Validates, posts and reverses invoices against a ledger store
pub struct PostingService<S: LedgerStore> {
    store: S,
    builder: LedgerBuilder,
    taxes: TaxCalculator,
}

impl<S: LedgerStore> PostingService<S> {
    /// Create a service posting to the default chart of accounts
    pub fn new(store: S) -> Self {
        Self::with_config(store, PostingConfig::default())
    }

    /// Create a service from configuration
    ///
    /// Configured tax templates are registered on top of the standard ones.
    pub fn try_with_config(store: S, config: PostingConfig) -> PostingResult<Self> {
        let mut taxes = TaxCalculator::with_standard_templates(&config.accounts);
        for template in config.tax_templates {
            taxes.register_template(template)?;
        }

        Ok(Self {
            store,
            builder: LedgerBuilder::new(config.accounts),
            taxes,
        })
    }

    /// Like [`PostingService::try_with_config`], skipping invalid templates with a warning
    pub fn with_config(store: S, config: PostingConfig) -> Self {
        let mut taxes = TaxCalculator::with_standard_templates(&config.accounts);
        for template in config.tax_templates {
            let name = template.name.clone();
            if let Err(err) = taxes.register_template(template) {
                warn!(template = %name, error = %err, "Skipping invalid tax template");
            }
        }

        Self {
            store,
            builder: LedgerBuilder::new(config.accounts),
            taxes,
        }
    }

    pub fn builder(&self) -> &LedgerBuilder {
        &self.builder
    }

    pub fn tax_calculator(&self) -> &TaxCalculator {
        &self.taxes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Net balance of an account, straight from the store
    pub async fn account_balance(
        &self,
        account: &str,
        as_of_date: Option<NaiveDate>,
    ) -> PostingResult<BigDecimal> {
        self.store.account_balance(account, as_of_date).await
    }

    fn build(&self, invoice: &Invoice) -> PostingResult<LedgerSet> {
        match invoice {
            Invoice::Sales(sales) => {
                validate_sales_invoice(sales)?;
                self.builder.build_sales(sales, None)
            }
            Invoice::Purchase(purchase) => {
                validate_purchase_invoice(purchase)?;
                self.builder.build_purchase(purchase, None)
            }
        }
    }
}

#[async_trait]
impl<S: LedgerStore> PostingGateway for PostingService<S> {
    async fn on_invoice_submitted(
        &mut self,
        invoice: &Invoice,
        ctx: &PostingContext,
    ) -> PostingResult<LedgerSet> {
        let voucher = invoice.voucher();

        if !self.store.active_lines(&voucher).await?.is_empty() {
            warn!(voucher = %voucher, actor = %ctx.actor, "Voucher already has active ledger lines");
            return Err(PostingError::AlreadyPosted(voucher));
        }

        let set = match self.build(invoice) {
            Ok(set) => set,
            Err(err) => {
                error!(
                    voucher = %voucher,
                    actor = %ctx.actor,
                    error = %err,
                    "Ledger posting rejected"
                );
                return Err(err);
            }
        };

        let batch_id = self.store.save_lines(&set.lines).await?;

        info!(
            voucher = %voucher,
            batch_id = %batch_id,
            lines = set.len(),
            total_debit = %set.total_debit,
            total_credit = %set.total_credit,
            actor = %ctx.actor,
            timestamp = %ctx.timestamp,
            "Ledger lines posted"
        );

        Ok(set)
    }

    async fn on_invoice_cancelled(
        &mut self,
        voucher: &VoucherRef,
        ctx: &PostingContext,
    ) -> PostingResult<CancellationOutcome> {
        let original_lines = self.store.active_lines(voucher).await?;

        if original_lines.is_empty() {
            warn!(voucher = %voucher, actor = %ctx.actor, "No active ledger lines to reverse");
            return Err(PostingError::NothingToCancel(voucher.clone()));
        }

        let outcome = cancel_with_reversal(
            &voucher.voucher_no,
            voucher.voucher_type,
            &original_lines,
            Some(ctx.date()),
        );

        match &outcome {
            CancellationOutcome::Cancelled { reversal, .. } => {
                let batch_id = self.store.save_reversal(voucher, &reversal.lines).await?;
                info!(
                    voucher = %voucher,
                    batch_id = %batch_id,
                    lines = reversal.len(),
                    actor = %ctx.actor,
                    timestamp = %ctx.timestamp,
                    "Reversal lines posted"
                );
            }
            CancellationOutcome::Failed { error, .. } => {
                error!(
                    voucher = %voucher,
                    actor = %ctx.actor,
                    error = %error,
                    "Ledger reversal failed; nothing persisted"
                );
            }
        }

        Ok(outcome)
    }
}
