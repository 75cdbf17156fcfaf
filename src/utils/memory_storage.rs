//! In-memory ledger store for testing and development

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// One persisted posting or reversal
#[derive(Debug, Clone, PartialEq)]
pub struct PostedBatch {
    pub id: Uuid,
    pub lines: Vec<LedgerLine>,
}

/// In-memory store; clones share the same underlying batches
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    batches: Arc<RwLock<Vec<PostedBatch>>>,
}

impl MemoryStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PostingResult<RwLockReadGuard<'_, Vec<PostedBatch>>> {
        self.batches
            .read()
            .map_err(|_| PostingError::Storage("ledger store lock poisoned".to_string()))
    }

    fn write(&self) -> PostingResult<RwLockWriteGuard<'_, Vec<PostedBatch>>> {
        self.batches
            .write()
            .map_err(|_| PostingError::Storage("ledger store lock poisoned".to_string()))
    }

    /// Snapshot of every stored batch, oldest first
    pub fn batches(&self) -> PostingResult<Vec<PostedBatch>> {
        Ok(self.read()?.clone())
    }

    /// Every line of a voucher, cancelled or not, in posting order
    pub fn voucher_lines(&self, voucher: &VoucherRef) -> PostingResult<Vec<LedgerLine>> {
        Ok(self
            .read()?
            .iter()
            .flat_map(|batch| batch.lines.iter())
            .filter(|line| line.voucher() == *voucher)
            .cloned()
            .collect())
    }

    /// Drop all data
    pub fn clear(&self) -> PostingResult<()> {
        self.write()?.clear();
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn save_lines(&mut self, lines: &[LedgerLine]) -> PostingResult<Uuid> {
        let id = Uuid::new_v4();
        self.write()?.push(PostedBatch {
            id,
            lines: lines.to_vec(),
        });
        Ok(id)
    }

    async fn active_lines(&self, voucher: &VoucherRef) -> PostingResult<Vec<LedgerLine>> {
        Ok(self
            .voucher_lines(voucher)?
            .into_iter()
            .filter(|line| !line.is_cancelled)
            .collect())
    }

    async fn save_reversal(
        &mut self,
        voucher: &VoucherRef,
        reversal_lines: &[LedgerLine],
    ) -> PostingResult<Uuid> {
        let id = Uuid::new_v4();
        let mut batches = self.write()?;

        for line in batches.iter_mut().flat_map(|batch| batch.lines.iter_mut()) {
            if line.voucher() == *voucher {
                line.is_cancelled = true;
            }
        }

        batches.push(PostedBatch {
            id,
            lines: reversal_lines.to_vec(),
        });
        Ok(id)
    }

    async fn account_lines(
        &self,
        account: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> PostingResult<Vec<LedgerLine>> {
        Ok(self
            .read()?
            .iter()
            .flat_map(|batch| batch.lines.iter())
            .filter(|line| {
                if line.account != account {
                    return false;
                }
                if let Some(start) = start_date {
                    if line.posting_date < start {
                        return false;
                    }
                }
                if let Some(end) = end_date {
                    if line.posting_date > end {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect())
    }

    async fn account_balance(
        &self,
        account: &str,
        as_of_date: Option<NaiveDate>,
    ) -> PostingResult<BigDecimal> {
        let lines = self.account_lines(account, None, as_of_date).await?;
        Ok(lines.iter().map(LedgerLine::net).sum())
    }
}
