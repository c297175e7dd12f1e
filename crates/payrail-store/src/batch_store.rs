//! Settlement batch store contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use payrail_types::{BatchId, MerchantId, PayrailError, Result, SettlementBatch};

/// Settlement batch persistence contract. Batches are insert-only.
pub trait SettlementBatchStore: Send + Sync {
    fn insert(&self, batch: SettlementBatch) -> Result<SettlementBatch>;

    fn find_by_ref(&self, batch_ref: &str) -> Option<SettlementBatch>;

    /// All batches for a merchant, newest first.
    fn list_by_merchant(&self, merchant_id: MerchantId) -> Vec<SettlementBatch>;

    fn count_by_merchant(&self, merchant_id: MerchantId) -> usize;

    /// Creation time of the merchant's most recent batch.
    fn last_settlement_at(&self, merchant_id: MerchantId) -> Option<DateTime<Utc>>;
}

/// In-memory [`SettlementBatchStore`].
pub struct InMemorySettlementBatchStore {
    rows: RwLock<HashMap<BatchId, SettlementBatch>>,
}

impl InMemorySettlementBatchStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySettlementBatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettlementBatchStore for InMemorySettlementBatchStore {
    fn insert(&self, batch: SettlementBatch) -> Result<SettlementBatch> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        if rows.values().any(|b| b.batch_ref == batch.batch_ref) {
            return Err(PayrailError::Internal(format!(
                "duplicate batch reference {}",
                batch.batch_ref
            )));
        }
        rows.insert(batch.id, batch.clone());
        Ok(batch)
    }

    fn find_by_ref(&self, batch_ref: &str) -> Option<SettlementBatch> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|b| b.batch_ref == batch_ref)
            .cloned()
    }

    fn list_by_merchant(&self, merchant_id: MerchantId) -> Vec<SettlementBatch> {
        let mut batches: Vec<SettlementBatch> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|b| b.merchant_id == merchant_id)
            .cloned()
            .collect();
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        batches
    }

    fn count_by_merchant(&self, merchant_id: MerchantId) -> usize {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|b| b.merchant_id == merchant_id)
            .count()
    }

    fn last_settlement_at(&self, merchant_id: MerchantId) -> Option<DateTime<Utc>> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|b| b.merchant_id == merchant_id)
            .map(|b| b.created_at)
            .max()
    }
}
