//! Transaction store contract and in-memory implementation.
//!
//! The `merchant_ref` uniqueness constraint enforced at insert is the
//! system's final idempotency truth: even if the distributed lock ever
//! double-admits (store partition recovery), the second insert fails here.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use payrail_types::{
    BatchId, Page, PageRequest, PayrailError, Result, Transaction, TransactionFilter,
    TransactionId, MerchantId,
};

/// Transaction persistence contract.
pub trait TransactionStore: Send + Sync {
    /// Insert a new transaction. Fails with `TransactionAlreadyExists` if a
    /// row with this `merchant_ref` is already persisted.
    fn insert(&self, txn: Transaction) -> Result<Transaction>;

    fn find_by_internal_ref(&self, internal_ref: &str) -> Option<Transaction>;

    fn find_by_merchant_ref(&self, merchant_ref: &str) -> Option<Transaction>;

    /// Filtered listing, newest first, paginated.
    fn page_by_filter(&self, filter: &TransactionFilter, page: PageRequest) -> Page<Transaction>;

    /// Successful, unbatched transactions for a merchant, oldest first.
    fn list_unsettled(&self, merchant_id: MerchantId) -> Vec<Transaction>;

    fn count_unsettled(&self, merchant_id: MerchantId) -> usize;

    /// All transactions attached to a batch, oldest first.
    fn list_by_batch(&self, batch_id: BatchId) -> Vec<Transaction>;

    /// Partial update: attach the transaction to a settlement batch. Fails
    /// if the transaction is already attached to one; a transaction is
    /// never referenced by more than one batch.
    fn attach_batch(&self, id: TransactionId, batch_id: BatchId) -> Result<Transaction>;
}

/// In-memory [`TransactionStore`].
pub struct InMemoryTransactionStore {
    rows: RwLock<HashMap<TransactionId, Transaction>>,
}

impl InMemoryTransactionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn oldest_first(rows: &mut [Transaction]) {
    rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

impl TransactionStore for InMemoryTransactionStore {
    fn insert(&self, txn: Transaction) -> Result<Transaction> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        if rows.values().any(|t| t.merchant_ref == txn.merchant_ref) {
            return Err(PayrailError::TransactionAlreadyExists(txn.merchant_ref));
        }
        if rows.values().any(|t| t.internal_ref == txn.internal_ref) {
            return Err(PayrailError::Internal(format!(
                "duplicate internal reference {}",
                txn.internal_ref
            )));
        }
        rows.insert(txn.id, txn.clone());
        Ok(txn)
    }

    fn find_by_internal_ref(&self, internal_ref: &str) -> Option<Transaction> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|t| t.internal_ref == internal_ref)
            .cloned()
    }

    fn find_by_merchant_ref(&self, merchant_ref: &str) -> Option<Transaction> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|t| t.merchant_ref == merchant_ref)
            .cloned()
    }

    fn page_by_filter(&self, filter: &TransactionFilter, page: PageRequest) -> Page<Transaction> {
        let mut matches: Vec<Transaction> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        // Newest first for listings.
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matches.len();
        let items: Vec<Transaction> = matches
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .collect();
        Page::new(items, total, page)
    }

    fn list_unsettled(&self, merchant_id: MerchantId) -> Vec<Transaction> {
        let mut rows: Vec<Transaction> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|t| t.merchant_id == merchant_id && t.is_unsettled())
            .cloned()
            .collect();
        oldest_first(&mut rows);
        rows
    }

    fn count_unsettled(&self, merchant_id: MerchantId) -> usize {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|t| t.merchant_id == merchant_id && t.is_unsettled())
            .count()
    }

    fn list_by_batch(&self, batch_id: BatchId) -> Vec<Transaction> {
        let mut rows: Vec<Transaction> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|t| t.settlement_batch_id == Some(batch_id))
            .cloned()
            .collect();
        oldest_first(&mut rows);
        rows
    }

    fn attach_batch(&self, id: TransactionId, batch_id: BatchId) -> Result<Transaction> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let txn = rows
            .get_mut(&id)
            .ok_or_else(|| PayrailError::TransactionNotFound(id.to_string()))?;
        if let Some(existing) = txn.settlement_batch_id {
            return Err(PayrailError::SettlementProcessing {
                reason: format!("transaction {id} is already settled in batch {existing}"),
            });
        }
        txn.settlement_batch_id = Some(batch_id);
        txn.updated_at = Some(Utc::now());
        Ok(txn.clone())
    }
}
