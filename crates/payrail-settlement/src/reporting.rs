//! Settlement reporting.
//!
//! Read-only aggregation over batches and their constituent transactions.
//! Fees are recomputed from the transaction rows rather than stored on the
//! batch, so the batch record stays a pure payout instruction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use payrail_payments::MerchantService;
use payrail_store::{SettlementBatchStore, TransactionStore};
use payrail_types::{MerchantId, PayrailError, Result, SettlementBatch};

/// Per-merchant settlement position.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementSummary {
    pub merchant_id: MerchantId,
    pub total_batches: usize,
    pub total_transactions: usize,
    /// Gross settled amount across all batches.
    pub total_settled_amount: Decimal,
    /// Platform fees across all settled transactions.
    pub total_fees: Decimal,
    /// Successful transactions not yet swept into a batch.
    pub unsettled_count: usize,
    pub last_settlement_at: Option<DateTime<Utc>>,
}

/// One row of a merchant's batch listing.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub batch_ref: String,
    pub merchant_id: MerchantId,
    pub total_amount: Decimal,
    pub transaction_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&SettlementBatch> for BatchSummary {
    fn from(batch: &SettlementBatch) -> Self {
        Self {
            batch_ref: batch.batch_ref.clone(),
            merchant_id: batch.merchant_id,
            total_amount: batch.total_amount,
            transaction_count: batch.transaction_count(),
            created_at: batch.created_at,
        }
    }
}

/// Read-only settlement queries.
pub struct SettlementReporting {
    merchants: Arc<MerchantService>,
    transactions: Arc<dyn TransactionStore>,
    batches: Arc<dyn SettlementBatchStore>,
}

impl SettlementReporting {
    #[must_use]
    pub fn new(
        merchants: Arc<MerchantService>,
        transactions: Arc<dyn TransactionStore>,
        batches: Arc<dyn SettlementBatchStore>,
    ) -> Self {
        Self {
            merchants,
            transactions,
            batches,
        }
    }

    /// A merchant's full settlement position. Works for inactive merchants
    /// too; reporting never gates on status.
    pub fn summary(&self, merchant_id: MerchantId) -> Result<SettlementSummary> {
        let merchant = self.merchants.get(merchant_id)?;

        let batches = self.batches.list_by_merchant(merchant.id);
        let mut total_transactions = 0;
        let mut total_settled_amount = Decimal::ZERO;
        let mut total_fees = Decimal::ZERO;
        for batch in &batches {
            total_settled_amount += batch.total_amount;
            for txn in self.transactions.list_by_batch(batch.id) {
                total_transactions += 1;
                total_fees += txn.fee;
            }
        }

        Ok(SettlementSummary {
            merchant_id: merchant.id,
            total_batches: batches.len(),
            total_transactions,
            total_settled_amount,
            total_fees,
            unsettled_count: self.transactions.count_unsettled(merchant.id),
            last_settlement_at: self.batches.last_settlement_at(merchant.id),
        })
    }

    /// A merchant's batches, newest first.
    pub fn list_batches(&self, merchant_id: MerchantId) -> Result<Vec<BatchSummary>> {
        let merchant = self.merchants.get(merchant_id)?;
        Ok(self
            .batches
            .list_by_merchant(merchant.id)
            .iter()
            .map(BatchSummary::from)
            .collect())
    }

    /// Lookup a batch by its business reference.
    pub fn get_batch(&self, batch_ref: &str) -> Result<SettlementBatch> {
        self.batches
            .find_by_ref(batch_ref)
            .ok_or_else(|| PayrailError::SettlementBatchNotFound(batch_ref.to_owned()))
    }
}
