//! Settlement batch records.
//!
//! A batch bundles a fixed-size chunk of successful, unsettled transactions
//! for payout. `total_amount` is fixed at creation time and equals the sum
//! of the constituent transaction amounts; batches never shrink or merge.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BatchId, MerchantId, TransactionId};
use crate::reference;

/// A settlement batch, immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementBatch {
    pub id: BatchId,
    /// System-assigned business reference (`BATCH…`), globally unique.
    pub batch_ref: String,
    pub merchant_id: MerchantId,
    /// Sum of constituent transaction amounts at creation time.
    pub total_amount: Decimal,
    /// Constituent transactions in creation-time order (oldest first).
    pub transaction_ids: Vec<TransactionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SettlementBatch {
    /// Create a batch with a generated batch reference.
    #[must_use]
    pub fn new(
        merchant_id: MerchantId,
        total_amount: Decimal,
        transaction_ids: Vec<TransactionId>,
    ) -> Self {
        Self {
            id: BatchId::new(),
            batch_ref: reference::generate_batch_ref(),
            merchant_id,
            total_amount,
            transaction_ids,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.transaction_ids.len()
    }
}
