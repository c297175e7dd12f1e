//! Payment transaction records.
//!
//! A transaction is inserted exactly once per distinct `merchant_ref` with
//! its final status already decided; afterwards it is only ever mutated to
//! attach a settlement batch. Rows are never deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BatchId, MerchantId, TransactionId};

/// Processing status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Constructed but not yet resolved against the gateway. Never persisted
    /// in practice; the final status is decided before the single insert.
    Initiated,
    Success,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiated => write!(f, "INITIATED"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// A merchant payment transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Positive, fixed-precision (2 dp) amount.
    pub amount: Decimal,
    /// 3-letter currency code, e.g. "USD".
    pub currency: String,
    pub status: TransactionStatus,
    /// Caller-supplied idempotency key, globally unique once persisted.
    pub merchant_ref: String,
    /// System-generated reference (`TXN…`), globally unique.
    pub internal_ref: String,
    /// Platform fee: min(amount * 0.015, 200.00), 2 dp.
    pub fee: Decimal,
    pub merchant_id: MerchantId,
    /// Null until the transaction is swept into a settlement batch.
    pub settlement_batch_id: Option<BatchId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Construct an INITIATED transaction awaiting its gateway outcome.
    #[must_use]
    pub fn new(
        amount: Decimal,
        currency: impl Into<String>,
        merchant_ref: impl Into<String>,
        internal_ref: impl Into<String>,
        fee: Decimal,
        merchant_id: MerchantId,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            amount,
            currency: currency.into(),
            status: TransactionStatus::Initiated,
            merchant_ref: merchant_ref.into(),
            internal_ref: internal_ref.into(),
            fee,
            merchant_id,
            settlement_batch_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Eligible for settlement: SUCCESS and not yet attached to a batch.
    #[must_use]
    pub fn is_unsettled(&self) -> bool {
        self.status == TransactionStatus::Success && self.settlement_batch_id.is_none()
    }
}

/// Query filter for transaction listings. Date bounds are inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub merchant_id: MerchantId,
    pub status: Option<TransactionStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    /// Filter with no status or date constraints.
    #[must_use]
    pub fn for_merchant(merchant_id: MerchantId) -> Self {
        Self {
            merchant_id,
            status: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Whether a transaction row matches this filter.
    #[must_use]
    pub fn matches(&self, txn: &Transaction) -> bool {
        if txn.merchant_id != self.merchant_id {
            return false;
        }
        if let Some(status) = self.status {
            if txn.status != status {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if txn.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if txn.created_at > end {
                return false;
            }
        }
        true
    }
}
