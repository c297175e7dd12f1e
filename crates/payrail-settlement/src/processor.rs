//! Settlement batch processor.
//!
//! Sweeps each merchant's successful, unsettled transactions into
//! fixed-size batches, oldest first. A per-merchant settlement lock keeps
//! concurrent runs (overlapping schedules, manual triggers) from batching
//! the same transactions twice; the store's attach-once rule on
//! `settlement_batch_id` is the backstop if the lock ever double-admits.
//!
//! Batch creation is not atomic across chunks: if chunk N fails, chunks
//! 1..N stay committed and the remaining transactions are picked up by the
//! next run. That is safe because settlement is a pure sweep: re-running
//! it never double-settles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use payrail_payments::{LockManager, MerchantService};
use payrail_store::{SettlementBatchStore, TransactionStore};
use payrail_types::{
    constants, MerchantId, PayrailError, Result, SettlementBatch, Transaction,
};

/// Lock key prefix for per-merchant settlement runs.
pub const SETTLEMENT_LOCK_PREFIX: &str = "settlement:";

/// Outcome of one fleet-wide settlement run.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementRunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// ACTIVE merchants considered by this run.
    pub merchants_considered: usize,
    /// Merchants for which at least one batch was created.
    pub merchants_settled: usize,
    /// Merchants with nothing to settle.
    pub merchants_skipped: usize,
    /// Merchants whose sweep failed; their unbatched transactions remain
    /// eligible for the next run.
    pub merchants_failed: usize,
    pub batches_created: usize,
    pub transactions_settled: usize,
    pub total_amount: Decimal,
}

/// Batches unsettled transactions per merchant under a settlement lock.
pub struct SettlementProcessor {
    merchants: Arc<MerchantService>,
    transactions: Arc<dyn TransactionStore>,
    batches: Arc<dyn SettlementBatchStore>,
    locks: Arc<LockManager>,
}

impl SettlementProcessor {
    #[must_use]
    pub fn new(
        merchants: Arc<MerchantService>,
        transactions: Arc<dyn TransactionStore>,
        batches: Arc<dyn SettlementBatchStore>,
        locks: Arc<LockManager>,
    ) -> Self {
        Self {
            merchants,
            transactions,
            batches,
            locks,
        }
    }

    /// Sweep every ACTIVE merchant. One merchant's failure never aborts the
    /// fleet run; it is counted and logged, and the next merchant proceeds.
    pub fn run_all(&self) -> SettlementRunReport {
        let started_at = Utc::now();
        let merchants = self.merchants.list_active();
        tracing::info!(merchants = merchants.len(), "settlement run started");

        let mut report = SettlementRunReport {
            started_at,
            finished_at: started_at,
            merchants_considered: merchants.len(),
            merchants_settled: 0,
            merchants_skipped: 0,
            merchants_failed: 0,
            batches_created: 0,
            transactions_settled: 0,
            total_amount: Decimal::ZERO,
        };

        for merchant in merchants {
            match self.run_for_merchant(merchant.id) {
                Ok(batches) => {
                    report.merchants_settled += 1;
                    report.batches_created += batches.len();
                    for batch in &batches {
                        report.transactions_settled += batch.transaction_count();
                        report.total_amount += batch.total_amount;
                    }
                }
                Err(PayrailError::NoUnsettledTransactions(_)) => {
                    tracing::info!(merchant = %merchant.id, "nothing to settle");
                    report.merchants_skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(merchant = %merchant.id, %err, "merchant settlement failed");
                    report.merchants_failed += 1;
                }
            }
        }

        report.finished_at = Utc::now();
        tracing::info!(
            settled = report.merchants_settled,
            skipped = report.merchants_skipped,
            failed = report.merchants_failed,
            batches = report.batches_created,
            transactions = report.transactions_settled,
            total = %report.total_amount,
            "settlement run finished"
        );
        report
    }

    /// Settle one merchant under its settlement lock.
    ///
    /// # Errors
    /// `SettlementProcessing` if another run holds this merchant's lock or
    /// a batch cannot be created, `NoUnsettledTransactions` if there is
    /// nothing to sweep, plus merchant-resolution errors.
    pub fn run_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<SettlementBatch>> {
        let key = format!("{SETTLEMENT_LOCK_PREFIX}{merchant_id}");
        let outcome = self
            .locks
            .run_exclusive(&key, || self.settle_unlocked(merchant_id));

        match outcome {
            Err(PayrailError::LockHeld(_)) => Err(PayrailError::SettlementProcessing {
                reason: format!("settlement already running for merchant {merchant_id}"),
            }),
            other => other,
        }
    }

    /// The sweep itself. Caller must hold the merchant's settlement lock.
    fn settle_unlocked(&self, merchant_id: MerchantId) -> Result<Vec<SettlementBatch>> {
        // Status may have flipped since the merchant was listed.
        let merchant = self.merchants.active(merchant_id)?;

        let unsettled = self.transactions.list_unsettled(merchant.id);
        if unsettled.is_empty() {
            return Err(PayrailError::NoUnsettledTransactions(merchant.id));
        }

        let mut created = Vec::new();
        for chunk in unsettled.chunks(constants::SETTLEMENT_BATCH_SIZE) {
            // Abort on the first failed chunk; committed batches stand and
            // the remainder is retried by the next run.
            let batch = self.create_batch(merchant.id, chunk)?;
            created.push(batch);
        }

        tracing::info!(
            merchant = %merchant.id,
            batches = created.len(),
            "merchant settled"
        );
        Ok(created)
    }

    /// Persist one batch and claim its transactions.
    fn create_batch(
        &self,
        merchant_id: MerchantId,
        chunk: &[Transaction],
    ) -> Result<SettlementBatch> {
        let total: Decimal = chunk.iter().map(|t| t.amount).sum();
        let ids = chunk.iter().map(|t| t.id).collect();
        let batch = SettlementBatch::new(merchant_id, total, ids);

        let result: Result<SettlementBatch> = (|| {
            let saved = self.batches.insert(batch)?;
            for txn in chunk {
                self.transactions.attach_batch(txn.id, saved.id)?;
            }
            Ok(saved)
        })();

        match result {
            Ok(saved) => {
                tracing::info!(
                    batch_ref = %saved.batch_ref,
                    merchant = %merchant_id,
                    transactions = saved.transaction_count(),
                    total = %saved.total_amount,
                    "settlement batch created"
                );
                Ok(saved)
            }
            Err(err @ PayrailError::SettlementProcessing { .. }) => Err(err),
            Err(err) => Err(PayrailError::SettlementProcessing {
                reason: format!(
                    "failed to create settlement batch for merchant {merchant_id}: {err}"
                ),
            }),
        }
    }
}
