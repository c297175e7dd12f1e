//! Transaction processor.
//!
//! Initiation is the hot path: validate, resolve an ACTIVE merchant,
//! idempotency pre-check, then charge the gateway and persist exactly one
//! row while holding the per-merchant-reference lock. The row is inserted
//! once with its final status; INITIATED never reaches the store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use payrail_store::TransactionStore;
use payrail_types::reference::generate_internal_ref;
use payrail_types::{
    constants, MerchantId, Page, PageRequest, PayrailError, Result, Transaction,
    TransactionFilter, TransactionStatus,
};

use crate::gateway::DebitGateway;
use crate::lock::LockManager;
use crate::merchants::MerchantService;

/// Lock key prefix for transaction initiation.
pub const TRANSACTION_LOCK_PREFIX: &str = "transaction:";

/// Request to initiate a payment transaction.
#[derive(Debug, Clone)]
pub struct InitiateTransaction {
    pub amount: Decimal,
    /// 3-letter uppercase currency code.
    pub currency: String,
    pub merchant_id: MerchantId,
    /// Caller-supplied idempotency key.
    pub merchant_ref: String,
}

/// Listing request over a merchant's transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionListRequest {
    pub merchant_id: Option<MerchantId>,
    pub status: Option<TransactionStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: PageRequest,
}

/// Platform fee for an amount: 1.5%, capped at 200.00, rounded to 2 dp.
#[must_use]
pub fn calculate_fee(amount: Decimal) -> Decimal {
    let fee = (amount * constants::fee_rate())
        .round_dp_with_strategy(constants::FEE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    fee.min(constants::max_fee())
}

/// Orchestrates initiation and lookups over the transaction store.
pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
    merchants: Arc<MerchantService>,
    locks: Arc<LockManager>,
    gateway: DebitGateway,
}

impl TransactionService {
    #[must_use]
    pub fn new(
        store: Arc<dyn TransactionStore>,
        merchants: Arc<MerchantService>,
        locks: Arc<LockManager>,
        gateway: DebitGateway,
    ) -> Self {
        Self {
            store,
            merchants,
            locks,
            gateway,
        }
    }

    /// Initiate a payment transaction.
    ///
    /// Exactly one row per distinct `merchant_ref` is ever persisted. A
    /// gateway decline or insufficient-funds outcome is a FAILED row, not
    /// an error; only infrastructure-level failures surface as `Err`, and
    /// even those persist a FAILED row so the reference is burned.
    ///
    /// # Errors
    /// `Validation` for malformed fields, `MerchantNotFound` /
    /// `MerchantInactive` from merchant resolution,
    /// `TransactionAlreadyExists` for a reused merchant reference,
    /// `TransactionInProgress` when another initiation holds the lock, and
    /// `InvalidAmount` for non-positive amounts.
    pub fn initiate(&self, request: &InitiateTransaction) -> Result<Transaction> {
        Self::validate(request)?;
        let merchant = self.merchants.active(request.merchant_id)?;

        // Idempotency fast path: a completed attempt with this reference
        // conflicts without touching the lock or the gateway.
        if let Some(existing) = self.store.find_by_merchant_ref(&request.merchant_ref) {
            tracing::warn!(
                merchant_ref = %request.merchant_ref,
                internal_ref = %existing.internal_ref,
                "duplicate merchant reference"
            );
            return Err(PayrailError::TransactionAlreadyExists(
                request.merchant_ref.clone(),
            ));
        }

        let key = format!("{TRANSACTION_LOCK_PREFIX}{}", request.merchant_ref);
        let outcome = self.locks.run_exclusive(&key, || {
            self.process_locked(request, merchant.id)
        });

        match outcome {
            Err(PayrailError::LockHeld(_)) => Err(PayrailError::TransactionInProgress(
                request.merchant_ref.clone(),
            )),
            other => other,
        }
    }

    /// Charge the gateway and persist the single row. Runs under the lock.
    fn process_locked(
        &self,
        request: &InitiateTransaction,
        merchant_id: MerchantId,
    ) -> Result<Transaction> {
        let fee = calculate_fee(request.amount);
        let mut txn = Transaction::new(
            request.amount,
            request.currency.clone(),
            request.merchant_ref.clone(),
            generate_internal_ref(),
            fee,
            merchant_id,
        );

        match self.gateway.charge(request.amount, fee, &request.currency) {
            Ok(response) => {
                txn.status = if response.status.is_success() {
                    TransactionStatus::Success
                } else {
                    TransactionStatus::Failed
                };
                let saved = self.store.insert(txn)?;
                tracing::info!(
                    internal_ref = %saved.internal_ref,
                    merchant = %saved.merchant_id,
                    status = %saved.status,
                    amount = %saved.amount,
                    fee = %saved.fee,
                    "transaction processed"
                );
                Ok(saved)
            }
            Err(err) => {
                // Burn the reference: the failed attempt is recorded so a
                // retry with the same merchant_ref conflicts instead of
                // double-charging.
                txn.status = TransactionStatus::Failed;
                if self.store.find_by_merchant_ref(&request.merchant_ref).is_none() {
                    if let Err(persist_err) = self.store.insert(txn) {
                        tracing::error!(
                            merchant_ref = %request.merchant_ref,
                            %persist_err,
                            "failed to persist FAILED transaction"
                        );
                    }
                }
                tracing::warn!(merchant_ref = %request.merchant_ref, %err, "gateway charge failed");
                Err(err)
            }
        }
    }

    /// Lookup by internal reference.
    pub fn get_by_internal_ref(&self, internal_ref: &str) -> Result<Transaction> {
        self.store
            .find_by_internal_ref(internal_ref)
            .ok_or_else(|| PayrailError::TransactionNotFound(internal_ref.to_owned()))
    }

    /// Paginated listing, newest first. Requires the merchant to exist.
    pub fn list(&self, request: &TransactionListRequest) -> Result<Page<Transaction>> {
        let Some(merchant_id) = request.merchant_id else {
            return Ok(Page::empty(request.page));
        };
        self.merchants.get(merchant_id)?;

        let filter = TransactionFilter {
            merchant_id,
            status: request.status,
            start_date: request.start_date,
            end_date: request.end_date,
        };
        Ok(self.store.page_by_filter(&filter, request.page))
    }

    fn validate(request: &InitiateTransaction) -> Result<()> {
        let mut messages = Vec::new();
        if request.currency.len() != constants::CURRENCY_CODE_LEN
            || !request.currency.chars().all(|c| c.is_ascii_uppercase())
        {
            messages.push("currency must be a 3-letter uppercase code".to_owned());
        }
        if request.merchant_ref.trim().is_empty() {
            messages.push("merchant reference must not be empty".to_owned());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(PayrailError::Validation { messages })
        }
    }
}
