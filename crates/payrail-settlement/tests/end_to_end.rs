//! Full pipeline tests: register a merchant, initiate transactions against
//! the simulated gateway, sweep them into settlement batches, and query the
//! resulting position.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use payrail_payments::{
    CreateMerchant, DebitGateway, InitiateTransaction, LockManager, MerchantService,
    TransactionService,
};
use payrail_settlement::{SettlementProcessor, SettlementReporting, SettlementScheduler};
use payrail_store::{
    InMemoryKvStore, InMemoryMerchantStore, InMemorySettlementBatchStore,
    InMemoryTransactionStore, KeyValueStore, SettlementBatchStore, TransactionStore,
};
use payrail_types::{
    constants, LockConfig, Merchant, MerchantId, MerchantStatus, PayrailError, ScheduleConfig,
    TransactionStatus,
};

struct Pipeline {
    kv: Arc<InMemoryKvStore>,
    merchants: Arc<MerchantService>,
    transactions: Arc<TransactionService>,
    transaction_store: Arc<InMemoryTransactionStore>,
    processor: Arc<SettlementProcessor>,
    reporting: SettlementReporting,
}

impl Pipeline {
    fn new() -> Self {
        Self::with_gateway_latency(Duration::ZERO)
    }

    fn with_gateway_latency(latency: Duration) -> Self {
        let kv = Arc::new(InMemoryKvStore::new());
        let kv_dyn: Arc<dyn KeyValueStore> = Arc::clone(&kv) as Arc<dyn KeyValueStore>;
        let locks = Arc::new(LockManager::new(kv_dyn, &LockConfig::default()));

        let merchants = Arc::new(MerchantService::new(Arc::new(InMemoryMerchantStore::new())));
        let transaction_store = Arc::new(InMemoryTransactionStore::new());
        let batch_store = Arc::new(InMemorySettlementBatchStore::new());

        let transactions = Arc::new(TransactionService::new(
            Arc::clone(&transaction_store) as Arc<dyn TransactionStore>,
            Arc::clone(&merchants),
            Arc::clone(&locks),
            DebitGateway::with_latency(latency),
        ));
        let processor = Arc::new(SettlementProcessor::new(
            Arc::clone(&merchants),
            Arc::clone(&transaction_store) as Arc<dyn TransactionStore>,
            Arc::clone(&batch_store) as Arc<dyn SettlementBatchStore>,
            Arc::clone(&locks),
        ));
        let reporting = SettlementReporting::new(
            Arc::clone(&merchants),
            Arc::clone(&transaction_store) as Arc<dyn TransactionStore>,
            Arc::clone(&batch_store) as Arc<dyn SettlementBatchStore>,
        );

        Self {
            kv,
            merchants,
            transactions,
            transaction_store,
            processor,
            reporting,
        }
    }

    fn register(&self, email: &str) -> Merchant {
        self.merchants
            .register(&CreateMerchant {
                business_name: "Acme Ltd".to_owned(),
                email: email.to_owned(),
                settlement_account: "ACC-001".to_owned(),
            })
            .unwrap()
    }

    fn initiate(
        &self,
        merchant: MerchantId,
        merchant_ref: &str,
        amount: Decimal,
    ) -> payrail_types::Result<payrail_types::Transaction> {
        self.transactions.initiate(&InitiateTransaction {
            amount,
            currency: "USD".to_owned(),
            merchant_id: merchant,
            merchant_ref: merchant_ref.to_owned(),
        })
    }
}

#[test]
fn initiation_persists_one_row_with_fee() {
    let p = Pipeline::new();
    let m = p.register("ops@acme.test");

    let txn = p
        .initiate(m.id, "ORDER-1", Decimal::new(10000, 2))
        .unwrap();
    assert_eq!(txn.status, TransactionStatus::Success);
    assert_eq!(txn.fee, Decimal::new(150, 2)); // 1.5% of 100.00

    let found = p
        .transactions
        .get_by_internal_ref(&txn.internal_ref)
        .unwrap();
    assert_eq!(found.id, txn.id);

    let dup = p.initiate(m.id, "ORDER-1", Decimal::new(10000, 2));
    assert!(matches!(
        dup,
        Err(PayrailError::TransactionAlreadyExists(_))
    ));
}

#[test]
fn concurrent_initiation_same_reference_charges_once() {
    let p = Pipeline::with_gateway_latency(Duration::from_millis(50));
    let m = p.register("ops@acme.test");

    let barrier = Arc::new(std::sync::Barrier::new(3));
    let handles: Vec<_> = (0..3)
        .map(|_| {
            let service = Arc::clone(&p.transactions);
            let barrier = Arc::clone(&barrier);
            let merchant_id = m.id;
            std::thread::spawn(move || {
                barrier.wait();
                service.initiate(&InitiateTransaction {
                    amount: Decimal::new(10000, 2),
                    currency: "USD".to_owned(),
                    merchant_id,
                    merchant_ref: "ORDER-1".to_owned(),
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

    // Exactly one row exists for the contested reference.
    assert!(p
        .transaction_store
        .find_by_merchant_ref("ORDER-1")
        .is_some());
    assert_eq!(p.transaction_store.count_unsettled(m.id), 1);
}

#[test]
fn settlement_chunks_into_fixed_size_batches() {
    let p = Pipeline::new();
    let m = p.register("ops@acme.test");

    // 12 successful transactions of 50.00 each.
    for i in 0..12 {
        p.initiate(m.id, &format!("ORDER-{i}"), Decimal::new(5000, 2))
            .unwrap();
    }

    let batches = p.processor.run_for_merchant(m.id).unwrap();
    assert_eq!(batches.len(), 3); // 5 + 5 + 2

    let sizes: Vec<usize> = batches.iter().map(|b| b.transaction_count()).collect();
    assert_eq!(sizes, vec![5, 5, 2]);
    assert_eq!(batches[0].total_amount, Decimal::new(25000, 2)); // 250.00
    assert_eq!(batches[2].total_amount, Decimal::new(10000, 2)); // 100.00

    // Every transaction is now attached to exactly one batch.
    assert_eq!(p.transaction_store.count_unsettled(m.id), 0);
    for batch in &batches {
        assert_eq!(
            p.transaction_store.list_by_batch(batch.id).len(),
            batch.transaction_count()
        );
    }

    // Nothing left: rerun reports nothing to settle.
    let rerun = p.processor.run_for_merchant(m.id);
    assert!(matches!(
        rerun,
        Err(PayrailError::NoUnsettledTransactions(_))
    ));
}

#[test]
fn failed_transactions_are_never_settled() {
    let p = Pipeline::new();
    let m = p.register("ops@acme.test");

    p.initiate(m.id, "OK-1", Decimal::new(5000, 2)).unwrap();
    // Above the decline threshold: persisted as FAILED.
    let declined = p
        .initiate(m.id, "BIG-1", Decimal::new(1_000_001, 2))
        .unwrap();
    assert_eq!(declined.status, TransactionStatus::Failed);

    let batches = p.processor.run_for_merchant(m.id).unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].transaction_count(), 1);
    assert_eq!(batches[0].total_amount, Decimal::new(5000, 2));
}

#[test]
fn inactive_merchant_is_fenced_from_both_planes() {
    let p = Pipeline::new();
    let m = p.register("ops@acme.test");
    p.initiate(m.id, "ORDER-1", Decimal::new(5000, 2)).unwrap();

    p.merchants
        .set_status(m.id, MerchantStatus::Inactive)
        .unwrap();

    let init = p.initiate(m.id, "ORDER-2", Decimal::new(5000, 2));
    assert!(matches!(init, Err(PayrailError::MerchantInactive(_))));

    let settle = p.processor.run_for_merchant(m.id);
    assert!(matches!(settle, Err(PayrailError::MerchantInactive(_))));

    // Reporting still works for inactive merchants.
    let summary = p.reporting.summary(m.id).unwrap();
    assert_eq!(summary.unsettled_count, 1);
    assert_eq!(summary.total_batches, 0);
}

#[test]
fn settlement_lock_blocks_concurrent_run() {
    let p = Pipeline::new();
    let m = p.register("ops@acme.test");
    p.initiate(m.id, "ORDER-1", Decimal::new(5000, 2)).unwrap();

    // Simulate another node holding this merchant's settlement lock.
    p.kv.set(
        &format!("settlement:{}", m.id),
        "LOCKED",
        Duration::from_secs(60),
    );

    let err = p.processor.run_for_merchant(m.id).unwrap_err();
    assert!(matches!(err, PayrailError::SettlementProcessing { .. }));
    // The transactions were not claimed.
    assert_eq!(p.transaction_store.count_unsettled(m.id), 1);
}

#[test]
fn fleet_run_reports_per_merchant_outcomes() {
    let p = Pipeline::new();
    let settled = p.register("a@acme.test");
    let empty = p.register("b@acme.test");

    for i in 0..7 {
        p.initiate(settled.id, &format!("ORDER-{i}"), Decimal::new(5000, 2))
            .unwrap();
    }
    let _ = empty; // registered but has nothing to settle

    let report = p.processor.run_all();
    assert_eq!(report.merchants_considered, 2);
    assert_eq!(report.merchants_settled, 1);
    assert_eq!(report.merchants_skipped, 1);
    assert_eq!(report.merchants_failed, 0);
    assert_eq!(report.batches_created, 2); // 5 + 2
    assert_eq!(report.transactions_settled, 7);
    assert_eq!(report.total_amount, Decimal::new(35000, 2)); // 350.00
    assert!(report.finished_at >= report.started_at);
}

#[test]
fn scheduler_run_once_honors_enable_flag() {
    let p = Pipeline::new();
    let m = p.register("ops@acme.test");
    p.initiate(m.id, "ORDER-1", Decimal::new(5000, 2)).unwrap();

    let disabled = SettlementScheduler::new(
        Arc::clone(&p.processor),
        ScheduleConfig {
            enabled: false,
            ..ScheduleConfig::default()
        },
    );
    assert!(disabled.run_once().is_none());
    assert_eq!(p.transaction_store.count_unsettled(m.id), 1);

    let enabled = SettlementScheduler::new(Arc::clone(&p.processor), ScheduleConfig::default());
    let report = enabled.run_once().unwrap();
    assert_eq!(report.batches_created, 1);
    assert_eq!(p.transaction_store.count_unsettled(m.id), 0);
}

#[test]
fn gateway_error_burns_the_reference_with_a_failed_row() {
    let p = Pipeline::new();
    let m = p.register("ops@acme.test");

    let err = p
        .initiate(m.id, "ORDER-1", Decimal::new(-100, 2))
        .unwrap_err();
    assert!(matches!(err, PayrailError::InvalidAmount(_)));

    let row = p
        .transaction_store
        .find_by_merchant_ref("ORDER-1")
        .unwrap();
    assert_eq!(row.status, TransactionStatus::Failed);

    // The reference is burned; a corrected retry must use a new one.
    let retry = p.initiate(m.id, "ORDER-1", Decimal::new(10000, 2));
    assert!(matches!(
        retry,
        Err(PayrailError::TransactionAlreadyExists(_))
    ));
    p.initiate(m.id, "ORDER-2", Decimal::new(10000, 2)).unwrap();
}

#[test]
fn reporting_aggregates_settled_position() {
    let p = Pipeline::new();
    let m = p.register("ops@acme.test");

    for i in 0..6 {
        p.initiate(m.id, &format!("ORDER-{i}"), Decimal::new(10000, 2))
            .unwrap();
    }
    let batches = p.processor.run_for_merchant(m.id).unwrap();
    assert_eq!(batches.len(), 2);

    // One more success left unsettled after the sweep.
    p.initiate(m.id, "ORDER-LATE", Decimal::new(10000, 2))
        .unwrap();

    let summary = p.reporting.summary(m.id).unwrap();
    assert_eq!(summary.total_batches, 2);
    assert_eq!(summary.total_transactions, 6);
    assert_eq!(summary.total_settled_amount, Decimal::new(60000, 2)); // 600.00
    assert_eq!(summary.total_fees, Decimal::new(900, 2)); // 6 x 1.50
    assert_eq!(summary.unsettled_count, 1);
    assert!(summary.last_settlement_at.is_some());

    let listed = p.reporting.list_batches(m.id).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(
        listed[0].transaction_count + listed[1].transaction_count,
        constants::SETTLEMENT_BATCH_SIZE + 1
    );

    let fetched = p.reporting.get_batch(&batches[0].batch_ref).unwrap();
    assert_eq!(fetched.id, batches[0].id);
    let missing = p.reporting.get_batch("BATCH00000000000000XXXXXX");
    assert!(matches!(
        missing,
        Err(PayrailError::SettlementBatchNotFound(_))
    ));

    let unknown = p.reporting.summary(MerchantId::new());
    assert!(matches!(unknown, Err(PayrailError::MerchantNotFound(_))));
}
