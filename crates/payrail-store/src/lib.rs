//! # payrail-store
//!
//! Persistence contracts for the PayRail engine, plus in-memory reference
//! implementations so the whole pipeline runs without external services.
//!
//! ## Contracts
//!
//! - [`MerchantStore`]: merchant lookup by id / email / status, insert,
//!   partial status update
//! - [`TransactionStore`]: idempotency-key and internal-reference lookup,
//!   paginated filtering, unsettled selection, batch attachment
//! - [`SettlementBatchStore`]: batch insert and per-merchant aggregates
//! - [`KeyValueStore`]: the lock store (`get`, `set_if_absent` with TTL,
//!   `set`, `delete`)
//!
//! Uniqueness constraints (merchant email, transaction `merchant_ref` and
//! `internal_ref`, batch `batch_ref`) are enforced at insert. The
//! transaction store's `merchant_ref` constraint is the final idempotency
//! backstop: the distributed lock gives best-effort exclusivity, this
//! gives correctness.

pub mod batch_store;
pub mod kv;
pub mod merchant_store;
pub mod transaction_store;

pub use batch_store::{InMemorySettlementBatchStore, SettlementBatchStore};
pub use kv::{InMemoryKvStore, KeyValueStore};
pub use merchant_store::{InMemoryMerchantStore, MerchantStore};
pub use transaction_store::{InMemoryTransactionStore, TransactionStore};
