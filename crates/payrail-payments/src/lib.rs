//! # payrail-payments
//!
//! Transaction initiation plane: merchant directory, distributed lock
//! manager, gateway simulation, and the transaction processor.
//!
//! ## Initiation flow
//!
//! ```text
//! request -> MerchantService.active() -> idempotency pre-check
//!         -> LockManager.run_exclusive("transaction:{merchant_ref}")
//!         -> fee -> DebitGateway.charge() -> single insert
//! ```
//!
//! The lock gives best-effort per-key mutual exclusion (TTL-bounded, not
//! linearizable across store failover); the transaction store's unique
//! `merchant_ref` constraint is the final idempotency truth.

pub mod gateway;
pub mod lock;
pub mod merchants;
pub mod transactions;

pub use gateway::DebitGateway;
pub use lock::LockManager;
pub use merchants::{CreateMerchant, MerchantService};
pub use transactions::{InitiateTransaction, TransactionListRequest, TransactionService};
