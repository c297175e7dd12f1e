//! # payrail-types
//!
//! Shared types, errors, and configuration for the **PayRail** payment
//! processing and settlement engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`MerchantId`], [`TransactionId`], [`BatchId`]
//! - **Business references**: the `TXN…` / `BATCH…` / `MERCH…` generators in [`reference`]
//! - **Merchant model**: [`Merchant`], [`MerchantStatus`]
//! - **Transaction model**: [`Transaction`], [`TransactionStatus`], [`TransactionFilter`]
//! - **Settlement model**: [`SettlementBatch`]
//! - **Gateway model**: [`PaymentResponse`], [`PaymentStatus`]
//! - **Pagination**: [`Page`], [`PageRequest`]
//! - **Configuration**: [`LockConfig`], [`ScheduleConfig`]
//! - **Errors**: [`PayrailError`] with `PAY_ERR_` prefix codes and the
//!   [`ErrorResponse`] boundary envelope
//! - **Constants**: fee schedule, gateway thresholds, batch sizing

pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod ids;
pub mod merchant;
pub mod page;
pub mod reference;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use payrail_types::{Merchant, Transaction, SettlementBatch, ...};

pub use batch::*;
pub use config::*;
pub use error::*;
pub use gateway::*;
pub use ids::*;
pub use merchant::*;
pub use page::*;
pub use transaction::*;

// Constants are accessed via `payrail_types::constants::FOO` and reference
// generators via `payrail_types::reference::generate_*` (not re-exported
// to keep call sites explicit).
