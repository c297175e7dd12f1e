//! # payrail-settlement
//!
//! Settlement plane: the per-merchant batch processor, the cron-driven
//! scheduler that triggers fleet sweeps, and read-only reporting.
//!
//! ## Sweep shape
//!
//! ```text
//! scheduler (cron, tz) -> processor.run_all()
//!   per ACTIVE merchant, under "settlement:{merchant_id}":
//!     list unsettled (SUCCESS, unbatched, oldest first)
//!     chunk by SETTLEMENT_BATCH_SIZE -> insert batch -> attach each txn
//! ```
//!
//! Committed batches are never rolled back; a failed chunk leaves its
//! transactions unbatched for the next run.

pub mod processor;
pub mod reporting;
pub mod scheduler;

pub use processor::{SettlementProcessor, SettlementRunReport, SETTLEMENT_LOCK_PREFIX};
pub use reporting::{BatchSummary, SettlementReporting, SettlementSummary};
pub use scheduler::{SchedulerHandle, SettlementScheduler};
