//! Business reference generators.
//!
//! References are collision-resistant, sortable, and human-readable: a
//! fixed prefix, a UTC timestamp (`yyyyMMddHHmmss`), and an uppercase
//! random hex suffix. They are what operators and merchants see in logs
//! and reconciliation files; the UUIDv7 types in [`crate::ids`] remain the
//! primary keys.
//!
//! Stateless by construction: no shared mutable state, safe to call from
//! any thread.

use chrono::Utc;
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Generate a system-internal transaction reference, e.g.
/// `TXN20260823094512A1B2C3D4`.
#[must_use]
pub fn generate_internal_ref() -> String {
    format!("TXN{}{}", Utc::now().format(TIMESTAMP_FORMAT), suffix(8))
}

/// Generate a settlement batch reference, e.g. `BATCH20260823094512A1B2C3`.
#[must_use]
pub fn generate_batch_ref() -> String {
    format!("BATCH{}{}", Utc::now().format(TIMESTAMP_FORMAT), suffix(6))
}

/// Generate a merchant reference assigned at registration, e.g.
/// `MERCH20260823094512A1B2C3`.
#[must_use]
pub fn generate_merchant_ref() -> String {
    format!("MERCH{}{}", Utc::now().format(TIMESTAMP_FORMAT), suffix(6))
}

/// Generate a correlation reference attached to every error response,
/// e.g. `REF-A1B2C3D4`. Operators grep logs by this value.
#[must_use]
pub fn generate_error_ref() -> String {
    format!("REF-{}", suffix(8))
}

fn suffix(len: usize) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..len].to_uppercase()
}
