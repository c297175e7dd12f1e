//! Distributed lock manager over the key-value store.
//!
//! Provides per-key mutual exclusion with a TTL safety net: if the process
//! crashes while holding a lock, the entry self-clears after the TTL,
//! bounding unavailability. Acquisition is fast-reject (a plain read)
//! followed by atomic set-if-absent; both paths fail with
//! [`PayrailError::LockHeld`] when the key is taken.
//!
//! Two execute patterns:
//! - [`LockManager::run_exclusive`] deletes the key on exit (success or
//!   failure), so a failed attempt can be retried without waiting out the
//!   TTL.
//! - [`LockManager::run_exclusive_marked`] overwrites the key with a
//!   terminal `COMPLETED`/`FAILED` marker and lets it expire naturally,
//!   keeping a short-lived trace of the outcome.
//!
//! This is available, coordinator-free exclusion, not linearizable across
//! lock-store failover. Callers must treat it as best-effort and rely on
//! persistence-layer uniqueness as the true idempotency backstop.

use std::sync::Arc;
use std::time::Duration;

use payrail_store::KeyValueStore;
use payrail_types::{LockConfig, PayrailError, Result};

/// Value a key holds while the protected section runs.
pub const LOCK_SENTINEL: &str = "LOCKED";
/// Terminal marker written by the marked variant on success.
pub const LOCK_COMPLETED: &str = "COMPLETED";
/// Terminal marker written by the marked variant on failure.
pub const LOCK_FAILED: &str = "FAILED";

/// Per-key mutual exclusion over a [`KeyValueStore`].
pub struct LockManager {
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl LockManager {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &LockConfig) -> Self {
        Self {
            kv,
            ttl: config.ttl(),
        }
    }

    /// Run `f` while holding the lock for `key`; delete the key on exit.
    ///
    /// # Errors
    /// Fails with [`PayrailError::LockHeld`] if the key is currently held;
    /// otherwise returns `f`'s result.
    pub fn run_exclusive<T>(&self, key: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.acquire(key)?;
        tracing::debug!(key, "executing under lock");
        let result = f();

        // Cleanup on both paths: a failed attempt must be retryable
        // without waiting for the TTL.
        self.kv.delete(key);
        match &result {
            Ok(_) => tracing::debug!(key, "lock released after success"),
            Err(err) => tracing::warn!(key, %err, "lock released after failure"),
        }
        result
    }

    /// Run `f` while holding the lock for `key`; overwrite the key with a
    /// terminal status marker and let it expire naturally.
    ///
    /// # Errors
    /// Fails with [`PayrailError::LockHeld`] if the key is currently held;
    /// otherwise returns `f`'s result.
    pub fn run_exclusive_marked<T>(&self, key: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.acquire(key)?;
        tracing::debug!(key, "executing under lock (marked)");
        let result = f();

        match &result {
            Ok(_) => self.kv.set(key, LOCK_COMPLETED, self.ttl),
            Err(_) => self.kv.set(key, LOCK_FAILED, self.ttl),
        }
        result
    }

    /// Fast-reject read, then atomic set-if-absent with TTL.
    fn acquire(&self, key: &str) -> Result<()> {
        if self.kv.get(key).is_some() {
            tracing::warn!(key, "lock already held");
            return Err(PayrailError::LockHeld(key.to_owned()));
        }
        if !self.kv.set_if_absent(key, LOCK_SENTINEL, self.ttl) {
            tracing::warn!(key, "lost acquisition race");
            return Err(PayrailError::LockHeld(key.to_owned()));
        }
        Ok(())
    }
}
