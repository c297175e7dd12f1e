//! Key-value lock store contract and in-memory implementation.
//!
//! The contract is the minimal surface the distributed lock manager needs:
//! `get`, atomic `set_if_absent` with TTL, unconditional `set` with TTL,
//! and `delete`. A production deployment points this at Redis; the
//! in-memory store below provides the same semantics (including TTL
//! expiry) for tests and single-node operation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Key-value store with TTL semantics. Mutation is restricted to the
/// compare-and-set primitive plus terminal overwrite and delete, so no
/// other component can corrupt lock state.
pub trait KeyValueStore: Send + Sync {
    /// Current value for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Atomically set `key` to `value` with a TTL iff the key is absent.
    /// Returns `true` if the value was set, `false` if the key already
    /// existed (and is not expired).
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> bool;

    /// Unconditionally set `key` to `value` with a TTL.
    fn set(&self, key: &str, value: &str, ttl: Duration);

    /// Remove `key` immediately.
    fn delete(&self, key: &str);
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory [`KeyValueStore`] with lazy TTL expiry: expired entries are
/// dropped on the next access to their key.
pub struct InMemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> bool {
        let mut entries = self.lock();
        if let Some(entry) = entries.get(key) {
            if !entry.expired() {
                return false;
            }
        }
        entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: Instant::now() + ttl,
            },
        );
        true
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        self.lock().insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn delete(&self, key: &str) {
        self.lock().remove(key);
    }
}
