//! Merchant store contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use payrail_types::{Merchant, MerchantId, MerchantStatus, PayrailError, Result};

/// Merchant persistence contract.
pub trait MerchantStore: Send + Sync {
    /// Insert a new merchant. Fails with `MerchantEmailExists` if the email
    /// is already registered.
    fn insert(&self, merchant: Merchant) -> Result<Merchant>;

    fn find_by_id(&self, id: MerchantId) -> Option<Merchant>;

    fn find_by_email(&self, email: &str) -> Option<Merchant>;

    /// Lookup by (status = ACTIVE, id) in one query.
    fn find_active(&self, id: MerchantId) -> Option<Merchant>;

    /// All merchants with the given status, oldest first.
    fn list_by_status(&self, status: MerchantStatus) -> Vec<Merchant>;

    /// Partial update: touches only `status` and `updated_at`.
    fn update_status(&self, id: MerchantId, status: MerchantStatus) -> Result<Merchant>;
}

/// In-memory [`MerchantStore`].
pub struct InMemoryMerchantStore {
    rows: RwLock<HashMap<MerchantId, Merchant>>,
}

impl InMemoryMerchantStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryMerchantStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MerchantStore for InMemoryMerchantStore {
    fn insert(&self, merchant: Merchant) -> Result<Merchant> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        if rows.values().any(|m| m.email == merchant.email) {
            return Err(PayrailError::MerchantEmailExists(merchant.email));
        }
        rows.insert(merchant.id, merchant.clone());
        Ok(merchant)
    }

    fn find_by_id(&self, id: MerchantId) -> Option<Merchant> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<Merchant> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|m| m.email == email)
            .cloned()
    }

    fn find_active(&self, id: MerchantId) -> Option<Merchant> {
        self.find_by_id(id).filter(Merchant::is_active)
    }

    fn list_by_status(&self, status: MerchantStatus) -> Vec<Merchant> {
        let mut merchants: Vec<Merchant> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|m| m.status == status)
            .cloned()
            .collect();
        merchants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        merchants
    }

    fn update_status(&self, id: MerchantId, status: MerchantStatus) -> Result<Merchant> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let merchant = rows
            .get_mut(&id)
            .ok_or(PayrailError::MerchantNotFound(id))?;
        merchant.status = status;
        merchant.updated_at = Some(Utc::now());
        Ok(merchant.clone())
    }
}
