//! Merchant directory service.
//!
//! The only source of "is this merchant allowed to transact": transaction
//! initiation and settlement both resolve merchants through
//! [`MerchantService::active`].

use std::sync::Arc;

use payrail_store::MerchantStore;
use payrail_types::{Merchant, MerchantId, MerchantStatus, PayrailError, Result};

/// Registration request.
#[derive(Debug, Clone)]
pub struct CreateMerchant {
    pub business_name: String,
    pub email: String,
    pub settlement_account: String,
}

/// CRUD + status lookup over the merchant store.
pub struct MerchantService {
    store: Arc<dyn MerchantStore>,
}

impl MerchantService {
    #[must_use]
    pub fn new(store: Arc<dyn MerchantStore>) -> Self {
        Self { store }
    }

    /// Register a new ACTIVE merchant.
    ///
    /// # Errors
    /// `Validation` with all failing fields aggregated, or
    /// `MerchantEmailExists` on a duplicate email.
    pub fn register(&self, request: &CreateMerchant) -> Result<Merchant> {
        Self::validate(request)?;

        if self.store.find_by_email(&request.email).is_some() {
            return Err(PayrailError::MerchantEmailExists(request.email.clone()));
        }

        let merchant = Merchant::new(
            request.business_name.clone(),
            request.email.clone(),
            request.settlement_account.clone(),
        );
        let saved = self.store.insert(merchant)?;
        tracing::info!(merchant = %saved.id, merchant_ref = %saved.merchant_ref, "merchant registered");
        Ok(saved)
    }

    /// Lookup by id regardless of status.
    pub fn get(&self, id: MerchantId) -> Result<Merchant> {
        self.store
            .find_by_id(id)
            .ok_or(PayrailError::MerchantNotFound(id))
    }

    /// Resolve a merchant that must be ACTIVE.
    ///
    /// # Errors
    /// `MerchantNotFound` if no record exists, `MerchantInactive` if the
    /// record exists but is not ACTIVE.
    pub fn active(&self, id: MerchantId) -> Result<Merchant> {
        if let Some(merchant) = self.store.find_active(id) {
            return Ok(merchant);
        }
        // Distinguish a missing record from a deactivated one.
        match self.store.find_by_id(id) {
            Some(_) => Err(PayrailError::MerchantInactive(id)),
            None => Err(PayrailError::MerchantNotFound(id)),
        }
    }

    /// All ACTIVE merchants, oldest first (settlement iteration order).
    #[must_use]
    pub fn list_active(&self) -> Vec<Merchant> {
        self.store.list_by_status(MerchantStatus::Active)
    }

    /// Flip a merchant's status.
    pub fn set_status(&self, id: MerchantId, status: MerchantStatus) -> Result<Merchant> {
        let updated = self.store.update_status(id, status)?;
        tracing::info!(merchant = %id, status = %status, "merchant status updated");
        Ok(updated)
    }

    fn validate(request: &CreateMerchant) -> Result<()> {
        let mut messages = Vec::new();
        if request.business_name.trim().is_empty() {
            messages.push("business name must not be empty".to_owned());
        }
        if request.email.trim().is_empty() || !request.email.contains('@') {
            messages.push("email must be a valid address".to_owned());
        }
        if request.settlement_account.trim().is_empty() {
            messages.push("settlement account must not be empty".to_owned());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(PayrailError::Validation { messages })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payrail_store::InMemoryMerchantStore;

    fn service() -> MerchantService {
        MerchantService::new(Arc::new(InMemoryMerchantStore::new()))
    }

    fn request(email: &str) -> CreateMerchant {
        CreateMerchant {
            business_name: "Acme Ltd".to_owned(),
            email: email.to_owned(),
            settlement_account: "ACC-001".to_owned(),
        }
    }

    #[test]
    fn register_creates_active_merchant() {
        let svc = service();
        let m = svc.register(&request("a@b.com")).unwrap();
        assert!(m.is_active());
        assert!(m.merchant_ref.starts_with("MERCH"));
        assert_eq!(svc.get(m.id).unwrap().email, "a@b.com");
    }

    #[test]
    fn duplicate_email_conflicts() {
        let svc = service();
        svc.register(&request("a@b.com")).unwrap();
        let err = svc.register(&request("a@b.com")).unwrap_err();
        assert!(matches!(err, PayrailError::MerchantEmailExists(_)));
    }

    #[test]
    fn validation_failures_are_aggregated() {
        let svc = service();
        let bad = CreateMerchant {
            business_name: "  ".to_owned(),
            email: "not-an-email".to_owned(),
            settlement_account: String::new(),
        };
        let err = svc.register(&bad).unwrap_err();
        match err {
            PayrailError::Validation { messages } => assert_eq!(messages.len(), 3),
            other => panic!("expected Validation, got {other}"),
        }
    }

    #[test]
    fn active_distinguishes_missing_from_inactive() {
        let svc = service();
        let missing = svc.active(MerchantId::new()).unwrap_err();
        assert!(matches!(missing, PayrailError::MerchantNotFound(_)));

        let m = svc.register(&request("a@b.com")).unwrap();
        svc.set_status(m.id, MerchantStatus::Inactive).unwrap();
        let inactive = svc.active(m.id).unwrap_err();
        assert!(matches!(inactive, PayrailError::MerchantInactive(_)));
        // Plain lookup still works.
        assert!(svc.get(m.id).is_ok());
    }

    #[test]
    fn list_active_excludes_inactive() {
        let svc = service();
        let a = svc.register(&request("a@b.com")).unwrap();
        let b = svc.register(&request("b@b.com")).unwrap();
        svc.set_status(b.id, MerchantStatus::Inactive).unwrap();

        let active = svc.list_active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);
    }
}
