//! Merchant directory records.
//!
//! A merchant's `status` is the single source of truth for whether it may
//! initiate transactions or be included in scheduled settlement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::MerchantId;
use crate::reference;

/// Lifecycle status of a merchant account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MerchantStatus {
    Active,
    Inactive,
}

impl fmt::Display for MerchantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// A registered merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: MerchantId,
    pub business_name: String,
    /// Globally unique; enforced by the merchant store at insert.
    pub email: String,
    /// Account that settlement payouts are wired to.
    pub settlement_account: String,
    /// System-assigned business reference (`MERCH…`), globally unique.
    pub merchant_ref: String,
    pub status: MerchantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Merchant {
    /// Create a new ACTIVE merchant with a generated merchant reference.
    #[must_use]
    pub fn new(
        business_name: impl Into<String>,
        email: impl Into<String>,
        settlement_account: impl Into<String>,
    ) -> Self {
        Self {
            id: MerchantId::new(),
            business_name: business_name.into(),
            email: email.into(),
            settlement_account: settlement_account.into(),
            merchant_ref: reference::generate_merchant_ref(),
            status: MerchantStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MerchantStatus::Active
    }
}
