//! Payment gateway response shapes.
//!
//! The gateway itself is simulated (see `payrail-payments`); these types
//! model the full response surface a real acquirer integration would
//! return, so the processor's status mapping is written once against the
//! real shape.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome reported by the (simulated) payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Success,
    Failed,
    Declined,
    InsufficientFunds,
    InvalidAccount,
    Timeout,
    GatewayError,
}

impl PaymentStatus {
    /// Any non-SUCCESS gateway status maps the transaction to FAILED.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Declined => "DECLINED",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::InvalidAccount => "INVALID_ACCOUNT",
            Self::Timeout => "TIMEOUT",
            Self::GatewayError => "GATEWAY_ERROR",
        };
        write!(f, "{s}")
    }
}

/// Response from a customer debit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub status: PaymentStatus,
    /// Gateway-side transaction identifier; present on success only.
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub fee: Decimal,
    pub message: String,
    pub gateway_reference: String,
    pub error_code: Option<String>,
}
