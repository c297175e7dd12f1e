//! Error types for the PayRail engine.
//!
//! All errors use the `PAY_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by subsystem:
//! - 1xx: Merchant errors
//! - 2xx: Transaction errors
//! - 3xx: Lock errors
//! - 4xx: Settlement errors
//! - 9xx: General / internal errors
//!
//! Every error additionally carries a stable machine code
//! ([`PayrailError::error_code`]) and an HTTP-equivalent class
//! ([`PayrailError::class`]); the boundary turns any error into an
//! [`ErrorResponse`] envelope with a freshly generated correlation
//! reference so operators can trace even unmodeled failures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::MerchantId;
use crate::reference;

/// Central error enum for all PayRail operations.
#[derive(Debug, Error)]
pub enum PayrailError {
    // =================================================================
    // Merchant Errors (1xx)
    // =================================================================
    /// No merchant record exists for this id.
    #[error("PAY_ERR_100: Merchant {0} not found")]
    MerchantNotFound(MerchantId),

    /// A merchant with this email is already registered.
    #[error("PAY_ERR_101: Merchant with email {0} already exists")]
    MerchantEmailExists(String),

    /// The merchant exists but is not ACTIVE.
    #[error("PAY_ERR_102: Merchant {0} is not active")]
    MerchantInactive(MerchantId),

    // =================================================================
    // Transaction Errors (2xx)
    // =================================================================
    /// No transaction matches the given reference or id.
    #[error("PAY_ERR_200: Transaction {0} not found")]
    TransactionNotFound(String),

    /// A transaction with this merchant reference was already persisted;
    /// the idempotency key is burned.
    #[error("PAY_ERR_201: Transaction with merchant reference {0} already exists")]
    TransactionAlreadyExists(String),

    /// Another initiation for this merchant reference holds the lock.
    #[error("PAY_ERR_202: Transaction with merchant reference {0} is already in progress")]
    TransactionInProgress(String),

    /// The amount failed the gateway's basic sanity check.
    #[error("PAY_ERR_203: Invalid transaction amount: {0}")]
    InvalidAmount(Decimal),

    /// One or more request fields failed validation; all failures are
    /// aggregated into a single error.
    #[error("PAY_ERR_204: Validation failed: {}", messages.join("; "))]
    Validation { messages: Vec<String> },

    // =================================================================
    // Lock Errors (3xx)
    // =================================================================
    /// The distributed lock for this key is currently held.
    #[error("PAY_ERR_300: Lock already held for key {0}")]
    LockHeld(String),

    // =================================================================
    // Settlement Errors (4xx)
    // =================================================================
    /// No settlement batch matches the given reference.
    #[error("PAY_ERR_400: Settlement batch {0} not found")]
    SettlementBatchNotFound(String),

    /// Nothing to settle for this merchant right now.
    #[error("PAY_ERR_401: No unsettled transactions found for merchant {0}")]
    NoUnsettledTransactions(MerchantId),

    /// Settlement batch construction failed; committed chunks stay committed.
    #[error("PAY_ERR_402: Settlement processing failed: {reason}")]
    SettlementProcessing { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PAY_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (bad cron expression, unknown timezone, etc.).
    #[error("PAY_ERR_901: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PayrailError>;

/// HTTP-equivalent severity class of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    InvalidInput,
    ProcessingError,
    Internal,
}

impl ErrorClass {
    /// Numeric HTTP status the boundary maps this class to.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InvalidInput => 400,
            Self::ProcessingError | Self::Internal => 500,
        }
    }

    /// Reason phrase matching [`Self::http_status`].
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::InvalidInput => "Bad Request",
            Self::ProcessingError | Self::Internal => "Internal Server Error",
        }
    }
}

impl PayrailError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MerchantNotFound(_) => "MERCHANT_NOT_FOUND",
            Self::MerchantEmailExists(_) => "MERCHANT_EMAIL_EXISTS",
            Self::MerchantInactive(_) => "MERCHANT_INACTIVE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::TransactionAlreadyExists(_) => "TRANSACTION_ALREADY_EXISTS",
            Self::TransactionInProgress(_) => "TRANSACTION_IN_PROGRESS",
            Self::InvalidAmount(_) => "INVALID_TRANSACTION_AMOUNT",
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::LockHeld(_) => "LOCK_HELD",
            Self::SettlementBatchNotFound(_) => "SETTLEMENT_BATCH_NOT_FOUND",
            Self::NoUnsettledTransactions(_) => "NO_UNSETTLED_TRANSACTIONS",
            Self::SettlementProcessing { .. } => "SETTLEMENT_PROCESSING_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// HTTP-equivalent class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MerchantNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::SettlementBatchNotFound(_)
            | Self::NoUnsettledTransactions(_) => ErrorClass::NotFound,
            Self::MerchantEmailExists(_)
            | Self::TransactionAlreadyExists(_)
            | Self::TransactionInProgress(_)
            | Self::LockHeld(_) => ErrorClass::Conflict,
            Self::MerchantInactive(_) | Self::InvalidAmount(_) | Self::Validation { .. } => {
                ErrorClass::InvalidInput
            }
            Self::SettlementProcessing { .. } => ErrorClass::ProcessingError,
            Self::Internal(_) | Self::Configuration(_) => ErrorClass::Internal,
        }
    }
}

/// Uniform error envelope returned at the boundary. Carries a freshly
/// generated correlation reference for operator trace-back; internal detail
/// beyond the error message is never included.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    pub error_code: &'static str,
    pub reference: String,
}

impl From<&PayrailError> for ErrorResponse {
    fn from(err: &PayrailError) -> Self {
        let class = err.class();
        Self {
            timestamp: Utc::now(),
            success: false,
            status: class.http_status(),
            error: class.reason(),
            message: err.to_string(),
            error_code: err.error_code(),
            reference: reference::generate_error_ref(),
        }
    }
}
