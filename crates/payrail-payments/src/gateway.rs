//! Simulated customer debit gateway.
//!
//! Deterministic, amount-based stand-in for a real acquirer integration:
//! amounts strictly above 10 000 are declined, amounts strictly below 10
//! fail with insufficient funds, everything else succeeds. The fixed
//! latency models network round-trip time.

use std::thread;
use std::time::Duration;

use rust_decimal::Decimal;

use payrail_types::constants;
use payrail_types::reference::generate_internal_ref;
use payrail_types::{PaymentResponse, PaymentStatus, PayrailError, Result};

/// Amount-based debit simulator.
pub struct DebitGateway {
    latency: Duration,
}

impl DebitGateway {
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(constants::DEFAULT_GATEWAY_LATENCY_MS),
        }
    }

    /// Simulator with an explicit latency; tests use `Duration::ZERO`.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    /// Attempt to debit the customer.
    ///
    /// # Errors
    /// Fails with [`PayrailError::InvalidAmount`] for non-positive amounts;
    /// all other outcomes are expressed in the returned
    /// [`PaymentResponse`], never as an error.
    pub fn charge(&self, amount: Decimal, fee: Decimal, currency: &str) -> Result<PaymentResponse> {
        if amount <= Decimal::ZERO {
            return Err(PayrailError::InvalidAmount(amount));
        }

        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        let response = if amount > constants::decline_threshold() {
            PaymentResponse {
                success: false,
                status: PaymentStatus::Declined,
                transaction_id: None,
                amount,
                currency: currency.to_owned(),
                fee,
                message: "Transaction declined due to high amount".to_owned(),
                gateway_reference: generate_internal_ref(),
                error_code: Some("AMOUNT_LIMIT_EXCEEDED".to_owned()),
            }
        } else if amount < constants::min_debit_amount() {
            PaymentResponse {
                success: false,
                status: PaymentStatus::InsufficientFunds,
                transaction_id: None,
                amount,
                currency: currency.to_owned(),
                fee,
                message: "Insufficient funds in customer account".to_owned(),
                gateway_reference: generate_internal_ref(),
                error_code: Some("INSUFFICIENT_FUNDS".to_owned()),
            }
        } else {
            PaymentResponse {
                success: true,
                status: PaymentStatus::Success,
                transaction_id: Some(generate_internal_ref()),
                amount,
                currency: currency.to_owned(),
                fee,
                message: "Payment processed successfully".to_owned(),
                gateway_reference: generate_internal_ref(),
                error_code: None,
            }
        };
        Ok(response)
    }
}

impl Default for DebitGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> DebitGateway {
        DebitGateway::with_latency(Duration::ZERO)
    }

    fn charge(amount: Decimal) -> PaymentResponse {
        gateway()
            .charge(amount, Decimal::new(150, 2), "USD")
            .unwrap()
    }

    #[test]
    fn mid_range_amount_succeeds() {
        let resp = charge(Decimal::new(10000, 2)); // 100.00
        assert!(resp.success);
        assert_eq!(resp.status, PaymentStatus::Success);
        assert!(resp.transaction_id.is_some());
        assert!(resp.error_code.is_none());
    }

    #[test]
    fn boundary_exactly_ten_thousand_succeeds() {
        // The decline rule is strictly greater-than.
        let resp = charge(Decimal::new(1_000_000, 2)); // 10000.00
        assert_eq!(resp.status, PaymentStatus::Success);
    }

    #[test]
    fn above_ten_thousand_is_declined() {
        let resp = charge(Decimal::new(1_000_001, 2)); // 10000.01
        assert!(!resp.success);
        assert_eq!(resp.status, PaymentStatus::Declined);
        assert_eq!(resp.error_code.as_deref(), Some("AMOUNT_LIMIT_EXCEEDED"));
    }

    #[test]
    fn boundary_exactly_ten_succeeds() {
        let resp = charge(Decimal::new(1000, 2)); // 10.00
        assert_eq!(resp.status, PaymentStatus::Success);
    }

    #[test]
    fn below_ten_is_insufficient_funds() {
        let resp = charge(Decimal::new(999, 2)); // 9.99
        assert!(!resp.success);
        assert_eq!(resp.status, PaymentStatus::InsufficientFunds);
        assert_eq!(resp.error_code.as_deref(), Some("INSUFFICIENT_FUNDS"));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let err = gateway()
            .charge(Decimal::ZERO, Decimal::ZERO, "USD")
            .unwrap_err();
        assert!(matches!(err, PayrailError::InvalidAmount(_)));

        let err = gateway()
            .charge(Decimal::new(-500, 2), Decimal::ZERO, "USD")
            .unwrap_err();
        assert!(matches!(err, PayrailError::InvalidAmount(_)));
    }
}
