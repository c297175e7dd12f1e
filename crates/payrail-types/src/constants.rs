//! System-wide constants for the PayRail engine.
//!
//! Decimal-valued constants are functions because `Decimal::new` is not a
//! `const fn`.

use rust_decimal::Decimal;

/// Transactions per settlement batch. Deliberately small so the multi-batch
/// path is exercised even with modest transaction counts; a high-throughput
/// deployment would replace the per-chunk relational write with a
/// streamed/queued ingestion design.
pub const SETTLEMENT_BATCH_SIZE: usize = 5;

/// Default distributed-lock TTL in seconds. The safety net for process
/// crashes while holding a lock: an abandoned lock self-clears after this
/// long, bounding unavailability.
pub const DEFAULT_LOCK_TTL_SECS: u64 = 300;

/// Simulated gateway latency in milliseconds.
pub const DEFAULT_GATEWAY_LATENCY_MS: u64 = 100;

/// Required currency code length (ISO 4217 alpha).
pub const CURRENCY_CODE_LEN: usize = 3;

/// Fee scale: all fees are carried at 2 decimal places.
pub const FEE_SCALE: u32 = 2;

/// Platform fee rate applied per transaction (1.5%).
#[must_use]
pub fn fee_rate() -> Decimal {
    Decimal::new(15, 3)
}

/// Per-transaction fee cap (200.00).
#[must_use]
pub fn max_fee() -> Decimal {
    Decimal::new(20000, 2)
}

/// Amounts strictly above this are declined by the simulated gateway.
#[must_use]
pub fn decline_threshold() -> Decimal {
    Decimal::new(10_000, 0)
}

/// Amounts strictly below this fail with insufficient funds.
#[must_use]
pub fn min_debit_amount() -> Decimal {
    Decimal::new(10, 0)
}

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "PayRail";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_rate_is_one_point_five_percent() {
        assert_eq!(fee_rate() * Decimal::new(100, 0), Decimal::new(15, 1));
    }

    #[test]
    fn thresholds_are_consistent() {
        assert!(min_debit_amount() < decline_threshold());
        assert!(max_fee() > Decimal::ZERO);
    }
}
