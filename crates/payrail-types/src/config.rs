//! Configuration types for the PayRail engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants;

/// Distributed-lock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Time-to-live on lock entries, in seconds. Bounds how long a crashed
    /// holder can block others.
    pub ttl_secs: u64,
}

impl LockConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl_secs: constants::DEFAULT_LOCK_TTL_SECS,
        }
    }
}

/// Scheduled settlement run configuration: a cron expression, the timezone
/// it is evaluated in, and an enable flag. Disabling the schedule makes
/// runs a no-op, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 6-field cron expression (seconds granularity).
    pub interval: String,
    /// IANA timezone name the cron expression fires in.
    pub timezone: String,
    pub enabled: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            // 09:00 and 18:00 every day.
            interval: "0 0 9,18 * * *".to_string(),
            timezone: "UTC".to_string(),
            enabled: true,
        }
    }
}
