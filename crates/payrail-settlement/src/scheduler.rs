//! Scheduled settlement runs.
//!
//! Fires the fleet sweep on a cron schedule evaluated in a configured
//! timezone. The schedule is data, not code: a 6-field cron expression and
//! an IANA timezone name, validated up front so a typo fails at startup
//! rather than silently never firing.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use payrail_types::{PayrailError, Result, ScheduleConfig};

use crate::processor::{SettlementProcessor, SettlementRunReport};

/// Poll interval while waiting for the next fire time.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Cron-driven settlement runner.
pub struct SettlementScheduler {
    processor: Arc<SettlementProcessor>,
    config: ScheduleConfig,
}

impl SettlementScheduler {
    #[must_use]
    pub fn new(processor: Arc<SettlementProcessor>, config: ScheduleConfig) -> Self {
        Self { processor, config }
    }

    /// Parsed cron schedule.
    ///
    /// # Errors
    /// `Configuration` for a malformed cron expression.
    pub fn schedule(&self) -> Result<Schedule> {
        Schedule::from_str(&self.config.interval).map_err(|err| {
            PayrailError::Configuration(format!(
                "invalid cron expression {:?}: {err}",
                self.config.interval
            ))
        })
    }

    /// Parsed timezone the schedule fires in.
    ///
    /// # Errors
    /// `Configuration` for an unknown IANA timezone name.
    pub fn timezone(&self) -> Result<Tz> {
        Tz::from_str(&self.config.timezone).map_err(|_| {
            PayrailError::Configuration(format!("unknown timezone {:?}", self.config.timezone))
        })
    }

    /// Next fire time strictly after `now`, in UTC.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        let schedule = self.schedule()?;
        let tz = self.timezone()?;
        Ok(schedule
            .after(&now.with_timezone(&tz))
            .next()
            .map(|t| t.with_timezone(&Utc)))
    }

    /// Run the fleet sweep once, honoring the enable flag. A disabled
    /// schedule is a no-op, not an error.
    pub fn run_once(&self) -> Option<SettlementRunReport> {
        if !self.config.enabled {
            tracing::info!("scheduled settlement is disabled, skipping run");
            return None;
        }
        Some(self.processor.run_all())
    }

    /// Start the scheduler on a background thread.
    ///
    /// # Errors
    /// `Configuration` if the cron expression or timezone is invalid.
    pub fn spawn(self: Arc<Self>) -> Result<SchedulerHandle> {
        // Fail fast on bad config before the thread exists.
        self.schedule()?;
        self.timezone()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || self.run_loop(&flag));
        Ok(SchedulerHandle { handle, shutdown })
    }

    fn run_loop(&self, shutdown: &AtomicBool) {
        tracing::info!(
            interval = %self.config.interval,
            timezone = %self.config.timezone,
            enabled = self.config.enabled,
            "settlement scheduler started"
        );

        while !shutdown.load(Ordering::Relaxed) {
            let next = match self.next_run_after(Utc::now()) {
                Ok(Some(next)) => next,
                Ok(None) => {
                    tracing::warn!("schedule has no future fire times, stopping");
                    return;
                }
                // Config was validated at spawn; a parse failure here means
                // it changed out from under us.
                Err(err) => {
                    tracing::error!(%err, "schedule became invalid, stopping");
                    return;
                }
            };

            tracing::debug!(next = %next, "waiting for next settlement run");
            while Utc::now() < next {
                if shutdown.load(Ordering::Relaxed) {
                    tracing::info!("settlement scheduler stopped");
                    return;
                }
                thread::sleep(SHUTDOWN_POLL);
            }

            self.run_once();
        }
        tracing::info!("settlement scheduler stopped");
    }
}

/// Handle to a running scheduler thread.
pub struct SchedulerHandle {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

impl SchedulerHandle {
    /// Signal the scheduler to stop and wait for the thread to exit. An
    /// in-flight settlement run completes first.
    pub fn shutdown(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // The thread only panics if a sweep panics; surface that.
        if self.handle.join().is_err() {
            tracing::error!("settlement scheduler thread panicked");
        }
    }
}
