// ── Runtime session configuration ──
//
// These types describe *how* a command session behaves: status cadence
// and the reconnect schedule. They never touch disk; sfa-config builds a
// `SessionConfig` from its TOML profile and hands it in.

use std::time::Duration;

use sfa_libbox::{Command, CommandClientOptions, DEFAULT_STATUS_INTERVAL_NANOS};

use crate::error::CoreError;

/// Bounded linear reconnect schedule.
///
/// Attempt `i` (1-indexed) waits `base_delay + i * step` before trying,
/// so the defaults give 150ms, 200ms, ... 600ms over ten attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            step: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt` (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay + self.step * attempt
    }

    /// Every delay of the schedule, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.max_attempts).map(|attempt| self.delay_for(attempt))
    }
}

/// Configuration for one command session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How often the engine pushes status on a Status session.
    pub status_interval: Duration,
    /// Reconnect schedule for each `connect()`.
    pub retry: RetryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_nanos(DEFAULT_STATUS_INTERVAL_NANOS.unsigned_abs()),
            retry: RetryPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.retry.max_attempts == 0 {
            return Err(CoreError::Config {
                message: "retry.max_attempts must be at least 1".into(),
            });
        }
        if self.status_interval.is_zero() {
            return Err(CoreError::Config {
                message: "status interval must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Engine options for a session of kind `command`.
    pub fn options_for(&self, command: Command) -> CommandClientOptions {
        let nanos = i64::try_from(self.status_interval.as_nanos()).unwrap_or(i64::MAX);
        CommandClientOptions::new(command).with_status_interval(nanos)
    }
}
