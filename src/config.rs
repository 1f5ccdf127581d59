//! Session configuration
//!
//! Passed once to [`crate::create_session`] and threaded through every
//! dispatched command.

use std::time::Duration;

use crate::errors::{Result, ViscaError};

/// Retry budget, deadlines and diagnostics for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Resends allowed per command after the first send
    pub max_retries: u32,

    /// Deadline for each write, and for each attempt's wait for a terminal response
    pub timeout: Duration,

    /// Log every stale, ACK and completion response at debug level
    pub debug: bool,

    /// First pause between retries of a command
    pub initial_backoff: Duration,

    /// Upper bound for the pause between retries
    pub max_backoff: Duration,
}

impl SessionConfig {
    /// Create a configuration with the protocol defaults
    pub fn new() -> Self {
        Self {
            max_retries: crate::DEFAULT_MAX_RETRIES,
            timeout: Duration::from_millis(crate::DEFAULT_TIMEOUT_MS),
            debug: false,
            initial_backoff: Duration::from_millis(crate::INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(crate::MAX_BACKOFF_MS),
        }
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the backoff floor and cap
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Check the configuration before any I/O happens
    ///
    /// # Errors
    /// `InvalidConfig` for a zero timeout or a backoff floor above its cap
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(ViscaError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(ViscaError::InvalidConfig(format!(
                "initial backoff {:?} exceeds max backoff {:?}",
                self.initial_backoff, self.max_backoff
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
