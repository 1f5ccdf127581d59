//! ACK Manager module - retry timing for unanswered commands
//!
//! Each dispatched command owns a fresh [`RetransmissionState`]: it counts
//! sends against the retry budget and hands out exponentially growing
//! pauses between them, starting from the floor again for every command.

use std::time::Duration;

use crate::config::SessionConfig;

/// Exponential backoff with a cap
///
/// `next()` returns the current delay, then doubles it up to `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    current: Duration,
    cap: Duration,
}

impl Backoff {
    pub fn new(floor: Duration, cap: Duration) -> Self {
        Self { current: floor, cap }
    }

    /// Delay to use for the upcoming retry
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Return the current delay and advance to the next one
    pub fn next(&mut self) -> Duration {
        let delay = self.current;
        self.current = delay
            .saturating_mul(crate::BACKOFF_MULTIPLIER)
            .min(self.cap);
        delay
    }
}

/// Retry bookkeeping for a single dispatched command
///
/// A command may be sent `max_retries + 1` times in total.
#[derive(Debug, Clone)]
pub struct RetransmissionState {
    /// Sequence number shared by every send of this command
    pub sequence_number: u32,

    /// Sends performed so far
    pub attempts: u32,

    max_retries: u32,
    backoff: Backoff,
}

impl RetransmissionState {
    pub fn new(sequence_number: u32, config: &SessionConfig) -> Self {
        Self {
            sequence_number,
            attempts: 0,
            max_retries: config.max_retries,
            backoff: Backoff::new(config.initial_backoff, config.max_backoff),
        }
    }

    /// Count a send and return its 1-based attempt number
    pub fn record_send(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Whether the budget allows no further send
    pub fn is_exhausted(&self) -> bool {
        self.attempts > self.max_retries
    }

    /// Delay before the next send
    pub fn next_delay(&mut self) -> Duration {
        self.backoff.next()
    }
}
