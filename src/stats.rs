//! Delivery statistics for one session

use std::fmt;

/// Counters accumulated by the dispatcher for the life of a session
///
/// Only the dispatcher increments them; they are never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    missed_responses: u64,
    timeouts: u64,
}

impl Stats {
    /// Read deadlines that expired without a terminal response
    pub fn missed_responses(&self) -> u64 {
        self.missed_responses
    }

    /// Write deadlines that expired
    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    /// Retries caused by either kind of deadline
    pub fn total_retries(&self) -> u64 {
        self.missed_responses + self.timeouts
    }

    pub(crate) fn record_missed_response(&mut self) {
        self.missed_responses += 1;
    }

    pub(crate) fn record_timeout(&mut self) {
        self.timeouts += 1;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missed Responses: {}, Timeouts: {}",
            self.missed_responses, self.timeouts
        )
    }
}
