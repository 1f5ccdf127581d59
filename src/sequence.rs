//! Per-session sequence counter
//!
//! Single owner, no interior mutability: the session that holds the
//! counter is the only code that advances it.

/// Monotonic `u32` counter that wraps to 0 after `u32::MAX`
#[derive(Debug, Clone, Default)]
pub struct SequenceCounter {
    current: u32,
}

impl SequenceCounter {
    /// Counter starting at 0, before any reset handshake
    pub fn new() -> Self {
        Self { current: 0 }
    }

    /// Last value handed out (or set by a reset)
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Advance and return the next sequence number
    ///
    /// Only returns 0 right after wrapping past `u32::MAX`.
    pub fn next(&mut self) -> u32 {
        self.current = self.current.wrapping_add(1);
        self.current
    }

    /// Force the counter to a value, used after a successful RESET
    pub fn reset_to(&mut self, value: u32) {
        self.current = value;
    }
}
