//! Error types for VISCA-over-IP operations
//!
//! Every failure surfaces synchronously from `dispatch` or `create_session`.
//! Only [`ViscaError::TransportTimeout`] is retried by the dispatcher; the
//! rest terminate the call immediately.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type alias for VISCA operations
pub type Result<T> = std::result::Result<T, ViscaError>;

/// Step of session creation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Out-of-band RESET of the device's sequence number
    Reset,
    /// Clearing the device's interface socket through the normal command path
    ClearInterfaceSocket,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("sequence reset"),
            Self::ClearInterfaceSocket => f.write_str("interface socket clear"),
        }
    }
}

/// VISCA protocol error enumeration
#[derive(Debug, Error)]
pub enum ViscaError {
    /// Caller-supplied command is unusable (odd nibble count, non-hex digit)
    #[error("malformed command payload: {0}")]
    MalformedPayload(String),

    /// Write or read deadline exceeded
    #[error("transport deadline exceeded")]
    TransportTimeout,

    /// Response datagram too small to carry header and minimum payload
    #[error("response too short: got {received} bytes, expected at least {}", crate::MIN_RESPONSE_SIZE)]
    ShortFrame { received: usize },

    /// Response header parsed but payload region is under 4 bytes
    #[error("response payload too short: got {received} bytes, expected at least {}", crate::MIN_RESPONSE_PAYLOAD)]
    ShortPayload { received: usize },

    /// Device explicitly rejected the command
    #[error("peripheral device error: payload={}, statusCode={status:02x}", hex::encode(.payload))]
    DeviceError { status: u8, payload: Vec<u8> },

    /// Retry budget consumed without a completion
    #[error("peripheral device is not responsive after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Session creation aborted
    #[error("handshake failed during {step}: {source}")]
    HandshakeFailed {
        step: HandshakeStep,
        #[source]
        source: Box<ViscaError>,
    },

    /// Reset response did not carry the acknowledge byte
    #[error("invalid reset response: {}", hex::encode(.0))]
    InvalidResetResponse(Vec<u8>),

    /// Session configuration rejected before any I/O
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Non-timeout transport failure, including a closed transport
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl ViscaError {
    /// Whether the dispatcher may retry after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportTimeout)
    }

    /// Wrap an error as a failure of the given handshake step
    pub(crate) fn handshake(step: HandshakeStep, source: ViscaError) -> Self {
        Self::HandshakeFailed {
            step,
            source: Box::new(source),
        }
    }
}

/// Deadline expiry on a socket shows up as `WouldBlock` or `TimedOut`
/// depending on the platform; both become [`ViscaError::TransportTimeout`].
impl From<io::Error> for ViscaError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::TransportTimeout,
            _ => Self::Io(err),
        }
    }
}
