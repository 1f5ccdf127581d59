//! VISCA-over-IP Core - Reliable command delivery over UDP
//! 
//! **Creator**: Shayan Golmezerji
//! **License**: Creative Commons Attribution 4.0 International (CC BY 4.0)
//! 
//! This library implements the client side of the VISCA-over-IP control
//! protocol: a controller sends opaque command payloads to a remote device
//! (typically a PTZ camera) and waits for the device's two-phase
//! ACK-then-Completion answer, despite UDP loss, duplication and reordering.
//! 
//! # Design Principles
//! - Fixed big-endian framing, byte-exact with the device wire format
//! - One session owns one transport; commands run strictly one at a time
//! - Every blocking call is bounded by the configured deadline
//! - Device-reported errors are surfaced verbatim and never retried
//!
//! # Example
//! ```no_run
//! use visca_ip_core::{create_session, SessionConfig, UdpTransport};
//!
//! # fn main() -> visca_ip_core::Result<()> {
//! let transport = UdpTransport::connect("192.168.0.100:52381")?;
//! let mut session = create_session(transport, SessionConfig::default())?;
//! session.dispatch_hex("06 04")?; // Pan-tilt home
//! println!("{}", session.stats());
//! session.close()
//! # }
//! ```

pub mod errors;
pub mod contracts;
pub mod transmitter;
pub mod receiver;
pub mod sequence;
pub mod ack_manager;
pub mod stats;
pub mod config;
pub mod transport;
pub mod handshake;
pub mod session;

pub use config::SessionConfig;
pub use contracts::{CommandFrame, FrameHeader, ResponseFrame, StatusCategory};
pub use errors::{HandshakeStep, Result, ViscaError};
pub use receiver::{classify, decode_response, Classification};
pub use session::{create_session, create_session_default, Session};
pub use stats::Stats;
pub use transmitter::{encode_command, encode_command_hex, parse_command_hex};
pub use transport::{Transport, UdpTransport};

/// Payload type tag carried by every VISCA command frame
pub const PAYLOAD_TYPE_COMMAND: u16 = 0x0100;

/// Payload type tag of the control-command (RESET) frame
pub const PAYLOAD_TYPE_CONTROL: u16 = 0x0200;

/// Device-address prefix placed in front of every command body
pub const COMMAND_PREFIX: [u8; 2] = [0x81, 0x01];

/// VISCA message terminator
pub const TERMINATOR: u8 = 0xFF;

/// Size of the common frame header: type (2) + length (2) + sequence (4)
pub const HEADER_SIZE: usize = 8;

/// Smallest response payload: prefix, status, socket, terminator
pub const MIN_RESPONSE_PAYLOAD: usize = 4;

/// Smallest complete response frame
pub const MIN_RESPONSE_SIZE: usize = HEADER_SIZE + MIN_RESPONSE_PAYLOAD;

/// Receive buffer size for a single response datagram
pub const MESSAGE_BUFFER_SIZE: usize = 24;

/// Status code of an ACK response ("accepted, processing")
pub const STATUS_ACK: u8 = 0x04;

/// Status code of a Completion response ("finished executing")
pub const STATUS_COMPLETION: u8 = 0x05;

/// Default UDP port of VISCA-over-IP devices
pub const DEFAULT_PORT: u16 = 52381;

/// Default retry budget per dispatched command
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default per-call deadline in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Backoff floor in milliseconds, used for the first retry of every command
pub const INITIAL_BACKOFF_MS: u64 = 5;

/// Backoff cap in milliseconds
pub const MAX_BACKOFF_MS: u64 = 50;

/// Backoff multiplier for retransmission (exponential)
pub const BACKOFF_MULTIPLIER: u32 = 2;
