//! Core data structures for the VISCA-over-IP wire protocol
//!
//! Both directions share the same 8-byte header:
//!
//! ```text
//! payload type (u16) | payload length (u16) | sequence number (u32)
//! ```
//!
//! All integers are big-endian. The payload length always equals the
//! number of payload bytes that follow the header.

use crate::errors::{Result, ViscaError};
use crate::{COMMAND_PREFIX, HEADER_SIZE, TERMINATOR};

/// Offset of the status byte inside a response payload
pub const STATUS_OFFSET: usize = 1;

/// Offset of the socket-number byte inside a response payload
pub const SOCKET_OFFSET: usize = 2;

/// Common 8-byte frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Message kind tag (`0x0100` for commands)
    pub payload_type: u16,

    /// Number of payload bytes after the header
    pub payload_length: u16,

    /// Sequence number the message belongs to
    pub sequence_number: u32,
}

impl FrameHeader {
    /// Serialize into the on-wire representation
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..2].copy_from_slice(&self.payload_type.to_be_bytes());
        out[2..4].copy_from_slice(&self.payload_length.to_be_bytes());
        out[4..8].copy_from_slice(&self.sequence_number.to_be_bytes());
        out
    }

    /// Parse the leading 8 bytes of a datagram
    ///
    /// # Errors
    /// `ShortFrame` if fewer than 8 bytes are available
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(ViscaError::ShortFrame { received: bytes.len() });
        }

        Ok(Self {
            payload_type: u16::from_be_bytes([bytes[0], bytes[1]]),
            payload_length: u16::from_be_bytes([bytes[2], bytes[3]]),
            sequence_number: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

/// CommandFrame - Message from controller to device
///
/// # Memory Layout
/// - header: 8 bytes
/// - payload: `81 01` + command body + `FF`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub header: FrameHeader,

    /// Full payload including address prefix and terminator
    pub payload: Vec<u8>,
}

impl CommandFrame {
    /// Build a command frame around an opaque command body
    ///
    /// # Errors
    /// `MalformedPayload` if the framed payload would not fit the 16-bit length field
    pub fn new(body: &[u8], sequence_number: u32) -> Result<Self> {
        let mut payload = Vec::with_capacity(COMMAND_PREFIX.len() + body.len() + 1);
        payload.extend_from_slice(&COMMAND_PREFIX);
        payload.extend_from_slice(body);
        payload.push(TERMINATOR);

        let payload_length = u16::try_from(payload.len()).map_err(|_| {
            ViscaError::MalformedPayload(format!(
                "command body of {} bytes exceeds frame capacity",
                body.len()
            ))
        })?;

        Ok(Self {
            header: FrameHeader {
                payload_type: crate::PAYLOAD_TYPE_COMMAND,
                payload_length,
                sequence_number,
            },
            payload,
        })
    }

    /// Command body without address prefix and terminator
    pub fn body(&self) -> &[u8] {
        &self.payload[COMMAND_PREFIX.len()..self.payload.len() - 1]
    }

    /// Serialize header and payload into one datagram
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Parse a command datagram, checking the framing invariants
    ///
    /// # Errors
    /// - `ShortFrame` if the header is incomplete
    /// - `MalformedPayload` if the declared length disagrees with the datagram,
    ///   or the prefix or terminator is missing
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = FrameHeader::parse(bytes)?;
        let payload = &bytes[HEADER_SIZE..];

        if payload.len() != header.payload_length as usize {
            return Err(ViscaError::MalformedPayload(format!(
                "declared payload length {} but {} bytes follow the header",
                header.payload_length,
                payload.len()
            )));
        }
        if payload.len() < COMMAND_PREFIX.len() + 1 || payload[..2] != COMMAND_PREFIX {
            return Err(ViscaError::MalformedPayload(
                "missing device address prefix".to_string(),
            ));
        }
        if payload[payload.len() - 1] != TERMINATOR {
            return Err(ViscaError::MalformedPayload("missing terminator".to_string()));
        }

        Ok(Self {
            header,
            payload: payload.to_vec(),
        })
    }
}

/// Category of a response status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// Command accepted, still processing
    Ack,
    /// Command finished executing
    Completion,
    /// Anything else, carrying the raw status byte
    DeviceError(u8),
}

impl StatusCategory {
    /// Map a raw status byte onto its category
    ///
    /// The status may arrive as a bare code (`0x04`) or with the socket
    /// number in the low nibble (`0x41`).
    pub fn from_status(status: u8) -> Self {
        let code = if status & 0xF0 == 0 { status } else { status >> 4 };
        match code {
            crate::STATUS_ACK => Self::Ack,
            crate::STATUS_COMPLETION => Self::Completion,
            _ => Self::DeviceError(status),
        }
    }
}

/// ResponseFrame - Message from device to controller
///
/// # Memory Layout
/// - header: 8 bytes
/// - payload: response prefix, status, socket number, terminator (at least 4 bytes)
///
/// Only built by [`crate::receiver::decode_response`], which guarantees the
/// minimum payload size the accessors rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    header: FrameHeader,

    /// Raw response payload, everything after the header
    payload: Vec<u8>,
}

impl ResponseFrame {
    pub(crate) fn new(header: FrameHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Raw payload bytes, for diagnostics
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Sequence number echoed by the device
    pub fn sequence_number(&self) -> u32 {
        self.header.sequence_number
    }

    /// Leading byte of the payload (`0x90` for camera address 1)
    pub fn response_prefix(&self) -> u8 {
        self.payload[0]
    }

    /// Raw status byte
    pub fn status(&self) -> u8 {
        self.payload[STATUS_OFFSET]
    }

    pub fn socket_number(&self) -> u8 {
        self.payload[SOCKET_OFFSET]
    }

    /// Status category of this response
    pub fn category(&self) -> StatusCategory {
        StatusCategory::from_status(self.status())
    }
}
