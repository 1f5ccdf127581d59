//! Receiver module - device-to-controller decoding and classification
//!
//! Decodes raw response datagrams and decides what the dispatcher does
//! with them: keep waiting (stale, ACK), succeed (completion) or fail
//! (device error).

use std::time::Duration;

use crate::contracts::{FrameHeader, ResponseFrame, StatusCategory};
use crate::errors::{Result, ViscaError};
use crate::transport::Transport;
use crate::{HEADER_SIZE, MIN_RESPONSE_PAYLOAD, MIN_RESPONSE_SIZE};

/// Outcome of matching a response against the expected sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Belongs to an earlier, superseded attempt; keep reading
    Stale,
    /// Device accepted the command and is processing; keep reading, do not resend
    Ack,
    /// Device finished the command
    Completion,
    /// Device rejected the command
    DeviceError { status: u8, payload: Vec<u8> },
}

/// Decode a response datagram
///
/// Side-effect free. The payload region is the declared payload length,
/// clipped to the bytes actually received.
///
/// # Errors
/// - `ShortFrame` for fewer than 12 bytes
/// - `ShortPayload` if the payload region is under 4 bytes
pub fn decode_response(bytes: &[u8]) -> Result<ResponseFrame> {
    if bytes.len() < MIN_RESPONSE_SIZE {
        return Err(ViscaError::ShortFrame { received: bytes.len() });
    }

    let header = FrameHeader::parse(bytes)?;
    let available = &bytes[HEADER_SIZE..];
    let payload = &available[..available.len().min(header.payload_length as usize)];
    if payload.len() < MIN_RESPONSE_PAYLOAD {
        return Err(ViscaError::ShortPayload { received: payload.len() });
    }

    Ok(ResponseFrame::new(header, payload.to_vec()))
}

/// Classify a decoded response for the command carrying `expected_seq`
///
/// The device echoes the last sequence number it processed, so a response
/// equal to `expected_seq` is current even when earlier attempts with the
/// same number were missed. Anything strictly lower is stale.
pub fn classify(frame: &ResponseFrame, expected_seq: u32) -> Classification {
    if frame.sequence_number() < expected_seq {
        return Classification::Stale;
    }

    match frame.category() {
        StatusCategory::Ack => Classification::Ack,
        StatusCategory::Completion => Classification::Completion,
        StatusCategory::DeviceError(status) => Classification::DeviceError {
            status,
            payload: frame.payload().to_vec(),
        },
    }
}

/// Receiver - reads response datagrams from a transport
pub struct Receiver;

impl Receiver {
    /// Read and decode one response within `deadline`
    ///
    /// # Errors
    /// - `TransportTimeout` if nothing arrived in time
    /// - `ShortFrame` / `ShortPayload` for undersized datagrams
    /// - `Io` for any other transport failure
    pub fn receive<T: Transport + ?Sized>(
        transport: &mut T,
        buffer: &mut [u8],
        deadline: Duration,
    ) -> Result<ResponseFrame> {
        let bytes_received = transport.read(buffer, deadline)?;
        decode_response(&buffer[..bytes_received])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(seq: u32, payload: &[u8]) -> Vec<u8> {
        let header = FrameHeader {
            payload_type: 0x0111,
            payload_length: payload.len() as u16,
            sequence_number: seq,
        };
        let mut out = header.to_bytes().to_vec();
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_decode_minimum_response() {
        let frame = decode_response(&response(9, &[0x90, 0x04, 0x01, 0xFF])).unwrap();
        assert_eq!(frame.sequence_number(), 9);
        assert_eq!(frame.response_prefix(), 0x90);
        assert_eq!(frame.status(), 0x04);
        assert_eq!(frame.socket_number(), 0x01);
        assert_eq!(frame.payload(), &[0x90, 0x04, 0x01, 0xFF]);
    }

    #[test]
    fn test_decode_short_frame() {
        for len in 0..MIN_RESPONSE_SIZE {
            let bytes = vec![0u8; len];
            assert!(
                matches!(decode_response(&bytes), Err(ViscaError::ShortFrame { received }) if received == len),
                "length {}",
                len
            );
        }
    }

    #[test]
    fn test_decode_keeps_extra_payload() {
        let frame = decode_response(&response(1, &[0x90, 0x05, 0x01, 0x00, 0xFF])).unwrap();
        assert_eq!(frame.payload().len(), 5);
    }

    #[test]
    fn test_decode_short_declared_payload() {
        let mut bytes = response(1, &[0x90, 0x41, 0xFF, 0x00]);
        bytes[3] = 3;
        assert!(matches!(
            decode_response(&bytes),
            Err(ViscaError::ShortPayload { received: 3 })
        ));
    }

    #[test]
    fn test_decode_ignores_trailing_padding() {
        let mut bytes = response(1, &[0x90, 0x51, 0x01, 0xFF]);
        bytes.extend_from_slice(&[0x00, 0x00]);
        let frame = decode_response(&bytes).unwrap();
        assert_eq!(frame.payload(), &[0x90, 0x51, 0x01, 0xFF]);
    }

    #[test]
    fn test_decode_truncated_datagram_uses_received_bytes() {
        let mut bytes = response(1, &[0x90, 0x51, 0x01, 0xFF]);
        bytes[3] = 16;
        let frame = decode_response(&bytes).unwrap();
        assert_eq!(frame.payload().len(), 4);
    }

    #[test]
    fn test_classify_stale() {
        let frame = decode_response(&response(4, &[0x90, 0x05, 0x01, 0xFF])).unwrap();
        assert_eq!(classify(&frame, 5), Classification::Stale);
        assert_eq!(classify(&frame, 4), Classification::Completion);
        assert_eq!(classify(&frame, 3), Classification::Completion);
    }

    #[test]
    fn test_classify_stale_takes_precedence_over_error() {
        let frame = decode_response(&response(1, &[0x90, 0x60, 0x02, 0xFF])).unwrap();
        assert_eq!(classify(&frame, 2), Classification::Stale);
    }

    #[test]
    fn test_classify_ack_and_completion() {
        let ack = decode_response(&response(7, &[0x90, 0x04, 0x01, 0xFF])).unwrap();
        let done = decode_response(&response(7, &[0x90, 0x05, 0x01, 0xFF])).unwrap();
        assert_eq!(classify(&ack, 7), Classification::Ack);
        assert_eq!(classify(&done, 7), Classification::Completion);
    }

    #[test]
    fn test_classify_device_error_carries_payload() {
        let frame = decode_response(&response(7, &[0x90, 0x61, 0x41, 0xFF])).unwrap();
        assert_eq!(
            classify(&frame, 7),
            Classification::DeviceError {
                status: 0x61,
                payload: vec![0x90, 0x61, 0x41, 0xFF],
            }
        );
    }
}
