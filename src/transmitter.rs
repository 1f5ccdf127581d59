//! Transmitter module - controller-to-device encoding
//!
//! Turns opaque command bodies into VISCA-over-IP command datagrams and
//! writes them to a [`Transport`] under the configured deadline.

use std::time::Duration;

use crate::contracts::CommandFrame;
use crate::errors::{Result, ViscaError};
use crate::transport::Transport;

/// RESET control command: type `0x0200`, length 1, sequence 1, payload `01`
///
/// Sent outside the sequence-numbered command flow; the sequence field is
/// fixed and not taken from the session counter.
pub const RESET_COMMAND: [u8; 9] = [0x02, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x01];

/// Command body that clears the device's interface socket
pub const CLEAR_INTERFACE_SOCKET: [u8; 2] = [0x00, 0x01];

/// Parse a printable hex command body such as `"06 04"`
///
/// Whitespace is allowed anywhere for legibility.
///
/// # Errors
/// `MalformedPayload` for an odd number of hex digits or a non-hex character
pub fn parse_command_hex(command_hex: &str) -> Result<Vec<u8>> {
    let cleaned: String = command_hex.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.len() % 2 != 0 {
        return Err(ViscaError::MalformedPayload(format!(
            "command hex must have even length: {}",
            command_hex
        )));
    }

    hex::decode(&cleaned).map_err(|e| {
        ViscaError::MalformedPayload(format!("invalid hex in command {:?}: {}", command_hex, e))
    })
}

/// Encode a command body into a complete datagram
///
/// Layout: `01 00 | len (u16) | seq (u32) | 81 01 | body | FF`
pub fn encode_command(body: &[u8], sequence_number: u32) -> Result<Vec<u8>> {
    Ok(CommandFrame::new(body, sequence_number)?.to_bytes())
}

/// Encode a printable hex command body into a complete datagram
///
/// ```
/// let bytes = visca_ip_core::encode_command_hex("06 04", 1234).unwrap();
/// assert_eq!(bytes, [0x01, 0x00, 0x00, 0x05, 0x00, 0x00, 0x04, 0xD2, 0x81, 0x01, 0x06, 0x04, 0xFF]);
/// ```
pub fn encode_command_hex(command_hex: &str, sequence_number: u32) -> Result<Vec<u8>> {
    encode_command(&parse_command_hex(command_hex)?, sequence_number)
}

/// Transmitter - writes encoded frames to a transport
pub struct Transmitter;

impl Transmitter {
    /// Write one datagram with a deadline
    ///
    /// # Errors
    /// - `TransportTimeout` if the write deadline fired
    /// - `Io` for any other transport failure
    pub fn send<T: Transport + ?Sized>(
        transport: &mut T,
        bytes: &[u8],
        deadline: Duration,
    ) -> Result<()> {
        let written = transport.write(bytes, deadline)?;
        if written != bytes.len() {
            return Err(ViscaError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("short datagram write: {} of {} bytes", written, bytes.len()),
            )));
        }
        Ok(())
    }
}
