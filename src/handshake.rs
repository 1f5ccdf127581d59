//! Session handshake
//!
//! Before sequence-numbered commands flow, the device's expected sequence
//! number is reset with an out-of-band control command, then its interface
//! socket is cleared through the normal command path. The reset is sent
//! once and never retried; a failure of either step aborts session creation.

use std::time::Duration;

use tracing::debug;

use crate::errors::{Result, ViscaError};
use crate::transmitter::{Transmitter, RESET_COMMAND};
use crate::transport::Transport;
use crate::{HEADER_SIZE, MESSAGE_BUFFER_SIZE};

/// Smallest acceptable reset reply: header plus one acknowledge byte
pub const MIN_RESET_RESPONSE: usize = HEADER_SIZE + 1;

/// Payload byte a device answers a RESET with
pub const RESET_ACKNOWLEDGE: u8 = 0x01;

/// Send the RESET control command and wait for its acknowledge
///
/// # Errors
/// - `TransportTimeout` if either deadline fires
/// - `ShortFrame` if the reply is under 9 bytes
/// - `InvalidResetResponse` if the reply does not lead with the acknowledge byte
/// - `Io` for any other transport failure
pub fn reset_sequence<T: Transport + ?Sized>(transport: &mut T, timeout: Duration) -> Result<()> {
    debug!("sending RESET");
    Transmitter::send(transport, &RESET_COMMAND, timeout)?;

    let mut buffer = [0u8; MESSAGE_BUFFER_SIZE];
    let bytes_received = transport.read(&mut buffer, timeout)?;
    let reply = &buffer[..bytes_received];

    if bytes_received < MIN_RESET_RESPONSE {
        return Err(ViscaError::ShortFrame { received: bytes_received });
    }
    if reply[HEADER_SIZE] != RESET_ACKNOWLEDGE {
        return Err(ViscaError::InvalidResetResponse(reply.to_vec()));
    }

    debug!("RESET acknowledged");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    struct Canned {
        written: Vec<Vec<u8>>,
        replies: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Canned {
        fn new(replies: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                written: Vec::new(),
                replies: replies.into(),
            }
        }
    }

    impl Transport for Canned {
        fn write(&mut self, bytes: &[u8], _deadline: Duration) -> io::Result<usize> {
            self.written.push(bytes.to_vec());
            Ok(bytes.len())
        }

        fn read(&mut self, buffer: &mut [u8], _deadline: Duration) -> io::Result<usize> {
            let reply = self
                .replies
                .pop_front()
                .unwrap_or_else(|| Err(io::ErrorKind::WouldBlock.into()))?;
            buffer[..reply.len()].copy_from_slice(&reply);
            Ok(reply.len())
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(10);

    #[test]
    fn test_reset_acknowledged() {
        let mut transport = Canned::new(vec![Ok(vec![0x02, 0x01, 0x00, 0x01, 0, 0, 0, 1, 0x01])]);
        reset_sequence(&mut transport, TIMEOUT).unwrap();
        assert_eq!(transport.written, vec![RESET_COMMAND.to_vec()]);
    }

    #[test]
    fn test_reset_short_reply() {
        let mut transport = Canned::new(vec![Ok(vec![0x02, 0x01, 0x00, 0x01])]);
        assert!(matches!(
            reset_sequence(&mut transport, TIMEOUT),
            Err(ViscaError::ShortFrame { received: 4 })
        ));
    }

    #[test]
    fn test_reset_wrong_acknowledge() {
        let reply = vec![0x02, 0x01, 0x00, 0x01, 0, 0, 0, 1, 0x0F, 0x01];
        let mut transport = Canned::new(vec![Ok(reply.clone())]);
        match reset_sequence(&mut transport, TIMEOUT) {
            Err(ViscaError::InvalidResetResponse(bytes)) => assert_eq!(bytes, reply),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_reset_timeout_not_retried() {
        let mut transport = Canned::new(vec![]);
        assert!(matches!(
            reset_sequence(&mut transport, TIMEOUT),
            Err(ViscaError::TransportTimeout)
        ));
        assert_eq!(transport.written.len(), 1);
    }
}
