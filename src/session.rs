//! Session and command dispatcher
//!
//! A [`Session`] owns one transport, one sequence counter and one set of
//! statistics. Commands run strictly one at a time: `dispatch` drives a
//! single command from encoding to a terminal outcome before returning.
//!
//! Per command the dispatcher walks this state machine:
//!
//! ```text
//! Encoding -> Sending -> AwaitingResponse -> Succeeded
//!                ^              |         \-> Failed
//!                |              v
//!                +-------- Retrying ------> Failed (budget exhausted)
//! ```
//!
//! ACK and stale responses keep the dispatcher in `AwaitingResponse`
//! without consuming retry budget. Only deadline expiry leads to
//! `Retrying`; every other error fails the command immediately.

use std::thread;
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::ack_manager::RetransmissionState;
use crate::config::SessionConfig;
use crate::contracts::CommandFrame;
use crate::errors::{HandshakeStep, Result, ViscaError};
use crate::handshake;
use crate::receiver::{classify, Classification, Receiver};
use crate::sequence::SequenceCounter;
use crate::stats::Stats;
use crate::transmitter::{parse_command_hex, Transmitter, CLEAR_INTERFACE_SOCKET};
use crate::transport::Transport;
use crate::MESSAGE_BUFFER_SIZE;

/// Per-response events go to `debug` when the session runs with `debug`
/// enabled, to `trace` otherwise.
macro_rules! response_event {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            debug!($($arg)+)
        } else {
            trace!($($arg)+)
        }
    };
}

/// Which deadline expired before a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deadline {
    Write,
    Read,
}

/// Non-terminal dispatcher states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchState {
    Sending,
    AwaitingResponse,
    Retrying(Deadline),
}

/// Create a session: reset the device's sequence number, then clear its
/// interface socket
///
/// # Errors
/// - `InvalidConfig` if `config` does not validate
/// - `HandshakeFailed` if either handshake step fails
pub fn create_session<T: Transport>(transport: T, config: SessionConfig) -> Result<Session<T>> {
    config.validate()?;

    let mut session = Session {
        transport,
        sequence: SequenceCounter::new(),
        config,
        stats: Stats::default(),
    };

    handshake::reset_sequence(&mut session.transport, session.config.timeout)
        .map_err(|e| ViscaError::handshake(HandshakeStep::Reset, e))?;
    session.sequence.reset_to(1);

    session
        .dispatch(&CLEAR_INTERFACE_SOCKET)
        .map_err(|e| ViscaError::handshake(HandshakeStep::ClearInterfaceSocket, e))?;

    info!(sequence = session.sequence.current(), "session established");
    Ok(session)
}

/// Create a session with the default configuration (5 retries, 100 ms deadline)
pub fn create_session_default<T: Transport>(transport: T) -> Result<Session<T>> {
    create_session(transport, SessionConfig::default())
}

/// Client session bound to one device
///
/// Not shareable across threads while dispatching: every operation takes
/// `&mut self`, so callers serialize access by construction.
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    sequence: SequenceCounter,
    config: SessionConfig,
    stats: Stats,
}

impl<T: Transport> Session<T> {
    /// Dispatch a printable hex command body such as `"06 04"`
    ///
    /// The body is validated before a sequence number is consumed.
    ///
    /// # Errors
    /// `MalformedPayload` for odd-length or non-hex input, otherwise as [`Session::dispatch`]
    pub fn dispatch_hex(&mut self, command_hex: &str) -> Result<()> {
        let body = parse_command_hex(command_hex)?;
        self.dispatch(&body)
    }

    /// Dispatch an opaque command body and wait for its completion
    ///
    /// # Errors
    /// - `MalformedPayload` if the body cannot be framed (never retried)
    /// - `DeviceError` if the device rejected the command (never retried)
    /// - `ShortFrame` / `ShortPayload` for an unparseable response (never retried)
    /// - `RetriesExhausted` once `max_retries + 1` sends went unanswered
    /// - `Io` for a non-timeout transport failure, such as a closed transport
    pub fn dispatch(&mut self, body: &[u8]) -> Result<()> {
        let sequence_number = self.sequence.next();
        let frame = CommandFrame::new(body, sequence_number)?.to_bytes();
        self.run_exchange(&frame, sequence_number)
    }

    /// Drive one encoded command through send, wait and retry
    fn run_exchange(&mut self, frame: &[u8], sequence_number: u32) -> Result<()> {
        let mut retx = RetransmissionState::new(sequence_number, &self.config);
        let mut state = DispatchState::Sending;

        loop {
            state = match state {
                DispatchState::Sending => {
                    let attempt = retx.record_send();
                    trace!(seq = retx.sequence_number, attempt, "sending command");
                    match Transmitter::send(&mut self.transport, frame, self.config.timeout) {
                        Ok(()) => DispatchState::AwaitingResponse,
                        Err(ViscaError::TransportTimeout) => DispatchState::Retrying(Deadline::Write),
                        Err(e) => return Err(e),
                    }
                }
                DispatchState::AwaitingResponse => match self.await_completion(retx.sequence_number) {
                    Ok(()) => return Ok(()),
                    Err(ViscaError::TransportTimeout) => DispatchState::Retrying(Deadline::Read),
                    Err(e) => return Err(e),
                },
                DispatchState::Retrying(deadline) => {
                    if retx.is_exhausted() {
                        warn!(
                            seq = retx.sequence_number,
                            attempts = retx.attempts,
                            "peripheral device is not responsive"
                        );
                        return Err(ViscaError::RetriesExhausted {
                            attempts: retx.attempts,
                        });
                    }

                    match deadline {
                        Deadline::Write => self.stats.record_timeout(),
                        Deadline::Read => self.stats.record_missed_response(),
                    }

                    let delay = retx.next_delay();
                    debug!(
                        seq = retx.sequence_number,
                        attempt = retx.attempts,
                        ?deadline,
                        ?delay,
                        "deadline expired, resending"
                    );
                    thread::sleep(delay);
                    DispatchState::Sending
                }
            };
        }
    }

    /// Read responses until a terminal one arrives or the attempt's deadline passes
    ///
    /// Stale and ACK responses keep reading within the same deadline window.
    fn await_completion(&mut self, sequence_number: u32) -> Result<()> {
        let deadline = Instant::now() + self.config.timeout;
        let mut buffer = [0u8; MESSAGE_BUFFER_SIZE];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ViscaError::TransportTimeout);
            }

            let response = Receiver::receive(&mut self.transport, &mut buffer, remaining)?;
            match classify(&response, sequence_number) {
                Classification::Stale => {
                    response_event!(
                        self.config.debug,
                        expected = sequence_number,
                        got = response.sequence_number(),
                        "received old response"
                    );
                }
                Classification::Ack => {
                    response_event!(self.config.debug, seq = sequence_number, "received ACK");
                }
                Classification::Completion => {
                    response_event!(self.config.debug, seq = sequence_number, "received completion");
                    return Ok(());
                }
                Classification::DeviceError { status, payload } => {
                    warn!(
                        seq = sequence_number,
                        status = %format_args!("{:02x}", status),
                        payload = %hex::encode(&payload),
                        "device rejected command"
                    );
                    return Err(ViscaError::DeviceError { status, payload });
                }
            }
        }
    }

    /// Snapshot of the delivery statistics
    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Last sequence number issued
    pub fn sequence_number(&self) -> u32 {
        self.sequence.current()
    }

    /// Borrow the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport
    ///
    /// Must be called before the transport's address is reused for another device.
    pub fn close(mut self) -> Result<()> {
        debug!(stats = %self.stats, "closing session");
        self.transport.close().map_err(ViscaError::Io)
    }
}
