use std::net::{SocketAddr, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use visca_ip_core::{create_session, SessionConfig, UdpTransport, ViscaError};

mod device_emulator {
    use super::*;

    /// Behaviour of the emulated camera
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Faults {
        /// Sequence-numbered commands to ignore before answering
        pub drop_first: usize,
        /// Send a stale completion ahead of every ACK
        pub stale_echo: bool,
        /// Reject every command after the socket clear with this status
        pub reject_with: Option<u8>,
    }

    /// Minimal VISCA-over-IP camera on a loopback UDP socket
    ///
    /// Stops after `max_messages` datagrams or two seconds of silence.
    pub fn spawn(faults: Faults, max_messages: usize) -> (SocketAddr, JoinHandle<Vec<Vec<u8>>>) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let addr = socket.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut received = Vec::new();
            let mut commands_seen = 0usize;
            let mut buf = [0u8; 64];

            while received.len() < max_messages {
                let (n, peer) = match socket.recv_from(&mut buf) {
                    Ok(r) => r,
                    Err(_) => break,
                };
                let msg = buf[..n].to_vec();
                received.push(msg.clone());

                if msg[0] == 0x02 {
                    socket
                        .send_to(&[0x02, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x01], peer)
                        .unwrap();
                    continue;
                }

                commands_seen += 1;
                let seq = u32::from_be_bytes([msg[4], msg[5], msg[6], msg[7]]);
                let is_socket_clear = msg[8..] == [0x81, 0x01, 0x00, 0x01, 0xFF];

                if !is_socket_clear && commands_seen <= faults.drop_first + 1 {
                    continue;
                }

                if faults.stale_echo && seq > 1 {
                    socket.send_to(&reply(seq - 1, 0x51), peer).unwrap();
                }
                match faults.reject_with {
                    Some(status) if !is_socket_clear => {
                        socket.send_to(&reply(seq, status), peer).unwrap();
                    }
                    _ => {
                        socket.send_to(&reply(seq, 0x41), peer).unwrap();
                        socket.send_to(&reply(seq, 0x51), peer).unwrap();
                    }
                }
            }
            received
        });

        (addr, handle)
    }

    /// Camera-style reply with the socket number in the status byte's low nibble
    pub fn reply(seq: u32, status: u8) -> Vec<u8> {
        let mut out = vec![0x01, 0x11, 0x00, 0x04];
        out.extend_from_slice(&seq.to_be_bytes());
        out.extend_from_slice(&[0x90, status, 0x01, 0xFF]);
        out
    }
}

use device_emulator::Faults;

fn config() -> SessionConfig {
    SessionConfig::new()
        .with_max_retries(3)
        .with_timeout(Duration::from_millis(100))
}

#[test]
fn test_session_against_emulated_camera() {
    let (addr, device) = device_emulator::spawn(Faults::default(), 3);

    let transport = UdpTransport::connect(addr).unwrap();
    let mut session = create_session(transport, config()).unwrap();
    session.dispatch_hex("06 04").unwrap();

    assert_eq!(session.stats().total_retries(), 0);
    session.close().unwrap();

    let received = device.join().unwrap();
    assert_eq!(received.len(), 3);
    assert_eq!(received[2], hex::decode("010000050000000381010604FF").unwrap());

    println!("✓ Loopback: reset, socket clear and pan-tilt home completed");
}

#[test]
fn test_dropped_command_is_resent_over_udp() {
    let faults = Faults {
        drop_first: 1,
        stale_echo: true,
        ..Faults::default()
    };
    let (addr, device) = device_emulator::spawn(faults, 4);

    let transport = UdpTransport::connect(addr).unwrap();
    let mut session = create_session(transport, config()).unwrap();
    session.dispatch_hex("06 04").unwrap();

    let stats = session.stats();
    assert_eq!(stats.missed_responses(), 1);
    assert_eq!(stats.timeouts(), 0);
    session.close().unwrap();

    let received = device.join().unwrap();
    assert_eq!(received[2], received[3], "resend must reuse the same frame");

    println!("✓ Loopback retry: {}", stats);
}

#[test]
fn test_device_rejection_over_udp() {
    let faults = Faults {
        reject_with: Some(0x61),
        ..Faults::default()
    };
    let (addr, device) = device_emulator::spawn(faults, 3);

    let transport = UdpTransport::connect(addr).unwrap();
    let mut session = create_session(transport, config()).unwrap();

    match session.dispatch_hex("06 04") {
        Err(ViscaError::DeviceError { status, payload }) => {
            assert_eq!(status, 0x61);
            assert_eq!(payload, vec![0x90, 0x61, 0x01, 0xFF]);
        }
        other => panic!("unexpected {:?}", other),
    }
    session.close().unwrap();
    assert_eq!(device.join().unwrap().len(), 3);
}
