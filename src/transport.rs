//! Datagram transport abstraction
//!
//! The session only needs deadline-bounded `write` and `read` on an
//! already-addressed datagram channel. Deadline expiry must be reported as
//! `io::ErrorKind::WouldBlock` or `io::ErrorKind::TimedOut`; every other
//! error is treated as fatal for the command in flight.

use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::errors::{Result, ViscaError};
use crate::DEFAULT_PORT;

/// Datagram channel to exactly one device
pub trait Transport {
    /// Send one datagram, blocking at most `deadline`
    fn write(&mut self, bytes: &[u8], deadline: Duration) -> io::Result<usize>;

    /// Receive one datagram into `buffer`, blocking at most `deadline`
    fn read(&mut self, buffer: &mut [u8], deadline: Duration) -> io::Result<usize>;

    /// Release the channel; later calls fail with a non-timeout error
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8], deadline: Duration) -> io::Result<usize> {
        (**self).write(bytes, deadline)
    }

    fn read(&mut self, buffer: &mut [u8], deadline: Duration) -> io::Result<usize> {
        (**self).read(buffer, deadline)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// UDP transport over a connected `std::net::UdpSocket`
#[derive(Debug)]
pub struct UdpTransport {
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    /// Wrap a socket that is already connected to the device
    pub fn new(socket: UdpSocket) -> Self {
        Self { socket: Some(socket) }
    }

    /// Bind an ephemeral local port and connect to the device at `addr`
    ///
    /// # Errors
    /// `Io` if the address does not resolve or the socket cannot be created
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let remote = addr
            .to_socket_addrs()
            .map_err(ViscaError::Io)?
            .next()
            .ok_or_else(|| {
                ViscaError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "device address did not resolve",
                ))
            })?;

        let local: SocketAddr = if remote.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(local).map_err(ViscaError::Io)?;
        socket.connect(remote).map_err(ViscaError::Io)?;
        Ok(Self::new(socket))
    }

    /// Connect to a device given as `host` or `host:port`
    ///
    /// Without an explicit port the VISCA-over-IP default, 52381, is used.
    /// Bare IPv6 addresses are accepted; with a port they need brackets.
    pub fn connect_host(addr: &str) -> Result<Self> {
        Self::connect(with_default_port(addr).as_str())
    }

    /// Address of the connected device
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket()?.peer_addr()
    }

    fn socket(&self) -> io::Result<&UdpSocket> {
        self.socket
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "transport closed"))
    }
}

/// Append [`DEFAULT_PORT`] to `addr` unless it already names a port
fn with_default_port(addr: &str) -> String {
    if addr.parse::<SocketAddr>().is_ok() {
        return addr.to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_PORT).to_string();
    }
    match addr.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => addr.to_string(),
        _ => format!("{}:{}", addr, DEFAULT_PORT),
    }
}

impl Transport for UdpTransport {
    fn write(&mut self, bytes: &[u8], deadline: Duration) -> io::Result<usize> {
        let socket = self.socket()?;
        socket.set_write_timeout(Some(deadline))?;
        socket.send(bytes)
    }

    fn read(&mut self, buffer: &mut [u8], deadline: Duration) -> io::Result<usize> {
        let socket = self.socket()?;
        socket.set_read_timeout(Some(deadline))?;
        socket.recv(buffer)
    }

    fn close(&mut self) -> io::Result<()> {
        self.socket.take();
        Ok(())
    }
}
