//! Blocking UDP receiver with a short timeout
//!
//! Vision and the game controller publish on multicast groups. A receiver
//! binds the group's port on all interfaces and joins the group; unicast
//! addresses are bound directly.

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

/// Longest a single receive blocks.
pub const RECEIVE_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest datagram accepted
const MAX_DATAGRAM: usize = 65_536;

pub struct UdpReceiver {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl UdpReceiver {
    /// Bind to `address` ("ip:port"), joining it when it is a multicast group.
    pub fn bind(address: &str) -> Result<Self> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| Error::Config(format!("bad address '{}': {}", address, e)))?;

        let socket = match addr {
            SocketAddr::V4(v4) if v4.ip().is_multicast() => {
                let socket =
                    UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, v4.port()))?;
                socket.join_multicast_v4(v4.ip(), &Ipv4Addr::UNSPECIFIED)?;
                log::info!("Joined multicast group {}", v4);
                socket
            }
            _ => {
                let socket = UdpSocket::bind(addr)?;
                log::info!("Listening on {}", socket.local_addr()?);
                socket
            }
        };
        Self::from_socket(socket)
    }

    /// Wrap an already bound socket.
    pub fn from_socket(socket: UdpSocket) -> Result<Self> {
        socket.set_read_timeout(Some(RECEIVE_TIMEOUT))?;
        Ok(Self {
            socket,
            buffer: vec![0u8; MAX_DATAGRAM],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Wait up to [`RECEIVE_TIMEOUT`] for one datagram. Timeouts yield `None`.
    pub fn recv(&mut self) -> Result<Option<&[u8]>> {
        match self.socket.recv(&mut self.buffer) {
            Ok(n) => Ok(Some(&self.buffer[..n])),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
