//! UDP transports
//!
//! Two flavors: a connected socket for faces the host adds explicitly,
//! and a peer transport for faces a listen channel materializes on
//! demand. Peer transports share the channel's bound socket and are
//! fed received datagrams by the channel demultiplexer.

use super::Transport;
use crate::Result;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

/// Connected UDP socket transport.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect((host, port))?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket })
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.socket.send(bytes)?;
        Ok(())
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.socket.recv(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Transport for a face demultiplexed off a shared channel socket.
///
/// Sends go out the shared socket addressed to the peer. Receives come
/// from the channel, which routes each datagram to the matching peer
/// via `on_receive_data`; this transport never reads the socket itself.
pub struct UdpPeerTransport {
    socket: UdpSocket,
    peer: SocketAddr,
    inbound: VecDeque<Vec<u8>>,
}

impl UdpPeerTransport {
    pub fn new(socket: UdpSocket, peer: SocketAddr) -> Self {
        Self {
            socket,
            peer,
            inbound: VecDeque::new(),
        }
    }
}

impl Transport for UdpPeerTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.socket.send_to(bytes, self.peer)?;
        Ok(())
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.inbound.pop_front() {
            Some(datagram) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(Some(len))
            }
            None => Ok(None),
        }
    }

    fn on_receive_data(&mut self, bytes: &[u8]) {
        self.inbound.push_back(bytes.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_transport_queues_datagrams() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let peer: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let mut transport = UdpPeerTransport::new(socket, peer);

        let mut buf = [0u8; 16];
        assert!(transport.try_recv(&mut buf).unwrap().is_none());

        transport.on_receive_data(&[1, 2, 3]);
        transport.on_receive_data(&[4]);

        assert_eq!(transport.try_recv(&mut buf).unwrap(), Some(3));
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(transport.try_recv(&mut buf).unwrap(), Some(1));
        assert_eq!(&buf[..1], &[4]);
        assert!(transport.try_recv(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_connected_roundtrip() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = receiver.local_addr().unwrap();

        let mut transport =
            UdpTransport::connect("127.0.0.1", addr.port()).unwrap();
        transport.send(&[0xAB, 0xCD]).unwrap();

        let mut buf = [0u8; 16];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[0xAB, 0xCD]);
    }
}
