//! Listen channels
//!
//! Bound sockets that materialize faces on demand: a TCP channel
//! accepts connections from unknown peers, a UDP channel demultiplexes
//! datagrams by peer address over one shared socket. Channels stop
//! producing faces when dropped; faces they created live on.

use crate::protocol::tlv::MAX_PACKET_SIZE;
use crate::transport::UdpPeerTransport;
use crate::Result;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream, UdpSocket};

/// A connection accepted by a TCP channel.
pub struct AcceptedStream {
    pub uri: String,
    pub peer: SocketAddr,
    pub stream: TcpStream,
}

/// A datagram received by a UDP channel.
pub struct ReceivedDatagram {
    pub uri: String,
    pub peer: SocketAddr,
    pub payload: Vec<u8>,
}

pub struct TcpChannel {
    listener: TcpListener,
}

impl TcpChannel {
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept until the socket would block. I/O errors other than
    /// would-block propagate; they are fatal for the channel.
    pub fn poll(&mut self) -> Result<Vec<AcceptedStream>> {
        let mut accepted = Vec::new();
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    accepted.push(AcceptedStream {
                        uri: format!("tcp://{}:{}", peer.ip(), peer.port()),
                        peer,
                        stream,
                    });
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(accepted)
    }
}

pub struct UdpChannel {
    socket: UdpSocket,
}

impl UdpChannel {
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive until the socket would block. I/O errors other than
    /// would-block propagate; they are fatal for the channel.
    pub fn poll(&mut self) -> Result<Vec<ReceivedDatagram>> {
        let mut received = Vec::new();
        let mut buf = [0u8; MAX_PACKET_SIZE];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((len, peer)) => {
                    received.push(ReceivedDatagram {
                        uri: format!("udp://{}:{}", peer.ip(), peer.port()),
                        peer,
                        payload: buf[..len].to_vec(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(received)
    }

    /// Build a transport for a newly observed peer, sharing this
    /// channel's bound socket.
    pub fn peer_transport(&self, peer: SocketAddr) -> Result<UdpPeerTransport> {
        Ok(UdpPeerTransport::new(self.socket.try_clone()?, peer))
    }
}

pub enum Channel {
    Tcp(TcpChannel),
    Udp(UdpChannel),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_channel_accepts_until_would_block() {
        let mut channel = TcpChannel::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = channel.local_addr().unwrap();

        assert!(channel.poll().unwrap().is_empty());

        let _client_a = TcpStream::connect(addr).unwrap();
        let _client_b = TcpStream::connect(addr).unwrap();

        // Both pending connections drain in one poll; give the kernel a
        // moment to finish the handshakes.
        std::thread::sleep(std::time::Duration::from_millis(50));
        let accepted = channel.poll().unwrap();
        assert_eq!(accepted.len(), 2);
        assert!(accepted[0].uri.starts_with("tcp://127.0.0.1:"));
    }

    #[test]
    fn test_udp_channel_reports_peer_uri() {
        let mut channel = UdpChannel::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = channel.local_addr().unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(&[1, 2, 3], addr).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));
        let received = channel.poll().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].payload, vec![1, 2, 3]);
        let expected = format!(
            "udp://127.0.0.1:{}",
            sender.local_addr().unwrap().port()
        );
        assert_eq!(received[0].uri, expected);
    }

    #[test]
    fn test_udp_peer_transport_sends_from_channel_port() {
        use crate::transport::Transport;

        let channel = UdpChannel::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let channel_addr = channel.local_addr().unwrap();

        let peer_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let peer_addr = peer_socket.local_addr().unwrap();

        let mut transport = channel.peer_transport(peer_addr).unwrap();
        transport.send(&[7, 8, 9]).unwrap();

        let mut buf = [0u8; 16];
        let (len, from) = peer_socket.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[7, 8, 9]);
        assert_eq!(from, channel_addr);
    }
}
