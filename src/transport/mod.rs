//! Face transports
//!
//! Provides abstraction over the byte-stream endpoints a face can own:
//! - TCP: connected or accepted stream sockets
//! - UDP: connected sockets, or peers demultiplexed off a shared channel socket
//! - Internal: in-process queue pairs (registration helper, tests)
//!
//! All sockets are non-blocking; the forwarder polls transports from a
//! single thread.

mod internal;
mod tcp;
mod udp;

pub use internal::{internal_pair, InternalHandle, InternalTransport};
pub use tcp::TcpTransport;
pub use udp::{UdpPeerTransport, UdpTransport};

use crate::Result;

/// A byte-level endpoint owned by one face.
pub trait Transport {
    /// Write one whole element. Blocking is bounded to draining the
    /// kernel buffer for small packets.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read whatever is ready into `buf`. `Ok(None)` means nothing is
    /// ready; `Ok(Some(0))` means the peer closed the connection.
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>>;

    /// Accept a datagram received on a shared socket on this
    /// transport's behalf. Only meaningful for channel-demultiplexed
    /// transports; others ignore it.
    fn on_receive_data(&mut self, _bytes: &[u8]) {}
}
