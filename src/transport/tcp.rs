//! TCP stream transport

use super::Transport;
use crate::Result;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

const SEND_RETRY_LIMIT: u32 = 1000;
const SEND_RETRY_DELAY: Duration = Duration::from_micros(100);

pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to a remote forwarder.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Wrap a stream accepted by a listen channel.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        // Elements are small, so the kernel buffer normally drains in
        // one write. A peer that stops reading must not stall the whole
        // event loop, so retries are bounded.
        let mut retries = 0;
        let mut remaining = bytes;
        while !remaining.is_empty() {
            match self.stream.write(remaining) {
                Ok(0) => {
                    return Err(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "connection closed during send",
                    )
                    .into())
                }
                Ok(n) => remaining = &remaining[n..],
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    retries += 1;
                    if retries > SEND_RETRY_LIMIT {
                        return Err(std::io::Error::new(
                            ErrorKind::TimedOut,
                            "peer not draining its receive buffer",
                        )
                        .into());
                    }
                    std::thread::sleep(SEND_RETRY_DELAY);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.stream.read(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
