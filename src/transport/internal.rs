//! In-process transport
//!
//! A queue pair connecting a face to code inside the same process. The
//! forwarder side behaves like any other transport; the handle side is
//! held by the host (or by the prefix-registration helper) to inject
//! packets and observe what the face sends.

use super::Transport;
use crate::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

type Queue = Rc<RefCell<VecDeque<Vec<u8>>>>;

/// Forwarder-side endpoint, owned by a face.
pub struct InternalTransport {
    /// Packets heading into the forwarder.
    inbound: Queue,
    /// Packets the face has sent out.
    outbound: Queue,
}

/// Host-side endpoint.
#[derive(Clone)]
pub struct InternalHandle {
    inbound: Queue,
    outbound: Queue,
}

/// Create a connected transport/handle pair.
pub fn internal_pair() -> (InternalTransport, InternalHandle) {
    let inbound: Queue = Rc::new(RefCell::new(VecDeque::new()));
    let outbound: Queue = Rc::new(RefCell::new(VecDeque::new()));
    (
        InternalTransport {
            inbound: inbound.clone(),
            outbound: outbound.clone(),
        },
        InternalHandle { inbound, outbound },
    )
}

impl Transport for InternalTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.outbound.borrow_mut().push_back(bytes.to_vec());
        Ok(())
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.inbound.borrow_mut().pop_front() {
            Some(packet) => {
                let len = packet.len().min(buf.len());
                buf[..len].copy_from_slice(&packet[..len]);
                Ok(Some(len))
            }
            None => Ok(None),
        }
    }
}

impl InternalHandle {
    /// Queue a packet for the face to receive on its next poll.
    pub fn send(&self, bytes: &[u8]) {
        self.inbound.borrow_mut().push_back(bytes.to_vec());
    }

    /// Take the next packet the face has sent, if any.
    pub fn try_recv(&self) -> Option<Vec<u8>> {
        self.outbound.borrow_mut().pop_front()
    }
}
