//! Faces
//!
//! A face is a process-scoped endpoint owning a transport. Its element
//! reader turns the transport's byte stream into whole TLV elements:
//! exactly one element per emission, partial elements buffered until
//! complete, the outer LP wrapper preserved.

use crate::protocol::tlv::{element_framing, Framing, MAX_PACKET_SIZE};
use crate::transport::Transport;
use std::fmt;
use tracing::{error, warn};

/// Process-unique face identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub u64);

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a face poll produced.
pub enum PollOutcome {
    /// Zero or more whole elements.
    Elements(Vec<Vec<u8>>),
    /// The transport failed or the peer closed; the face must be removed.
    Closed,
}

pub struct Face {
    id: FaceId,
    uri: String,
    transport: Box<dyn Transport>,
    is_local: bool,
    out_face_id: Option<FaceId>,
    buffer: Vec<u8>,
}

impl Face {
    pub fn new(id: FaceId, uri: String, transport: Box<dyn Transport>) -> Self {
        Self {
            id,
            uri,
            transport,
            is_local: true,
            out_face_id: None,
            buffer: Vec::new(),
        }
    }

    pub fn id(&self) -> FaceId {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// Mark the face as non-local so that localhop Interests arriving
    /// on it are honoured (used by the registration helper).
    pub fn mark_non_local(&mut self) {
        self.is_local = false;
    }

    pub fn out_face_id(&self) -> Option<FaceId> {
        self.out_face_id
    }

    /// Pin all Interests arriving on this face to a single out face.
    pub fn set_out_face_id(&mut self, out_face: FaceId) {
        self.out_face_id = Some(out_face);
    }

    /// Send one element. Best effort: failures are logged and reported
    /// as false, never propagated.
    pub fn send(&mut self, bytes: &[u8]) -> bool {
        match self.transport.send(bytes) {
            Ok(()) => true,
            Err(e) => {
                error!("send failed on face {} ({}): {}", self.id, self.uri, e);
                false
            }
        }
    }

    /// Drain ready input and return any complete elements.
    pub fn poll(&mut self) -> PollOutcome {
        let mut chunk = [0u8; MAX_PACKET_SIZE];
        loop {
            match self.transport.try_recv(&mut chunk) {
                Ok(None) => break,
                Ok(Some(0)) => return PollOutcome::Closed,
                Ok(Some(n)) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    warn!("receive failed on face {} ({}): {}", self.id, self.uri, e);
                    return PollOutcome::Closed;
                }
            }
        }
        PollOutcome::Elements(self.extract_elements())
    }

    /// Route a datagram received on a shared channel socket into this
    /// face, returning any complete elements.
    pub fn on_receive_data(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        self.transport.on_receive_data(bytes);
        let mut chunk = [0u8; MAX_PACKET_SIZE];
        while let Ok(Some(n)) = self.transport.try_recv(&mut chunk) {
            if n == 0 {
                break;
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
        self.extract_elements()
    }

    fn extract_elements(&mut self) -> Vec<Vec<u8>> {
        let mut elements = Vec::new();
        loop {
            match element_framing(&self.buffer) {
                Framing::Complete(size) => {
                    let rest = self.buffer.split_off(size);
                    elements.push(std::mem::replace(&mut self.buffer, rest));
                }
                Framing::Incomplete => break,
                Framing::Invalid => {
                    // No way to resynchronize a poisoned stream; drop
                    // the buffered bytes but keep the face alive.
                    warn!(
                        "unframeable input on face {} ({}); dropping {} buffered bytes",
                        self.id,
                        self.uri,
                        self.buffer.len()
                    );
                    self.buffer.clear();
                    break;
                }
            }
        }
        elements
    }
}
