//! Pending Interest Table
//!
//! Each entry records an outstanding Interest, the face it arrived on,
//! and two independent deadlines:
//!
//! - `timeout_end`: after this instant the Interest can no longer be
//!   satisfied back to the consumer; the entry's in-face is cleared.
//! - `entry_end`: after this instant the entry itself is removed.
//!
//! An entry whose in-face is cleared lingers purely to suppress replays
//! of the same nonce. Collapsing the two clocks would either drop
//! legitimate retries after a timeout or admit replayed nonces.

use crate::dataplane::face::FaceId;
use crate::protocol::{Data, Interest, Name};
use std::time::Instant;

#[derive(Debug)]
pub struct PitEntry {
    interest: Interest,
    in_face: Option<FaceId>,
    timeout_end: Instant,
    entry_end: Instant,
}

impl PitEntry {
    pub fn interest(&self) -> &Interest {
        &self.interest
    }

    pub fn in_face(&self) -> Option<FaceId> {
        self.in_face
    }

    pub fn clear_in_face(&mut self) {
        self.in_face = None;
    }

    pub fn timeout_end(&self) -> Instant {
        self.timeout_end
    }

    pub fn entry_end(&self) -> Instant {
        self.entry_end
    }

    /// Refresh deadlines for a repeated Interest on the same face: the
    /// satisfiable window only ever extends, the retention window is
    /// replaced.
    pub fn refresh(&mut self, timeout_end: Instant, entry_end: Instant) {
        if timeout_end > self.timeout_end {
            self.timeout_end = timeout_end;
        }
        self.entry_end = entry_end;
    }
}

/// Pending Interest Table.
#[derive(Debug, Default)]
pub struct Pit {
    entries: Vec<PitEntry>,
}

impl Pit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        interest: Interest,
        in_face: FaceId,
        timeout_end: Instant,
        entry_end: Instant,
    ) {
        self.entries.push(PitEntry {
            interest,
            in_face: Some(in_face),
            timeout_end,
            entry_end,
        });
    }

    /// True when any live entry's Interest carries the same nonce.
    pub fn has_duplicate_nonce(&self, nonce: &[u8]) -> bool {
        self.entries.iter().any(|e| e.interest.nonce == nonce)
    }

    /// Find the entry for the same name arriving on the same face, used
    /// to refresh its deadlines instead of forwarding again.
    pub fn find_same_name_on_face(&mut self, name: &Name, face: FaceId) -> Option<&mut PitEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.in_face == Some(face) && e.interest.name == *name)
    }

    /// Whether a still-pending entry (in-face set, any face) exists for
    /// this exact name. Consumed entries retained for nonce suppression
    /// do not count; a fresh Interest after a timeout must be forwarded
    /// again.
    pub fn has_same_name_pending(&self, name: &Name) -> bool {
        self.entries
            .iter()
            .any(|e| e.in_face.is_some() && e.interest.name == *name)
    }

    /// Entries whose Interest is satisfied by `data` and whose in-face
    /// is still set, in insertion order.
    pub fn match_data<'a>(
        &'a mut self,
        data: &'a Data,
    ) -> impl Iterator<Item = &'a mut PitEntry> + 'a {
        self.entries
            .iter_mut()
            .filter(|e| e.in_face.is_some() && e.interest.matches_data(data))
    }

    /// Expire entries against `now`. Entries past both deadlines are
    /// removed; entries past only `timeout_end` keep their slot but
    /// lose their in-face.
    pub fn sweep(&mut self, now: Instant) {
        for i in (0..self.entries.len()).rev() {
            let entry = &mut self.entries[i];
            if now >= entry.entry_end && now >= entry.timeout_end {
                self.entries.remove(i);
            } else if now >= entry.timeout_end {
                entry.clear_in_face();
            }
        }
    }

    /// Remove every entry whose in-face is `face`.
    pub fn remove_in_face(&mut self, face: FaceId) {
        self.entries.retain(|e| e.in_face != Some(face));
    }

    pub fn entries(&self) -> &[PitEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
