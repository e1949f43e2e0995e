//! Metrics collection for forwarding statistics.
//!
//! Thread-safe counters and gauges at the global and per-face level.
//! The forwarder itself is single-threaded, but the registry is shared
//! behind an Arc so a host thread can read statistics while the
//! forwarder runs. Transport send failures are swallowed by design;
//! the tx error counters are where they surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-face statistics.
#[derive(Debug, Default)]
pub struct FaceStats {
    pub rx_packets: Counter,
    pub rx_bytes: Counter,
    pub tx_packets: Counter,
    pub tx_bytes: Counter,
    pub tx_errors: Counter,
}

impl FaceStats {
    pub fn record_rx(&self, bytes: usize) {
        self.rx_packets.inc();
        self.rx_bytes.add(bytes as u64);
    }

    pub fn record_tx(&self, bytes: usize) {
        self.tx_packets.inc();
        self.tx_bytes.add(bytes as u64);
    }

    pub fn record_tx_error(&self) {
        self.tx_errors.inc();
    }
}

/// Global metrics registry for the forwarder.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Per-face statistics keyed by face id.
    faces: RwLock<HashMap<u64, FaceStats>>,

    // Interest path
    pub interests_received: Counter,
    pub interests_forwarded: Counter,
    pub duplicate_nonce_drops: Counter,

    // Data path
    pub data_received: Counter,
    pub data_forwarded: Counter,

    // Drops
    pub nacks_dropped: Counter,
    pub malformed_dropped: Counter,
    /// Send failures swallowed by faces.
    pub tx_errors: Counter,

    // Table size gauges
    pub pit_size: AtomicU64,
    pub fib_size: AtomicU64,
    pub face_count: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face for statistics tracking.
    pub fn register_face(&self, face_id: u64) {
        let mut faces = self.faces.write().unwrap();
        faces.entry(face_id).or_default();
    }

    pub fn record_rx(&self, face_id: u64, bytes: usize) {
        if let Some(stats) = self.faces.read().unwrap().get(&face_id) {
            stats.record_rx(bytes);
        }
    }

    pub fn record_tx(&self, face_id: u64, bytes: usize) {
        if let Some(stats) = self.faces.read().unwrap().get(&face_id) {
            stats.record_tx(bytes);
        }
    }

    pub fn record_tx_error(&self, face_id: u64) {
        if let Some(stats) = self.faces.read().unwrap().get(&face_id) {
            stats.record_tx_error();
        }
    }

    pub fn set_pit_size(&self, size: usize) {
        self.pit_size.store(size as u64, Ordering::Relaxed);
    }

    pub fn set_fib_size(&self, size: usize) {
        self.fib_size.store(size as u64, Ordering::Relaxed);
    }

    pub fn set_face_count(&self, count: usize) {
        self.face_count.store(count as u64, Ordering::Relaxed);
    }

    /// Export all metrics as key-value pairs.
    pub fn export(&self) -> Vec<(String, u64)> {
        let mut result = vec![
            ("interests_received".into(), self.interests_received.get()),
            ("interests_forwarded".into(), self.interests_forwarded.get()),
            (
                "duplicate_nonce_drops".into(),
                self.duplicate_nonce_drops.get(),
            ),
            ("data_received".into(), self.data_received.get()),
            ("data_forwarded".into(), self.data_forwarded.get()),
            ("nacks_dropped".into(), self.nacks_dropped.get()),
            ("malformed_dropped".into(), self.malformed_dropped.get()),
            ("tx_errors".into(), self.tx_errors.get()),
            ("pit_size".into(), self.pit_size.load(Ordering::Relaxed)),
            ("fib_size".into(), self.fib_size.load(Ordering::Relaxed)),
            ("face_count".into(), self.face_count.load(Ordering::Relaxed)),
        ];

        let faces = self.faces.read().unwrap();
        for (face_id, stats) in faces.iter() {
            result.extend([
                (format!("face{}_rx_packets", face_id), stats.rx_packets.get()),
                (format!("face{}_rx_bytes", face_id), stats.rx_bytes.get()),
                (format!("face{}_tx_packets", face_id), stats.tx_packets.get()),
                (format!("face{}_tx_bytes", face_id), stats.tx_bytes.get()),
                (format!("face{}_tx_errors", face_id), stats.tx_errors.get()),
            ]);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_basic() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);

        counter.inc();
        assert_eq!(counter.get(), 1);

        counter.add(10);
        assert_eq!(counter.get(), 11);
    }

    #[test]
    fn test_face_stats() {
        let stats = FaceStats::default();

        stats.record_rx(100);
        stats.record_rx(200);
        stats.record_tx(150);
        stats.record_tx_error();

        assert_eq!(stats.rx_packets.get(), 2);
        assert_eq!(stats.rx_bytes.get(), 300);
        assert_eq!(stats.tx_packets.get(), 1);
        assert_eq!(stats.tx_bytes.get(), 150);
        assert_eq!(stats.tx_errors.get(), 1);
    }

    #[test]
    fn test_registry_export() {
        let registry = MetricsRegistry::new();

        registry.register_face(1);
        registry.register_face(2);

        registry.record_rx(1, 100);
        registry.record_tx(1, 200);
        registry.record_rx(2, 50);

        registry.interests_forwarded.inc();
        registry.set_pit_size(3);

        let metrics = registry.export();
        assert!(metrics.contains(&("interests_forwarded".into(), 1)));
        assert!(metrics.contains(&("pit_size".into(), 3)));
        assert!(metrics.contains(&("face1_rx_packets".into(), 1)));
        assert!(metrics.contains(&("face1_tx_bytes".into(), 200)));
        assert!(metrics.contains(&("face2_rx_bytes".into(), 50)));
    }

    #[test]
    fn test_unregistered_face_ignored() {
        let registry = MetricsRegistry::new();
        // No panic, no phantom entries
        registry.record_rx(99, 10);
        assert!(!registry
            .export()
            .iter()
            .any(|(key, _)| key.starts_with("face99")));
    }
}
