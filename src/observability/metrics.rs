//! Operation counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of operation counters
///
/// Uses Relaxed ordering; counters are diagnostics, not synchronization.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    reads_completed: AtomicU64,
    reads_not_found: AtomicU64,
    writes_completed: AtomicU64,
    writes_rejected: AtomicU64,
    bytes_appended: AtomicU64,
    admission_timeouts: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment completed reads
    pub fn increment_reads_completed(&self) {
        self.reads_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment reads against absent names
    pub fn increment_reads_not_found(&self) {
        self.reads_not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment completed writes and add their bytes
    pub fn record_write(&self, bytes: u64) {
        self.writes_completed.fetch_add(1, Ordering::Relaxed);
        self.bytes_appended.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Increment writes refused by store limits
    pub fn increment_writes_rejected(&self) {
        self.writes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment admission timeouts
    pub fn increment_admission_timeouts(&self) {
        self.admission_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters, together with gate-level figures
    pub fn snapshot(&self, exclusive_acquisitions: u64, peak_readers: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            reads_completed: self.reads_completed.load(Ordering::Relaxed),
            reads_not_found: self.reads_not_found.load(Ordering::Relaxed),
            writes_completed: self.writes_completed.load(Ordering::Relaxed),
            writes_rejected: self.writes_rejected.load(Ordering::Relaxed),
            bytes_appended: self.bytes_appended.load(Ordering::Relaxed),
            admission_timeouts: self.admission_timeouts.load(Ordering::Relaxed),
            exclusive_acquisitions,
            peak_readers: peak_readers as u64,
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Reads that returned content
    pub reads_completed: u64,
    /// Reads against names never written
    pub reads_not_found: u64,
    /// Writes that appended their payload
    pub writes_completed: u64,
    /// Writes refused by store limits
    pub writes_rejected: u64,
    /// Total payload bytes appended
    pub bytes_appended: u64,
    /// Reads and writes that gave up waiting for admission
    pub admission_timeouts: u64,
    /// Times the exclusive gate was taken by a writer or a reader batch
    pub exclusive_acquisitions: u64,
    /// Most readers admitted at once
    pub peak_readers: u64,
}
