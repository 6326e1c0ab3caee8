//! Scan counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the decode workers of one scan
#[derive(Debug, Default)]
pub struct ScanMetrics {
    /// Candidates handed to a reader
    pub logs_scanned: AtomicU64,

    /// Candidates decoded and partitioned
    pub logs_loaded: AtomicU64,

    /// Candidates skipped on a recoverable error
    pub logs_skipped: AtomicU64,

    /// Events produced by readers
    pub events_decoded: AtomicU64,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scanned(&self) {
        self.logs_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loaded(&self, events: usize) {
        self.logs_loaded.fetch_add(1, Ordering::Relaxed);
        self.events_decoded
            .fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.logs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            logs_scanned: self.logs_scanned.load(Ordering::Relaxed),
            logs_loaded: self.logs_loaded.load(Ordering::Relaxed),
            logs_skipped: self.logs_skipped.load(Ordering::Relaxed),
            events_decoded: self.events_decoded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of `ScanMetrics`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSnapshot {
    pub logs_scanned: u64,
    pub logs_loaded: u64,
    pub logs_skipped: u64,
    pub events_decoded: u64,
}
