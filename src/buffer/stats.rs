// Lock-free persister statistics using atomic operations
//
// Save failures never reach a caller, so these counters are where they
// remain visible.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PersisterStats {
    admitted: AtomicU64,
    saved: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
    cleared: AtomicU64,
    discarded: AtomicU64,
}

impl PersisterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_admitted(&self, count: usize) {
        self.admitted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_saved(&self) {
        self.saved.fetch_add(1, Ordering::Relaxed);
    }

    /// Store returned an error
    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Store panicked
    pub(crate) fn record_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cleared(&self, count: usize) {
        self.cleared.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self, count: usize) {
        self.discarded.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PersisterStatsSnapshot {
        PersisterStatsSnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            saved: self.saved.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            cleared: self.cleared.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of persister statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersisterStatsSnapshot {
    pub admitted: u64,
    pub saved: u64,
    pub failed: u64,
    pub panicked: u64,
    pub cleared: u64,
    pub discarded: u64,
}

impl PersisterStatsSnapshot {
    /// Measurements that reached storage, successfully or not.
    pub fn attempted(&self) -> u64 {
        self.saved + self.failed + self.panicked
    }

    /// Measurements admitted but never handed to storage.
    pub fn dropped(&self) -> u64 {
        self.cleared + self.discarded
    }

    /// Admitted measurements whose fate is not decided yet.
    pub fn outstanding(&self) -> u64 {
        self.admitted
            .saturating_sub(self.attempted())
            .saturating_sub(self.dropped())
    }

    /// Share of attempted saves that succeeded (1.0 when nothing was attempted).
    pub fn success_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            return 1.0;
        }
        self.saved as f64 / attempted as f64
    }
}
