//! Pool activity counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by a pool and its workers.
#[derive(Debug, Default)]
pub(crate) struct PoolMetrics {
    tasks_submitted: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_stolen: AtomicU64,
}

impl PoolMetrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_executed(&self) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stolen(&self) {
        self.tasks_stolen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_stolen: self.tasks_stolen.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a pool's activity counters.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Jobs accepted by `submit`.
    pub tasks_submitted: u64,
    /// Jobs that were invoked, whether they returned or panicked.
    pub tasks_executed: u64,
    /// Jobs a worker took from a sibling's queue.
    pub tasks_stolen: u64,
}

impl fmt::Debug for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsSnapshot")
            .field("tasks_submitted", &self.tasks_submitted)
            .field("tasks_executed", &self.tasks_executed)
            .field("tasks_stolen", &self.tasks_stolen)
            .finish()
    }
}
