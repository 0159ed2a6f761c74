use std::sync::atomic::{AtomicUsize, Ordering};

/// Monotonic counters shared by submitters and workers.
#[derive(Debug, Default)]
pub(crate) struct PoolStats {
    submitted: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    discarded: AtomicUsize,
}

impl PoolStats {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self, n: usize) {
        self.discarded.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn executed(&self) -> usize {
        self.completed.load(Ordering::Relaxed) + self.failed.load(Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self, queued: usize, idle: usize, busy: usize) -> PoolMetrics {
        PoolMetrics {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            queued,
            idle_workers: idle,
            busy_workers: busy,
        }
    }
}

/// Point-in-time view of a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMetrics {
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
    pub discarded: usize,
    pub queued: usize,
    pub idle_workers: usize,
    pub busy_workers: usize,
}

impl PoolMetrics {
    pub fn utilization(&self) -> f64 {
        let workers = self.idle_workers + self.busy_workers;
        if workers == 0 {
            return 0.0;
        }
        self.busy_workers as f64 / workers as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.completed + self.failed;
        if total == 0 {
            return 1.0;
        }
        self.completed as f64 / total as f64
    }
}
