//! Pool lifecycle: construct, submit, start, shut down.

pub(crate) mod stats;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::PoolConfig;
use crate::item::{bind, TaskOutcome};
use crate::queue::WorkQueue;
use crate::worker::{Worker, WorkerStatus};
use crate::{ItemId, PoolError, Result, WorkerId};
use stats::{PoolMetrics, PoolStats};

/// What happens to items still queued when shutdown starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Workers run every queued item before exiting.
    Drain,
    /// Queued items are dropped unexecuted. In-flight items still finish.
    Discard,
}

/// Outcome of a completed shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Items run over the pool's lifetime, failed ones included.
    pub executed: usize,
    /// Items dropped by this shutdown without running.
    pub discarded: usize,
}

/// Cloneable handle for submitting work from any thread.
#[derive(Clone)]
pub struct Submitter {
    queue: Arc<WorkQueue>,
    stats: Arc<PoolStats>,
}

impl Submitter {
    /// Queue `task` to be called once with `state` on some worker.
    ///
    /// Returns as soon as the item is queued. Fails with
    /// [`PoolError::PoolClosed`] once shutdown has begun, in which case
    /// `task` and `state` are dropped without running.
    pub fn submit<S, F, R>(&self, task: F, state: S) -> Result<ItemId>
    where
        S: Send + 'static,
        F: FnOnce(S) -> R + Send + 'static,
        R: TaskOutcome,
    {
        let id = self.queue.push(bind(task, state))?;
        self.stats.record_submitted();
        Ok(id)
    }

    /// Queue a closure that carries its own state.
    pub fn execute<F, R>(&self, f: F) -> Result<ItemId>
    where
        F: FnOnce() -> R + Send + 'static,
        R: TaskOutcome,
    {
        self.submit(move |()| f(), ())
    }

    /// True once shutdown has begun and submissions are refused.
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

impl fmt::Debug for Submitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submitter")
            .field("closed", &self.queue.is_closed())
            .finish()
    }
}

/// Fixed-size pool of worker threads sharing one FIFO queue.
///
/// Work may be submitted before [`start`](WorkPool::start); it waits in the
/// queue until workers exist. Dropping a started pool drains it.
pub struct WorkPool {
    config: PoolConfig,
    submitter: Submitter,
    workers: Vec<Worker>,
    worker_count: usize,
}

impl WorkPool {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            config,
            submitter: Submitter {
                queue: Arc::new(WorkQueue::new()),
                stats: Arc::new(PoolStats::default()),
            },
            workers: Vec::new(),
            worker_count: 0,
        }
    }

    /// See [`Submitter::submit`].
    pub fn submit<S, F, R>(&self, task: F, state: S) -> Result<ItemId>
    where
        S: Send + 'static,
        F: FnOnce(S) -> R + Send + 'static,
        R: TaskOutcome,
    {
        self.submitter.submit(task, state)
    }

    /// See [`Submitter::execute`].
    pub fn execute<F, R>(&self, f: F) -> Result<ItemId>
    where
        F: FnOnce() -> R + Send + 'static,
        R: TaskOutcome,
    {
        self.submitter.execute(f)
    }

    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Spawn `worker_count` worker threads. The count is fixed from here on.
    ///
    /// If a thread fails to spawn, the workers already running are shut down
    /// discarding the queue and the spawn error is returned.
    pub fn start(&mut self, worker_count: usize) -> Result<()> {
        if worker_count == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }
        let queue = Arc::clone(&self.submitter.queue);
        if queue.is_closed() {
            return Err(PoolError::PoolClosed);
        }
        if self.worker_count > 0 {
            return Err(PoolError::AlreadyStarted);
        }

        self.worker_count = worker_count;
        self.workers.reserve(worker_count);
        for id in 0..worker_count {
            queue.worker_started(id);
            let spawned = Worker::spawn(
                id,
                self.config.thread_name(id),
                Arc::clone(&queue),
                Arc::clone(&self.submitter.stats),
                Arc::clone(&self.config.failure_sink),
            );
            match spawned {
                Ok(worker) => self.workers.push(worker),
                Err(e) => {
                    queue.worker_exited(id);
                    log::error!("Failed to spawn worker {}: {}", id, e);
                    if let Err(shutdown_err) = self.shutdown(ShutdownMode::Discard) {
                        log::error!("Shutdown after failed start: {}", shutdown_err);
                    }
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        log::info!(
            "Pool started with {} worker(s), {} item(s) already queued",
            worker_count,
            queue.len()
        );
        Ok(())
    }

    /// Close the pool and wait for every worker to exit.
    ///
    /// Submissions fail with [`PoolError::PoolClosed`] from the moment this is
    /// called. A pool that was never started has nobody to drain its queue, so
    /// its pending items are discarded in either mode. With a configured
    /// `shutdown_timeout`, workers still running at the deadline are detached
    /// and [`PoolError::ShutdownTimeout`] is returned.
    pub fn shutdown(&mut self, mode: ShutdownMode) -> Result<ShutdownReport> {
        let queue = Arc::clone(&self.submitter.queue);
        let stats = Arc::clone(&self.submitter.stats);

        let discard = mode == ShutdownMode::Discard || self.workers.is_empty();
        let dropped = queue.close(discard);
        let discarded = dropped.len();
        drop(dropped);
        if discarded > 0 {
            stats.record_discarded(discarded);
            log::warn!("Discarded {} queued item(s) on shutdown", discarded);
        }

        log::info!(
            "Shutting down pool ({:?}), waiting for {} worker(s)",
            mode,
            self.workers.len()
        );
        let deadline = self.config.shutdown_timeout.map(|t| Instant::now() + t);
        let remaining = queue.wait_for_exit(deadline);
        if remaining > 0 {
            for worker in self.workers.drain(..) {
                worker.detach();
            }
            return Err(PoolError::ShutdownTimeout {
                remaining,
                timeout: self.config.shutdown_timeout.unwrap_or_default(),
            });
        }

        for worker in self.workers.drain(..) {
            log::debug!("Joining worker {}", worker.id());
            worker.join();
        }

        // workers that died early leave their backlog behind
        let stranded = queue.close(true).len();
        if stranded > 0 {
            stats.record_discarded(stranded);
            log::warn!("{} queued item(s) left with no worker to run them", stranded);
        }
        let discarded = discarded + stranded;

        Ok(ShutdownReport {
            executed: stats.executed(),
            discarded,
        })
    }

    /// Worker count given to `start`, 0 before the pool is started.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Items waiting to be claimed.
    pub fn queued(&self) -> usize {
        self.submitter.queue.len()
    }

    pub fn worker_statuses(&self) -> BTreeMap<WorkerId, WorkerStatus> {
        self.submitter.queue.statuses()
    }

    pub fn metrics(&self) -> PoolMetrics {
        let statuses = self.worker_statuses();
        let count = |wanted: WorkerStatus| statuses.values().filter(|s| **s == wanted).count();
        self.submitter.stats.snapshot(
            self.queued(),
            count(WorkerStatus::Idle),
            count(WorkerStatus::Busy),
        )
    }
}

impl Default for WorkPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkPool")
            .field("config", &self.config)
            .field("workers", &self.workers)
            .field("queued", &self.queued())
            .finish()
    }
}

impl Drop for WorkPool {
    fn drop(&mut self) {
        if self.workers.is_empty() && self.submitter.queue.is_closed() {
            return;
        }
        if let Err(e) = self.shutdown(ShutdownMode::Drain) {
            log::error!("Pool shutdown on drop failed: {}", e);
        }
    }
}
