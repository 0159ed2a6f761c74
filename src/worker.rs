use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::item::WorkItem;
use crate::pool::stats::PoolStats;
use crate::queue::{Claim, WorkQueue};
use crate::{ItemId, WorkerId};

/// What a worker is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Waiting on the queue for the next item.
    Idle,
    /// Executing an item.
    Busy,
    /// Left its claim loop; the thread is finishing or gone.
    Exited,
}

/// How a work item failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The task returned `Err`.
    Errored,
    /// The task panicked.
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Errored => f.write_str("returned an error"),
            FailureKind::Panicked => f.write_str("panicked"),
        }
    }
}

/// A work item that did not complete. The item is abandoned, never retried.
#[derive(thiserror::Error, Debug, Clone)]
#[error("work item {item} {kind} on worker {worker}: {message}")]
pub struct TaskFailure {
    pub worker: WorkerId,
    pub item: ItemId,
    pub kind: FailureKind,
    pub message: String,
}

/// Receives failures from worker threads.
///
/// Called on the worker that ran the item, after the item has been
/// abandoned. Implementations must not block for long: the worker claims
/// its next item only once `report` returns.
pub trait FailureSink: Send + Sync {
    fn report(&self, failure: &TaskFailure);
}

/// Default sink, writes failures to the `log` facade at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl FailureSink for LogSink {
    fn report(&self, failure: &TaskFailure) {
        log::error!("{}", failure);
    }
}

/// Worker thread implementation
pub(crate) struct Worker {
    id: WorkerId,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Spawn a named worker thread serving `queue` until it is told to terminate.
    pub(crate) fn spawn(
        id: WorkerId,
        name: String,
        queue: Arc<WorkQueue>,
        stats: Arc<PoolStats>,
        sink: Arc<dyn FailureSink>,
    ) -> io::Result<Worker> {
        let thread = thread::Builder::new().name(name).spawn(move || {
            let _exit = ExitGuard {
                queue: Arc::clone(&queue),
                id,
            };
            loop {
                match queue.claim(id) {
                    Claim::Job(item) => run_item(id, item, &stats, sink.as_ref()),
                    Claim::Terminate => {
                        log::debug!("Worker {} received terminate signal", id);
                        break;
                    }
                }
            }
        })?;

        Ok(Worker {
            id,
            thread: Some(thread),
        })
    }

    pub(crate) fn id(&self) -> WorkerId {
        self.id
    }

    /// Wait for the thread to finish.
    pub(crate) fn join(mut self) {
        self.join_thread();
    }

    /// Let the thread run on without waiting for it.
    pub(crate) fn detach(mut self) {
        if self.thread.take().is_some() {
            log::warn!("Worker {} detached while still running", self.id);
        }
    }

    fn join_thread(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Worker {} thread terminated abnormally", self.id);
            }
        }
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("running", &self.thread.is_some())
            .finish()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.join_thread();
    }
}

/// Marks the worker exited however the thread leaves its loop.
struct ExitGuard {
    queue: Arc<WorkQueue>,
    id: WorkerId,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.queue.worker_exited(self.id);
    }
}

fn run_item(worker: WorkerId, item: WorkItem, stats: &PoolStats, sink: &dyn FailureSink) {
    let item_id = item.id();
    log::debug!("Worker {} executing item {}", worker, item_id);
    let start = Instant::now();

    let failure = match panic::catch_unwind(AssertUnwindSafe(move || item.run())) {
        Ok(Ok(())) => None,
        Ok(Err(message)) => Some((FailureKind::Errored, message)),
        Err(payload) => Some((FailureKind::Panicked, panic_message(payload.as_ref()))),
    };

    let duration = start.elapsed();
    match failure {
        None => {
            stats.record_completed();
            log::debug!("Worker {} finished item {} in {:?}", worker, item_id, duration);
        }
        Some((kind, message)) => {
            stats.record_failed();
            let failure = TaskFailure {
                worker,
                item: item_id,
                kind,
                message,
            };
            if panic::catch_unwind(AssertUnwindSafe(|| sink.report(&failure))).is_err() {
                log::error!("Failure sink panicked while reporting: {}", failure);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
