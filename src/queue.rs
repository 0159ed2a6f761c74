use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::item::{Job, WorkItem};
use crate::worker::WorkerStatus;
use crate::{ItemId, PoolError, Result, WorkerId};

/// What a worker gets back from the queue.
pub(crate) enum Claim {
    /// Next item to execute
    Job(WorkItem),
    /// Queue closed and empty, leave the loop
    Terminate,
}

/// Shared FIFO queue feeding the workers.
///
/// Everything workers and submitters coordinate on lives in `QueueState`
/// behind one mutex.
pub(crate) struct WorkQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    exited: Condvar,
}

struct QueueState {
    pending: VecDeque<WorkItem>,
    next_id: ItemId,
    closed: bool,
    live_workers: usize,
    statuses: BTreeMap<WorkerId, WorkerStatus>,
}

impl WorkQueue {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                next_id: 0,
                closed: false,
                live_workers: 0,
                statuses: BTreeMap::new(),
            }),
            available: Condvar::new(),
            exited: Condvar::new(),
        }
    }

    /// Append a job, waking one idle worker.
    pub(crate) fn push(&self, job: Job) -> Result<ItemId> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::PoolClosed);
        }
        let id = state.next_id;
        state.next_id += 1;
        state.pending.push_back(WorkItem::new(id, job));
        drop(state);

        self.available.notify_one();
        Ok(id)
    }

    /// Block until there is an item for `worker` or the queue is closed and empty.
    ///
    /// A closed queue still hands out what it holds, which is how a draining
    /// shutdown finishes the backlog.
    pub(crate) fn claim(&self, worker: WorkerId) -> Claim {
        let mut state = self.state.lock();
        state.statuses.insert(worker, WorkerStatus::Idle);
        loop {
            if let Some(item) = state.pending.pop_front() {
                state.statuses.insert(worker, WorkerStatus::Busy);
                return Claim::Job(item);
            }
            if state.closed {
                return Claim::Terminate;
            }
            self.available.wait(&mut state);
        }
    }

    /// Register a worker before its thread starts, so shutdown waits for it.
    pub(crate) fn worker_started(&self, worker: WorkerId) {
        let mut state = self.state.lock();
        state.live_workers += 1;
        state.statuses.insert(worker, WorkerStatus::Idle);
    }

    pub(crate) fn worker_exited(&self, worker: WorkerId) {
        let mut state = self.state.lock();
        state.live_workers = state.live_workers.saturating_sub(1);
        state.statuses.insert(worker, WorkerStatus::Exited);
        drop(state);

        self.exited.notify_all();
    }

    /// Stop accepting work. When `discard` is set every pending item is
    /// removed and handed back to the caller; otherwise workers keep claiming
    /// until the queue is empty.
    pub(crate) fn close(&self, discard: bool) -> Vec<WorkItem> {
        let mut state = self.state.lock();
        state.closed = true;
        let dropped = if discard {
            state.pending.drain(..).collect()
        } else {
            Vec::new()
        };
        drop(state);

        self.available.notify_all();
        dropped
    }

    /// Wait until no worker is alive. Returns the number still alive when
    /// `deadline` passed first.
    pub(crate) fn wait_for_exit(&self, deadline: Option<Instant>) -> usize {
        let mut state = self.state.lock();
        while state.live_workers > 0 {
            match deadline {
                Some(deadline) => {
                    if self.exited.wait_until(&mut state, deadline).timed_out() {
                        return state.live_workers;
                    }
                }
                None => self.exited.wait(&mut state),
            }
        }
        0
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub(crate) fn statuses(&self) -> BTreeMap<WorkerId, WorkerStatus> {
        self.state.lock().statuses.clone()
    }
}
