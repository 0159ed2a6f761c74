use std::fmt;

use crate::ItemId;

/// A task bound to its state, ready to run once.
pub(crate) type Job = Box<dyn FnOnce() -> std::result::Result<(), String> + Send + 'static>;

/// What a task hands back to the pool.
///
/// `()` always counts as success. A `Result` whose error is `Display` counts
/// as a failed item when it is `Err`, and the rendered error is reported to
/// the pool's failure sink.
pub trait TaskOutcome {
    fn into_outcome(self) -> std::result::Result<(), String>;
}

impl TaskOutcome for () {
    fn into_outcome(self) -> std::result::Result<(), String> {
        Ok(())
    }
}

impl<E: fmt::Display> TaskOutcome for std::result::Result<(), E> {
    fn into_outcome(self) -> std::result::Result<(), String> {
        self.map_err(|e| e.to_string())
    }
}

/// Pairs a task with the single state value it will be called with.
pub(crate) fn bind<S, F, R>(task: F, state: S) -> Job
where
    S: Send + 'static,
    F: FnOnce(S) -> R + Send + 'static,
    R: TaskOutcome,
{
    Box::new(move || task(state).into_outcome())
}

/// One unit of submitted work.
pub(crate) struct WorkItem {
    id: ItemId,
    job: Job,
}

impl WorkItem {
    pub(crate) fn new(id: ItemId, job: Job) -> Self {
        Self { id, job }
    }

    pub(crate) fn id(&self) -> ItemId {
        self.id
    }

    /// Consumes the item, so it can only ever run once.
    pub(crate) fn run(self) -> std::result::Result<(), String> {
        (self.job)()
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem").field("id", &self.id).finish()
    }
}
