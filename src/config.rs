use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::worker::{FailureSink, LogSink};

const DEFAULT_THREAD_NAME_PREFIX: &str = "pool-worker";

/// Number of logical CPUs, the usual worker count for CPU-bound work.
pub fn default_worker_count() -> usize {
    num_cpus::get()
}

/// Pool settings that are fixed for the pool's lifetime.
#[derive(Clone)]
pub struct PoolConfig {
    /// Worker threads are named `<prefix>-<id>`.
    pub thread_name_prefix: String,
    /// Upper bound on how long `shutdown` waits for workers. `None` waits forever.
    pub shutdown_timeout: Option<Duration>,
    /// Where failed work items are reported.
    pub failure_sink: Arc<dyn FailureSink>,
}

impl PoolConfig {
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    pub fn with_failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.failure_sink = sink;
        self
    }

    pub(crate) fn thread_name(&self, id: usize) -> String {
        format!("{}-{}", self.thread_name_prefix, id)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            shutdown_timeout: None,
            failure_sink: Arc::new(LogSink),
        }
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("thread_name_prefix", &self.thread_name_prefix)
            .field("shutdown_timeout", &self.shutdown_timeout)
            // failure_sink is a trait object without Debug
            .finish()
    }
}
