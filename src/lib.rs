//! WorkPool 核心库入口
//!
//! A fixed-size pool of worker threads fed by one FIFO queue. Work is submitted
//! as a task plus the state it runs with, the pool is started with an explicit
//! worker count, and shut down either draining or discarding what is still
//! queued.

mod config;
mod item;
mod pool;
mod queue;
mod worker;

pub mod printer;

use std::time::Duration;

/// Worker identifier, assigned in spawn order starting at 0.
pub type WorkerId = usize;

/// Work item identifier, assigned in submission order.
pub type ItemId = u64;

/// 通用错误类型
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    #[error("pool is closed, shutdown already initiated")]
    PoolClosed,

    #[error("pool has already been started")]
    AlreadyStarted,

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{remaining} worker(s) still running after shutdown timeout of {timeout:?}")]
    ShutdownTimeout { remaining: usize, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, PoolError>;

pub use config::{default_worker_count, PoolConfig};
pub use item::TaskOutcome;
pub use pool::stats::PoolMetrics;
pub use pool::{ShutdownMode, ShutdownReport, Submitter, WorkPool};
pub use worker::{FailureKind, FailureSink, LogSink, TaskFailure, WorkerStatus};
