use crossbeam::channel;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use work_pool::{PoolConfig, PoolError, ShutdownMode, WorkPool};

use test_utils::{init_logger, wait_until};

#[test]
fn test_submit_after_discard_is_rejected() {
    init_logger();
    let ran = Arc::new(AtomicBool::new(false));
    let mut pool = WorkPool::new();
    pool.start(2).unwrap();
    pool.shutdown(ShutdownMode::Discard).unwrap();

    let flag = Arc::clone(&ran);
    let result = pool.execute(move || flag.store(true, Ordering::SeqCst));
    assert!(matches!(result, Err(PoolError::PoolClosed)));

    thread::sleep(Duration::from_millis(20));
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(pool.metrics().submitted, 0);
}

#[test]
fn test_discard_drops_queued_but_finishes_in_flight() {
    init_logger();
    let finished = Arc::new(AtomicBool::new(false));
    let counter = Arc::new(AtomicUsize::new(0));
    let (gate_tx, gate_rx) = channel::bounded::<()>(0);

    let mut pool = WorkPool::new();
    pool.start(1).unwrap();
    let submitter = pool.submitter();

    let done = Arc::clone(&finished);
    pool.execute(move || {
        let _ = gate_rx.recv();
        done.store(true, Ordering::SeqCst);
    })
    .unwrap();
    wait_until("the blocking item to start", || pool.metrics().busy_workers == 1);

    for _ in 0..5 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    let shutdown = thread::spawn(move || pool.shutdown(ShutdownMode::Discard));
    wait_until("the pool to close", || submitter.is_closed());
    gate_tx.send(()).unwrap();

    let report = shutdown.join().unwrap().unwrap();
    assert_eq!(report.discarded, 5);
    assert_eq!(report.executed, 1);
    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_drain_runs_every_queued_item() {
    init_logger();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut pool = WorkPool::new();
    pool.start(2).unwrap();

    for _ in 0..20 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            thread::sleep(Duration::from_millis(5));
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    let report = pool.shutdown(ShutdownMode::Drain).unwrap();
    assert_eq!(report.executed, 20);
    assert_eq!(report.discarded, 0);
    assert_eq!(counter.load(Ordering::SeqCst), 20);
    assert_eq!(pool.queued(), 0);
}

#[test]
fn test_shutdown_timeout() {
    init_logger();
    let config = PoolConfig::default().with_shutdown_timeout(Duration::from_millis(50));
    let mut pool = WorkPool::with_config(config);
    pool.start(1).unwrap();

    let (gate_tx, gate_rx) = channel::bounded::<()>(0);
    pool.execute(move || gate_rx.recv()).unwrap();
    wait_until("the blocking item to start", || pool.metrics().busy_workers == 1);

    match pool.shutdown(ShutdownMode::Drain) {
        Err(PoolError::ShutdownTimeout { remaining, timeout }) => {
            assert_eq!(remaining, 1);
            assert_eq!(timeout, Duration::from_millis(50));
        }
        other => panic!("expected shutdown timeout, got {:?}", other),
    }

    // let the detached worker finish
    gate_tx.send(()).unwrap();
}

#[test]
fn test_never_started_pool_discards_on_shutdown() {
    init_logger();
    let ran = Arc::new(AtomicUsize::new(0));
    let mut pool = WorkPool::new();
    for _ in 0..3 {
        let ran = Arc::clone(&ran);
        pool.execute(move || {
            ran.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    let report = pool.shutdown(ShutdownMode::Drain).unwrap();
    assert_eq!(report.discarded, 3);
    assert_eq!(report.executed, 0);
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(pool.metrics().discarded, 3);
}

#[test]
fn test_second_shutdown_is_harmless() {
    init_logger();
    let mut pool = WorkPool::new();
    pool.start(2).unwrap();
    pool.execute(|| {}).unwrap();

    let first = pool.shutdown(ShutdownMode::Drain).unwrap();
    let second = pool.shutdown(ShutdownMode::Discard).unwrap();
    assert_eq!(first.executed, 1);
    assert_eq!(second.executed, 1);
    assert_eq!(second.discarded, 0);
}

#[test]
fn test_drop_drains_pool() {
    init_logger();
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let mut pool = WorkPool::new();
        pool.start(1).unwrap();
        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                thread::sleep(Duration::from_millis(10));
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    }
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}
