use crossbeam::channel;
use proptest::prelude::*;
use work_pool::{ShutdownMode, WorkPool};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_every_item_runs_exactly_once(items in 0usize..200, workers in 1usize..8) {
        let (tx, rx) = channel::unbounded();
        let mut pool = WorkPool::new();
        for i in 0..items {
            let tx = tx.clone();
            pool.submit(move |i: usize| tx.send(i), i).unwrap();
        }
        pool.start(workers).unwrap();
        let report = pool.shutdown(ShutdownMode::Drain).unwrap();

        let mut seen: Vec<usize> = rx.try_iter().collect();
        seen.sort_unstable();
        prop_assert_eq!(report.executed, items);
        prop_assert_eq!(seen, (0..items).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_worker_keeps_fifo(items in 1usize..100, start_first in any::<bool>()) {
        let (tx, rx) = channel::unbounded();
        let mut pool = WorkPool::new();
        if start_first {
            pool.start(1).unwrap();
        }
        for i in 0..items {
            let tx = tx.clone();
            pool.submit(move |i: usize| tx.send(i), i).unwrap();
        }
        if !start_first {
            pool.start(1).unwrap();
        }
        pool.shutdown(ShutdownMode::Drain).unwrap();

        let seen: Vec<usize> = rx.try_iter().collect();
        prop_assert_eq!(seen, (0..items).collect::<Vec<_>>());
    }
}
