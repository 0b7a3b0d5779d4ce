//! Stress tests for the pool variants

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use varipool::prelude::*;

const POLICIES: [DispatchPolicy; 4] = [
    DispatchPolicy::SharedSpin,
    DispatchPolicy::SharedBlocking,
    DispatchPolicy::PerWorker,
    DispatchPolicy::WorkStealing,
];

fn pool_with(policy: DispatchPolicy, threads: usize) -> Pool {
    let config = Config::builder()
        .dispatch(policy)
        .num_threads(threads)
        .seed(7)
        .build()
        .unwrap();
    Pool::with_config(config).unwrap()
}

#[test]
#[ignore] // Run with --ignored flag
fn stress_hundred_thousand_indexed_results() {
    for policy in POLICIES {
        let pool = pool_with(policy, 8);
        let handles: Vec<_> = (0..100_000usize)
            .map(|i| pool.submit(move || i).unwrap())
            .collect();

        let mut results: Vec<usize> = handles.into_iter().map(|h| h.get().unwrap()).collect();
        results.sort_unstable();
        assert_eq!(results, (0..100_000).collect::<Vec<_>>());
    }
}

#[test]
#[ignore]
fn stress_million_increments() {
    for policy in [DispatchPolicy::SharedBlocking, DispatchPolicy::WorkStealing] {
        let pool = pool_with(policy, 8);
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..1_000_000)
            .map(|_| {
                let counter = counter.clone();
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap()
            })
            .collect();
        for handle in handles {
            handle.get().unwrap();
        }

        assert_eq!(counter.load(Ordering::Relaxed), 1_000_000);
    }
}

#[test]
#[ignore]
fn stress_stealing_liveness_long_run() {
    let pool = pool_with(DispatchPolicy::WorkStealing, 16);
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut handles = Vec::new();

    let mut i = 0usize;
    while Instant::now() < deadline {
        let work = i % 64;
        handles.push(
            pool.submit(move || {
                if work == 0 {
                    std::thread::sleep(Duration::from_millis(1));
                }
                work
            })
            .unwrap(),
        );
        i += 1;
        if i % 256 == 0 {
            std::thread::yield_now();
        }
    }
    for handle in handles {
        handle.get().unwrap();
    }

    let metrics = pool.metrics();
    assert_eq!(metrics.tasks_submitted, i as u64);
    assert!(metrics.tasks_stolen > 0);
}

#[test]
#[ignore]
fn stress_thousand_pool_churn() {
    for policy in POLICIES {
        for _ in 0..1_000 {
            let pool = pool_with(policy, 2);
            drop(pool);
        }
    }
}
