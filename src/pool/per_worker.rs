//! Variant 3: a private nonblocking queue per worker, random placement.
//!
//! Submissions land on a uniformly random worker queue and stay there; no
//! stealing. Random placement with private queues is known to imbalance at
//! the tail, which is what the stealing variant exists to fix; this one is
//! the minimum correct topology and a useful baseline.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::handle::{package, JobHandle};
use crate::metrics::{MetricsSnapshot, PoolMetrics};
use crate::pool::ThreadPool;
use crate::queue::SpinQueue;
use crate::task::Task;
use log::debug;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

struct Shared {
    queues: Vec<SpinQueue<Task>>,
    draining: AtomicBool,
    done: AtomicBool,
    suspend: AtomicBool,
}

/// Pool placing each task on a random worker's private queue.
pub struct PerWorkerPool {
    shared: Arc<Shared>,
    metrics: Arc<PoolMetrics>,
    rng: Mutex<Pcg64>,
    workers: Vec<JoinHandle<()>>,
    num_threads: usize,
}

impl PerWorkerPool {
    fn spawn_workers(&mut self, config: &Config) -> Result<()> {
        for index in 0..self.num_threads {
            let shared = self.shared.clone();
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, index));
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }
            let worker = builder.spawn(move || worker_loop(shared, index))?;
            self.workers.push(worker);
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shared.draining.store(true, Ordering::Release);
        // Freeze the workers while sampling so the count is taken from a
        // single point in time. It is still only a lower bound once the
        // workers resume.
        self.shared.suspend.store(true, Ordering::Release);
        let remaining: usize = self.shared.queues.iter().map(|q| q.len()).sum();
        self.shared.suspend.store(false, Ordering::Release);
        for queue in &self.shared.queues {
            while !queue.is_empty() {
                thread::yield_now();
            }
        }
        eprintln!("{} tasks remain before destructing pool.", remaining);
        self.shared.done.store(true, Ordering::Release);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        debug!("per-worker pool stopped");
    }
}

impl ThreadPool for PerWorkerPool {
    fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let mut pool = PerWorkerPool {
            shared: Arc::new(Shared {
                queues: (0..num_threads).map(|_| SpinQueue::new()).collect(),
                draining: AtomicBool::new(false),
                done: AtomicBool::new(false),
                suspend: AtomicBool::new(false),
            }),
            metrics: Arc::new(PoolMetrics::new()),
            rng: Mutex::new(rng),
            workers: Vec::with_capacity(num_threads),
            num_threads,
        };
        if let Err(e) = pool.spawn_workers(&config) {
            pool.stop();
            return Err(e);
        }
        debug!("per-worker pool started with {} workers", num_threads);
        Ok(pool)
    }

    fn submit<F, R>(&self, job: F) -> Result<JobHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.shared.draining.load(Ordering::Acquire) {
            return Err(Error::ShuttingDown);
        }
        let (task, handle) = package(job, self.metrics.clone());
        self.metrics.record_submitted();
        let index = self.rng.lock().gen_range(0..self.num_threads);
        self.shared.queues[index].push(task);
        Ok(handle)
    }

    fn num_threads(&self) -> usize {
        self.num_threads
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn shutdown(&mut self) {
        self.stop();
    }
}

impl Drop for PerWorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for PerWorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerWorkerPool")
            .field("num_threads", &self.num_threads)
            .field(
                "queued",
                &self.shared.queues.iter().map(|q| q.len()).sum::<usize>(),
            )
            .finish()
    }
}

fn worker_loop(shared: Arc<Shared>, index: usize) {
    while !shared.done.load(Ordering::Acquire) {
        match shared.queues[index].try_pop() {
            Some(task) => task.run(),
            None => thread::yield_now(),
        }
        while shared.suspend.load(Ordering::Acquire) {
            thread::yield_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitted_jobs_produce_results() {
        let config = Config::builder().num_threads(4).seed(7).build().unwrap();
        let pool = PerWorkerPool::with_config(config).unwrap();
        let handles: Vec<_> = (0..64).map(|i| pool.submit(move || i * 2).unwrap()).collect();
        let sum: i32 = handles.into_iter().map(|h| h.get().unwrap()).sum();
        assert_eq!(sum, (0..64).map(|i| i * 2).sum());
    }

    #[test]
    fn fixed_seed_places_deterministically() {
        // Two pools with the same seed must draw the same placement
        // sequence; observable here only through both draining cleanly,
        // so the check is on the RNG stream itself.
        let mut a = Pcg64::seed_from_u64(11);
        let mut b = Pcg64::seed_from_u64(11);
        let seq_a: Vec<usize> = (0..32).map(|_| a.gen_range(0..4)).collect();
        let seq_b: Vec<usize> = (0..32).map(|_| b.gen_range(0..4)).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn shutdown_rejects_further_submissions() {
        let config = Config::builder().num_threads(2).build().unwrap();
        let mut pool = PerWorkerPool::with_config(config).unwrap();
        pool.shutdown();
        assert!(matches!(pool.submit(|| ()), Err(Error::ShuttingDown)));
    }
}
