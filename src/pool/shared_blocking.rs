//! Variant 2: one shared blocking queue, sleeping workers.
//!
//! Workers park inside the queue's condition variable until a task arrives,
//! so an idle pool burns no cycles. Correct under contention and
//! oversubscription, at the cost of a wakeup on every dispatch. Shutdown
//! wakes each blocked worker with a no-op envelope.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::handle::{package, JobHandle};
use crate::metrics::{MetricsSnapshot, PoolMetrics};
use crate::pool::ThreadPool;
use crate::queue::BlockingQueue;
use crate::task::Task;
use log::debug;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

struct Shared {
    queue: BlockingQueue<Task>,
    draining: AtomicBool,
    done: AtomicBool,
}

/// Pool dispatching every task through one shared blocking queue.
pub struct SharedBlockingPool {
    shared: Arc<Shared>,
    metrics: Arc<PoolMetrics>,
    workers: Vec<JoinHandle<()>>,
    num_threads: usize,
}

impl SharedBlockingPool {
    fn spawn_workers(&mut self, config: &Config) -> Result<()> {
        for index in 0..self.num_threads {
            let shared = self.shared.clone();
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, index));
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }
            let worker = builder.spawn(move || worker_loop(shared))?;
            self.workers.push(worker);
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shared.draining.store(true, Ordering::Release);
        let remaining = self.shared.queue.len();
        while !self.shared.queue.is_empty() {
            thread::yield_now();
        }
        eprintln!("{} tasks remain before destructing pool.", remaining);
        self.shared.done.store(true, Ordering::Release);
        // One wake-up envelope per worker; a worker consumes at most one
        // before it observes `done` and exits, and leftovers drop with the
        // queue.
        for _ in 0..self.workers.len() {
            self.shared.queue.push(Task::noop());
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        debug!("shared-blocking pool stopped");
    }
}

impl ThreadPool for SharedBlockingPool {
    fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        let mut pool = SharedBlockingPool {
            shared: Arc::new(Shared {
                queue: BlockingQueue::new(),
                draining: AtomicBool::new(false),
                done: AtomicBool::new(false),
            }),
            metrics: Arc::new(PoolMetrics::new()),
            workers: Vec::with_capacity(num_threads),
            num_threads,
        };
        if let Err(e) = pool.spawn_workers(&config) {
            pool.stop();
            return Err(e);
        }
        debug!("shared-blocking pool started with {} workers", num_threads);
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
        self.shared.queue.push(task);
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

impl Drop for SharedBlockingPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for SharedBlockingPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBlockingPool")
            .field("num_threads", &self.num_threads)
            .field("queued", &self.shared.queue.len())
            .finish()
    }
}

fn worker_loop(shared: Arc<Shared>) {
    while !shared.done.load(Ordering::Acquire) {
        let task = shared.queue.pop();
        task.run();
    }
}
