//! Variant 1: one shared nonblocking queue, polling workers.
//!
//! Every task lands in a single spin-mutex queue; workers try-pop it and
//! yield the scheduling quantum when it comes up empty. Best for bursts of
//! short tasks on a machine that is not oversubscribed.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::handle::{package, JobHandle};
use crate::metrics::{MetricsSnapshot, PoolMetrics};
use crate::pool::ThreadPool;
use crate::queue::SpinQueue;
use crate::task::Task;
use log::debug;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

struct Shared {
    queue: SpinQueue<Task>,
    draining: AtomicBool,
    done: AtomicBool,
}

/// Pool dispatching every task through one shared spin-mutex queue.
pub struct SharedSpinPool {
    shared: Arc<Shared>,
    metrics: Arc<PoolMetrics>,
    workers: Vec<JoinHandle<()>>,
    num_threads: usize,
}

impl SharedSpinPool {
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
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        debug!("shared-spin pool stopped");
    }
}

impl ThreadPool for SharedSpinPool {
    fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        let mut pool = SharedSpinPool {
            shared: Arc::new(Shared {
                queue: SpinQueue::new(),
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
        debug!("shared-spin pool started with {} workers", num_threads);
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

impl Drop for SharedSpinPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for SharedSpinPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSpinPool")
            .field("num_threads", &self.num_threads)
            .field("queued", &self.shared.queue.len())
            .finish()
    }
}

fn worker_loop(shared: Arc<Shared>) {
    while !shared.done.load(Ordering::Acquire) {
        match shared.queue.try_pop() {
            Some(task) => task.run(),
            None => thread::yield_now(),
        }
    }
}
