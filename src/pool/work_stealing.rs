//! Variant 4: scheduler-fed per-worker queues with stealing.
//!
//! Submissions land in a blocking intake queue. A dedicated scheduler
//! thread relays each task to a uniformly random worker queue; a worker
//! whose own queue is empty scans its siblings round-robin and takes the
//! first task it finds. Stealing repairs the tail imbalance that random
//! placement alone produces.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::handle::{package, JobHandle};
use crate::metrics::{MetricsSnapshot, PoolMetrics};
use crate::pool::ThreadPool;
use crate::queue::{BlockingQueue, SpinQueue};
use crate::task::Task;
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

struct Shared {
    intake: BlockingQueue<Task>,
    queues: Vec<SpinQueue<Task>>,
    // Tasks accepted but not yet finished. Queue emptiness alone cannot be
    // trusted during drain: a task the scheduler has popped from the intake
    // queue but not yet re-pushed is in neither queue.
    pending: AtomicUsize,
    draining: AtomicBool,
    done: AtomicBool,
    suspend: AtomicBool,
}

impl Shared {
    fn finish_task(&self) {
        // The shutdown wake-up envelope is never accounted, so a pop that
        // would take the counter below zero is skipped rather than wrapped.
        let _ = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

/// Pool relaying tasks through an intake queue onto stealable worker queues.
pub struct WorkStealingPool {
    shared: Arc<Shared>,
    metrics: Arc<PoolMetrics>,
    workers: Vec<JoinHandle<()>>,
    scheduler: Option<JoinHandle<()>>,
    num_threads: usize,
}

impl WorkStealingPool {
    fn spawn_workers(&mut self, config: &Config) -> Result<()> {
        for index in 0..self.num_threads {
            let shared = self.shared.clone();
            let metrics = self.metrics.clone();
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, index));
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }
            let worker = builder.spawn(move || worker_loop(shared, index, metrics))?;
            self.workers.push(worker);
        }
        Ok(())
    }

    fn spawn_scheduler(&mut self, config: &Config) -> Result<()> {
        let shared = self.shared.clone();
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let mut builder =
            thread::Builder::new().name(format!("{}-scheduler", config.thread_name_prefix));
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }
        self.scheduler = Some(builder.spawn(move || scheduler_loop(shared, rng))?);
        Ok(())
    }

    fn stop(&mut self) {
        if self.workers.is_empty() && self.scheduler.is_none() {
            return;
        }
        self.shared.draining.store(true, Ordering::Release);
        self.shared.suspend.store(true, Ordering::Release);
        let mut remaining = self.shared.intake.len();
        remaining += self
            .shared
            .queues
            .iter()
            .map(|q| q.len())
            .sum::<usize>();
        self.shared.suspend.store(false, Ordering::Release);
        while !self.drained() {
            thread::yield_now();
        }
        eprintln!("{} tasks remain before destructing pool.", remaining);
        self.shared.done.store(true, Ordering::Release);
        // Wake the scheduler out of its blocking pop; it relays the no-op
        // to a worker queue and exits on the next done check.
        self.shared.intake.push(Task::noop());
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        if let Some(scheduler) = self.scheduler.take() {
            let _ = scheduler.join();
        }
        debug!("work-stealing pool stopped");
    }

    fn drained(&self) -> bool {
        self.shared.intake.is_empty()
            && self.shared.queues.iter().all(|q| q.is_empty())
            && self.shared.pending.load(Ordering::Acquire) == 0
    }
}

impl ThreadPool for WorkStealingPool {
    fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        let mut pool = WorkStealingPool {
            shared: Arc::new(Shared {
                intake: BlockingQueue::new(),
                queues: (0..num_threads).map(|_| SpinQueue::new()).collect(),
                pending: AtomicUsize::new(0),
                draining: AtomicBool::new(false),
                done: AtomicBool::new(false),
                suspend: AtomicBool::new(false),
            }),
            metrics: Arc::new(PoolMetrics::new()),
            workers: Vec::with_capacity(num_threads),
            scheduler: None,
            num_threads,
        };
        if let Err(e) = pool.spawn_workers(&config) {
            pool.stop();
            return Err(e);
        }
        if let Err(e) = pool.spawn_scheduler(&config) {
            pool.stop();
            return Err(e);
        }
        debug!("work-stealing pool started with {} workers", num_threads);
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
        self.shared.pending.fetch_add(1, Ordering::Release);
        self.shared.intake.push(task);
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

impl Drop for WorkStealingPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for WorkStealingPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkStealingPool")
            .field("num_threads", &self.num_threads)
            .field("intake", &self.shared.intake.len())
            .field("pending", &self.shared.pending.load(Ordering::Relaxed))
            .finish()
    }
}

fn scheduler_loop(shared: Arc<Shared>, mut rng: Pcg64) {
    let count = shared.queues.len();
    while !shared.done.load(Ordering::Acquire) {
        let task = shared.intake.pop();
        shared.queues[rng.gen_range(0..count)].push(task);
    }
    trace!("scheduler thread exiting");
}

fn worker_loop(shared: Arc<Shared>, index: usize, metrics: Arc<PoolMetrics>) {
    let count = shared.queues.len();
    while !shared.done.load(Ordering::Acquire) {
        if let Some(task) = shared.queues[index].try_pop() {
            task.run();
            shared.finish_task();
        } else {
            // Own queue is empty: scan the siblings round-robin, starting
            // just past this worker.
            let mut ran = false;
            for offset in 1..count {
                if let Some(task) = shared.queues[(index + offset) % count].try_pop() {
                    metrics.record_stolen();
                    task.run();
                    shared.finish_task();
                    ran = true;
                    break;
                }
            }
            if !ran {
                thread::yield_now();
            }
        }
        while shared.suspend.load(Ordering::Acquire) {
            thread::yield_now();
        }
    }
}
