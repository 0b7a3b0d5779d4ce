//! The pool variants and their shared submission interface.
//!
//! Four dispatch topologies coexist behind [`ThreadPool`]:
//!
//! - [`SharedSpinPool`]: one shared nonblocking queue, polling workers.
//! - [`SharedBlockingPool`]: one shared blocking queue, sleeping workers.
//! - [`PerWorkerPool`]: a private queue per worker, random placement.
//! - [`WorkStealingPool`]: scheduler-fed per-worker queues with stealing.
//!
//! [`Pool`] wraps whichever variant the configuration names, so embedders
//! can swap topologies without touching submission sites. Within a single
//! queue FIFO order is preserved; across queues (and under stealing) no
//! ordering is guaranteed, so submitters that need one must serialize on
//! their end.

pub mod per_worker;
pub mod shared_blocking;
pub mod shared_spin;
pub mod work_stealing;

pub use per_worker::PerWorkerPool;
pub use shared_blocking::SharedBlockingPool;
pub use shared_spin::SharedSpinPool;
pub use work_stealing::WorkStealingPool;

use crate::config::{Config, DispatchPolicy};
use crate::error::Result;
use crate::handle::JobHandle;
use crate::metrics::MetricsSnapshot;
use std::fmt;

/// The submission interface every dispatch variant implements.
///
/// A pool is created running and accepts submissions until shutdown begins.
/// Dropping a pool (or calling [`ThreadPool::shutdown`]) drains the tasks
/// already queued, stops the workers, and joins every pool thread before
/// returning.
pub trait ThreadPool: Sized {
    /// Construct a pool from `config`. The `dispatch` field is ignored by
    /// concrete variants; it selects the variant only through [`Pool`].
    ///
    /// If a thread fails to spawn, the partially built pool is torn down
    /// through the full shutdown protocol and the spawn error is returned.
    fn with_config(config: Config) -> Result<Self>;

    /// Construct with the default configuration.
    fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Hand `job` to the pool and return a handle to its eventual result.
    ///
    /// Never blocks beyond the cost of a queue push. Fails with
    /// [`crate::Error::ShuttingDown`] once shutdown has begun.
    fn submit<F, R>(&self, job: F) -> Result<JobHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static;

    /// Number of worker threads.
    fn num_threads(&self) -> usize;

    /// Snapshot of the pool's activity counters.
    fn metrics(&self) -> MetricsSnapshot;

    /// Drain queued tasks, stop and join every pool thread.
    ///
    /// Idempotent; also runs on drop. Afterwards `submit` is rejected.
    fn shutdown(&mut self);
}

/// A worker pool running the dispatch variant named by its configuration.
pub struct Pool {
    inner: Inner,
}

enum Inner {
    SharedSpin(SharedSpinPool),
    SharedBlocking(SharedBlockingPool),
    PerWorker(PerWorkerPool),
    WorkStealing(WorkStealingPool),
}

impl Pool {
    /// Construct a pool with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Construct the variant named by `config.dispatch`.
    pub fn with_config(config: Config) -> Result<Self> {
        let inner = match config.dispatch {
            DispatchPolicy::SharedSpin => Inner::SharedSpin(SharedSpinPool::with_config(config)?),
            DispatchPolicy::SharedBlocking => {
                Inner::SharedBlocking(SharedBlockingPool::with_config(config)?)
            }
            DispatchPolicy::PerWorker => Inner::PerWorker(PerWorkerPool::with_config(config)?),
            DispatchPolicy::WorkStealing => {
                Inner::WorkStealing(WorkStealingPool::with_config(config)?)
            }
        };
        Ok(Self { inner })
    }

    /// Hand `job` to the pool and return a handle to its eventual result.
    pub fn submit<F, R>(&self, job: F) -> Result<JobHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        match &self.inner {
            Inner::SharedSpin(pool) => pool.submit(job),
            Inner::SharedBlocking(pool) => pool.submit(job),
            Inner::PerWorker(pool) => pool.submit(job),
            Inner::WorkStealing(pool) => pool.submit(job),
        }
    }

    /// Number of worker threads.
    pub fn num_threads(&self) -> usize {
        match &self.inner {
            Inner::SharedSpin(pool) => pool.num_threads(),
            Inner::SharedBlocking(pool) => pool.num_threads(),
            Inner::PerWorker(pool) => pool.num_threads(),
            Inner::WorkStealing(pool) => pool.num_threads(),
        }
    }

    /// Snapshot of the pool's activity counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        match &self.inner {
            Inner::SharedSpin(pool) => pool.metrics(),
            Inner::SharedBlocking(pool) => pool.metrics(),
            Inner::PerWorker(pool) => pool.metrics(),
            Inner::WorkStealing(pool) => pool.metrics(),
        }
    }

    /// Drain queued tasks, stop and join every pool thread.
    pub fn shutdown(&mut self) {
        match &mut self.inner {
            Inner::SharedSpin(pool) => pool.shutdown(),
            Inner::SharedBlocking(pool) => pool.shutdown(),
            Inner::PerWorker(pool) => pool.shutdown(),
            Inner::WorkStealing(pool) => pool.shutdown(),
        }
    }

    fn variant_name(&self) -> &'static str {
        match &self.inner {
            Inner::SharedSpin(_) => "SharedSpin",
            Inner::SharedBlocking(_) => "SharedBlocking",
            Inner::PerWorker(_) => "PerWorker",
            Inner::WorkStealing(_) => "WorkStealing",
        }
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("dispatch", &self.variant_name())
            .field("num_threads", &self.num_threads())
            .finish()
    }
}
