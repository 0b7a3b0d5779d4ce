//! varipool - interchangeable worker-thread pool dispatch engines.
//!
//! A family of in-process worker pools that accept heterogeneous closures,
//! dispatch them across a fixed set of worker threads, and hand the
//! submitter a [`JobHandle`] to the eventual result. Four dispatch
//! topologies share one submission interface and are selected by
//! configuration:
//!
//! - [`DispatchPolicy::SharedSpin`]: one shared nonblocking queue under a
//!   spin mutex; workers poll and yield when it is empty.
//! - [`DispatchPolicy::SharedBlocking`]: one shared blocking queue; workers
//!   sleep until notified.
//! - [`DispatchPolicy::PerWorker`]: a private queue per worker with random
//!   placement and no stealing.
//! - [`DispatchPolicy::WorkStealing`]: a scheduler thread relays an intake
//!   queue onto per-worker queues, and idle workers steal from siblings.
//!
//! # Quick Start
//!
//! ```no_run
//! use varipool::prelude::*;
//!
//! let pool = Pool::new().unwrap();
//!
//! let handle = pool.submit(|| 6 * 7).unwrap();
//! assert_eq!(handle.get().unwrap(), 42);
//! ```
//!
//! # Lifecycle
//!
//! A pool is created running and accepts submissions until shutdown begins.
//! Dropping it drains every task already queued, stops and joins all pool
//! threads, and only then returns. Submissions racing shutdown get a typed
//! [`Error::ShuttingDown`] rejection, and a handle whose task was torn away
//! unrun reports [`Error::Abandoned`] instead of blocking forever.

#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod task;
pub mod util;

pub use config::{Config, ConfigBuilder, DispatchPolicy};
pub use error::{Error, Result};
pub use handle::JobHandle;
pub use metrics::MetricsSnapshot;
pub use pool::{Pool, ThreadPool};
pub use task::TaskId;
