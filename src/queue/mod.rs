//! Concurrent FIFO queues shared between submitters and workers.
//!
//! Two flavors with the same shape: [`SpinQueue`] never blocks and reports
//! emptiness through `try_pop`, while [`BlockingQueue`] parks consumers
//! until an element arrives. Both are safe for any number of producers and
//! consumers; `len` and `is_empty` are point-in-time observations, not
//! stability guarantees.

pub mod blocking;
pub mod spin;

pub use blocking::BlockingQueue;
pub use spin::SpinQueue;
