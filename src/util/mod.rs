//! Low-level synchronization helpers.

pub mod spin_mutex;

pub use spin_mutex::{SpinMutex, SpinMutexGuard};
