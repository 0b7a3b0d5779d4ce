//! Convenient re-exports for common pool types and traits.
//!
//! This module provides a single import for most use cases:
//! ```
//! use varipool::prelude::*;
//! ```

pub use crate::config::{Config, ConfigBuilder, DispatchPolicy};
pub use crate::error::{Error, Result};
pub use crate::handle::JobHandle;
pub use crate::metrics::MetricsSnapshot;
pub use crate::pool::{Pool, ThreadPool};
