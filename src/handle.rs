//! One-shot result handles pairing a submitted job with its eventual value.

use crate::error::{Error, Result};
use crate::metrics::PoolMetrics;
use crate::task::{Task, TaskId};
use crossbeam_channel::{bounded, Receiver};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Deferred handle to the result of a submitted job.
///
/// The handle starts out pending. Once the job runs, the slot holds either
/// the job's return value or its captured panic, and [`JobHandle::get`]
/// returns it. Retrieval consumes the handle, so a result can be taken at
/// most once; dropping the handle without retrieval is legal and discards
/// the result.
pub struct JobHandle<R> {
    id: TaskId,
    slot: Receiver<Result<R>>,
}

impl<R> JobHandle<R> {
    /// Identifier of the task backing this handle.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Block until the job completes and take its result.
    ///
    /// Returns the job's value, [`Error::Panicked`] if the job panicked, or
    /// [`Error::Abandoned`] if the pool was torn down before the job could
    /// run. The job's memory effects are visible to the caller once `get`
    /// returns.
    pub fn get(self) -> Result<R> {
        match self.slot.recv() {
            Ok(outcome) => outcome,
            // The envelope was dropped without running, so the deposit side
            // of the slot is gone. Surfacing this beats blocking forever.
            Err(_) => Err(Error::Abandoned),
        }
    }
}

impl<R> fmt::Debug for JobHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle").field("id", &self.id).finish()
    }
}

/// Wrap `job` into a task envelope that deposits its outcome into the slot
/// behind the returned handle.
///
/// The job runs under `catch_unwind` so a panicking workload poisons its own
/// handle rather than the worker thread carrying it.
pub(crate) fn package<F, R>(job: F, metrics: Arc<PoolMetrics>) -> (Task, JobHandle<R>)
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (deposit, slot) = bounded(1);
    let task = Task::new(move || {
        let outcome = catch_unwind(AssertUnwindSafe(job))
            .map_err(|payload| Error::Panicked(panic_message(payload)));
        metrics.record_executed();
        // A dropped handle means nobody wants the result; that is fine.
        let _ = deposit.send(outcome);
    });
    let id = task.id();
    (task, JobHandle { id, slot })
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Arc<PoolMetrics> {
        Arc::new(PoolMetrics::new())
    }

    #[test]
    fn get_returns_the_job_value() {
        let (task, handle) = package(|| 6 * 7, metrics());
        task.run();
        assert_eq!(handle.get().unwrap(), 42);
    }

    #[test]
    fn panic_is_captured_into_the_slot() {
        let (task, handle) = package(|| -> u32 { panic!("boom") }, metrics());
        task.run();
        match handle.get() {
            Err(Error::Panicked(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected Panicked, got {:?}", other),
        }
    }

    #[test]
    fn dropped_envelope_yields_abandoned() {
        let (task, handle) = package(|| 1, metrics());
        drop(task);
        match handle.get() {
            Err(Error::Abandoned) => {}
            other => panic!("expected Abandoned, got {:?}", other),
        }
    }

    #[test]
    fn dropping_the_handle_is_legal() {
        let m = metrics();
        let (task, handle) = package(|| 1, m.clone());
        drop(handle);
        task.run();
        assert_eq!(m.snapshot().tasks_executed, 1);
    }

    #[test]
    fn execution_is_recorded_even_on_panic() {
        let m = metrics();
        let (task, handle) = package(|| panic!("bad"), m.clone());
        task.run();
        assert!(handle.get().is_err());
        assert_eq!(m.snapshot().tasks_executed, 1);
    }
}
