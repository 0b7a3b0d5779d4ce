//! The move-only, type-erased task envelope.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// One queued unit of work: a heap-resident callable of erased type.
///
/// Envelopes are move-only by construction (the callable is `FnOnce` and
/// `run` consumes `self`), so a queued task can be invoked at most once.
/// Dropping an envelope without running it releases the callable, which is
/// what happens to tasks still queued when a pool is torn down.
pub(crate) struct Task {
    id: TaskId,
    func: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            id: TaskId::next(),
            func: Box::new(f),
        }
    }

    /// Wake-up envelope pushed into blocking queues during shutdown.
    pub(crate) fn noop() -> Self {
        Task::new(|| {})
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    /// Invoke the callable. Consuming `self` makes a second invocation
    /// unrepresentable.
    pub(crate) fn run(self) {
        (self.func)();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn run_invokes_the_callable() {
        let hit = Arc::new(AtomicBool::new(false));
        let flag = hit.clone();
        let task = Task::new(move || flag.store(true, Ordering::SeqCst));
        task.run();
        assert!(hit.load(Ordering::SeqCst));
    }

    #[test]
    fn drop_without_run_releases_the_callable() {
        let hit = Arc::new(AtomicBool::new(false));
        let flag = hit.clone();
        let task = Task::new(move || flag.store(true, Ordering::SeqCst));
        drop(task);
        assert!(!hit.load(Ordering::SeqCst));
        assert_eq!(Arc::strong_count(&hit), 1);
    }

    #[test]
    fn ids_are_unique() {
        let a = Task::noop();
        let b = Task::noop();
        assert_ne!(a.id(), b.id());
    }
}
