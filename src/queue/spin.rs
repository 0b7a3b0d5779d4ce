//! Nonblocking queue serialized under a spin mutex.

use crate::util::SpinMutex;
use std::collections::VecDeque;
use std::fmt;

/// FIFO of move-only elements; all operations busy-wait for the lock and
/// complete in O(1) amortized.
pub struct SpinQueue<T> {
    inner: SpinMutex<VecDeque<T>>,
}

impl<T> SpinQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: SpinMutex::new(VecDeque::new()),
        }
    }

    /// Append `element` at the tail. Always succeeds.
    pub fn push(&self, element: T) {
        self.inner.lock().push_back(element);
    }

    /// Remove and return the head element, or `None` if the queue is empty.
    /// Never blocks beyond the lock acquisition.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    /// Snapshot: whether the queue was empty at the time of observation.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Snapshot: number of queued elements at the time of observation.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl<T> Default for SpinQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SpinQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinQueue").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn pop_on_empty_returns_none() {
        let queue: SpinQueue<i32> = SpinQueue::new();
        assert!(queue.try_pop().is_none());
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn fifo_order_is_preserved() {
        let queue = SpinQueue::new();
        for i in 0..100 {
            queue.push(i);
        }
        for i in 0..100 {
            assert_eq!(queue.try_pop(), Some(i));
        }
        assert!(queue.try_pop().is_none());
    }

    #[test]
    fn each_element_is_popped_exactly_once() {
        let queue = Arc::new(SpinQueue::new());
        for i in 0..10_000u32 {
            queue.push(i);
        }

        let mut consumers = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            consumers.push(thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(value) = queue.try_pop() {
                    seen.push(value);
                }
                seen
            }));
        }

        let mut all = HashSet::new();
        for consumer in consumers {
            for value in consumer.join().unwrap() {
                assert!(all.insert(value), "value {} popped twice", value);
            }
        }
        assert_eq!(all.len(), 10_000);
    }
}
