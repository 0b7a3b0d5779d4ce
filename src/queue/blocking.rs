//! Blocking queue built on a mutex and a condition variable.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;

/// FIFO of move-only elements whose `pop` parks the caller until an element
/// is available.
///
/// `push` wakes at most one waiting consumer. The lock is released across
/// the wait so concurrent pushes proceed; spurious wakeups are absorbed by
/// re-checking the non-empty predicate.
pub struct BlockingQueue<T> {
    inner: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Append `element` at the tail and wake one waiting consumer.
    pub fn push(&self, element: T) {
        self.inner.lock().push_back(element);
        self.available.notify_one();
    }

    /// Remove and return the head element, blocking until one arrives.
    pub fn pop(&self) -> T {
        let mut queue = self.inner.lock();
        loop {
            if let Some(element) = queue.pop_front() {
                return element;
            }
            self.available.wait(&mut queue);
        }
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

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingQueue")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn fifo_order_is_preserved() {
        let queue = BlockingQueue::new();
        for i in 0..100 {
            queue.push(i);
        }
        for i in 0..100 {
            assert_eq!(queue.pop(), i);
        }
    }

    #[test]
    fn pop_blocks_until_push() {
        let queue = Arc::new(BlockingQueue::new());

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop())
        };

        // Give the consumer time to park before the element arrives.
        thread::sleep(Duration::from_millis(50));
        queue.push(42);

        assert_eq!(consumer.join().unwrap(), 42);
    }

    #[test]
    fn every_consumer_is_woken() {
        let queue = Arc::new(BlockingQueue::new());
        let mut consumers = Vec::new();

        for _ in 0..4 {
            let queue = queue.clone();
            consumers.push(thread::spawn(move || queue.pop()));
        }
        for i in 0..4 {
            queue.push(i);
        }

        let mut received: Vec<i32> = consumers
            .into_iter()
            .map(|c| c.join().unwrap())
            .collect();
        received.sort_unstable();
        assert_eq!(received, vec![0, 1, 2, 3]);
    }
}
