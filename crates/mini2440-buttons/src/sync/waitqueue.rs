//! Wait queue for interrupt-driven wakeups.
//!
//! [`WaitQueue`] stores [`Waker`]s from reader contexts that are waiting
//! for a pending event. The edge handler calls [`wake_all`] to resume
//! them. Uses a fixed-capacity [`ArrayVec`] so the interrupt path never
//! allocates.
//!
//! Registration de-duplicates by [`Waker::will_wake`], and a registered
//! waker can be removed again when a waiting future is dropped, so a
//! cancelled reader leaves no stale entry behind.
//!
//! [`wake_all`]: WaitQueue::wake_all

use core::task::Waker;

use planck_noalloc::vec::ArrayVec;

use super::SpinLock;

/// Maximum number of waiters per queue.
const MAX_WAITERS: usize = 32;

/// A fixed-capacity set of [`Waker`]s awaiting a pending event.
pub struct WaitQueue {
    waiters: SpinLock<ArrayVec<Waker, MAX_WAITERS>>,
}

impl WaitQueue {
    /// Creates an empty wait queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            waiters: SpinLock::new(ArrayVec::new()),
        }
    }

    /// Registers a waker, replacing any entry that would wake the same task.
    ///
    /// Returns `true` if the waker is registered afterwards, `false` if the
    /// queue is full.
    pub fn register(&self, waker: &Waker) -> bool {
        let mut waiters = self.waiters.lock();
        // Drop any existing entry for this task before re-inserting.
        let mut kept = ArrayVec::<Waker, MAX_WAITERS>::new();
        while let Some(w) = waiters.pop() {
            if !w.will_wake(waker) {
                kept.push(w);
            }
        }
        while let Some(w) = kept.pop() {
            waiters.push(w);
        }
        if waiters.len() < MAX_WAITERS {
            waiters.push(waker.clone());
            true
        } else {
            false
        }
    }

    /// Removes the entry that would wake the same task as `waker`, if any.
    pub fn remove(&self, waker: &Waker) {
        let mut waiters = self.waiters.lock();
        let mut kept = ArrayVec::<Waker, MAX_WAITERS>::new();
        while let Some(w) = waiters.pop() {
            if !w.will_wake(waker) {
                kept.push(w);
            }
        }
        while let Some(w) = kept.pop() {
            waiters.push(w);
        }
    }

    /// Wakes every waiting task.
    ///
    /// Wakers are drained under the lock and woken outside it, so a waker
    /// that re-registers from its wake callback cannot deadlock.
    pub fn wake_all(&self) {
        let mut drained = ArrayVec::<Waker, MAX_WAITERS>::new();
        {
            let mut waiters = self.waiters.lock();
            while let Some(w) = waiters.pop() {
                drained.push(w);
            }
        }
        while let Some(w) = drained.pop() {
            w.wake();
        }
    }

    /// Returns the number of registered waiters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waiters.lock().len()
    }

    /// Returns `true` if no waiters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waiters.lock().is_empty()
    }
}

impl Default for WaitQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::test_waker::{counting_waker, noop_waker};
    use std::sync::atomic::Ordering;

    #[test]
    fn register_succeeds() {
        let wq = WaitQueue::new();
        let waker = noop_waker();
        assert!(wq.register(&waker));
        assert_eq!(wq.len(), 1);
    }

    #[test]
    fn register_dedups_same_task() {
        let wq = WaitQueue::new();
        let (waker, _count) = counting_waker();
        assert!(wq.register(&waker));
        assert!(wq.register(&waker.clone()));
        assert_eq!(wq.len(), 1);
    }

    #[test]
    fn register_full() {
        let wq = WaitQueue::new();
        for _ in 0..MAX_WAITERS {
            // Each counting waker is a distinct task.
            let (waker, _count) = counting_waker();
            assert!(wq.register(&waker));
        }
        let (extra, _count) = counting_waker();
        assert!(!wq.register(&extra));
    }

    #[test]
    fn wake_all_wakes_everyone() {
        let wq = WaitQueue::new();
        let (w1, c1) = counting_waker();
        let (w2, c2) = counting_waker();
        wq.register(&w1);
        wq.register(&w2);

        wq.wake_all();
        assert!(c1.load(Ordering::SeqCst) > 0);
        assert!(c2.load(Ordering::SeqCst) > 0);
        assert!(wq.is_empty());
    }

    #[test]
    fn remove_leaves_others() {
        let wq = WaitQueue::new();
        let (w1, c1) = counting_waker();
        let (w2, c2) = counting_waker();
        wq.register(&w1);
        wq.register(&w2);

        wq.remove(&w1);
        wq.wake_all();
        assert_eq!(c1.load(Ordering::SeqCst), 0);
        assert!(c2.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn wake_all_empty_no_panic() {
        let wq = WaitQueue::new();
        wq.wake_all();
    }
}
