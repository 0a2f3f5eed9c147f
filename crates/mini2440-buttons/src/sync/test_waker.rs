//! Test waker utilities for polling futures without an executor.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Wake, Waker};

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
    fn wake_by_ref(self: &Arc<Self>) {}
}

/// Creates a [`Waker`] that does nothing when woken.
pub fn noop_waker() -> Waker {
    Waker::from(Arc::new(NoopWake))
}

struct CountingWake(Arc<AtomicUsize>);

impl Wake for CountingWake {
    fn wake(self: Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Creates a [`Waker`] that increments a counter each time it is woken.
///
/// Clones of the returned waker report `will_wake` for each other, while
/// wakers from separate calls do not, so each call models one distinct task.
pub fn counting_waker() -> (Waker, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let waker = Waker::from(Arc::new(CountingWake(counter.clone())));
    (waker, counter)
}
