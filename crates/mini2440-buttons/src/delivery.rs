//! Reader-facing delivery primitives: the blocking-read future, the
//! cancellation token it races against, and the poll-style readiness mask.
//!
//! Blocking is expressed as a future: the calling context suspends by
//! pending, and the edge handler resumes it through the wait set. A
//! [`CancelToken`] gives callers an interrupt-the-wait request; there is
//! no timeout here, callers wanting one race `read` against cancellation.

extern crate alloc;

use alloc::sync::Arc;
use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll, Waker};

use bitflags::bitflags;

use crate::error::DriverError;
use crate::event::EventLatch;
use crate::sync::SpinLock;

bitflags! {
    /// Readiness bits reported by a poll without consuming the event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Readiness: u8 {
        /// An event is latched; a read would complete immediately.
        const READABLE = 1 << 0;
    }
}

struct CancelInner {
    cancelled: AtomicBool,
    /// Waker of the reader currently blocked against this token, if any.
    waker: SpinLock<Option<Waker>>,
}

/// Handle used to interrupt a blocking read from another context.
///
/// Cloning shares the token; cancelling any clone cancels the read.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    /// Creates a fresh, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                waker: SpinLock::new(None),
            }),
        }
    }

    /// Requests cancellation and wakes the blocked reader, if any.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        let waker = self.inner.waker.lock().take();
        if let Some(w) = waker {
            w.wake();
        }
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    fn set_waker(&self, waker: &Waker) {
        *self.inner.waker.lock() = Some(waker.clone());
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Future resolving to the line index of the next edge event.
///
/// Returned by [`ButtonDevice::read`](crate::device::ButtonDevice::read).
/// Resolves with [`DriverError::Cancelled`] if the token fires first.
/// Dropping the future removes its wait-set entry, so an abandoned read
/// leaves nothing stale behind.
pub struct ReadFuture {
    latch: Arc<EventLatch>,
    cancel: CancelToken,
    registered: Option<Waker>,
}

impl ReadFuture {
    pub(crate) fn new(latch: Arc<EventLatch>, cancel: CancelToken) -> Self {
        Self {
            latch,
            cancel,
            registered: None,
        }
    }
}

impl Future for ReadFuture {
    type Output = Result<u8, DriverError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(DriverError::Cancelled));
        }
        if let Some(index) = this.latch.try_consume() {
            return Poll::Ready(Ok(index));
        }

        // Register before the final checks so a wake issued between a
        // check and the return cannot be missed.
        this.latch.readers().register(cx.waker());
        this.registered = Some(cx.waker().clone());
        this.cancel.set_waker(cx.waker());

        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(DriverError::Cancelled));
        }
        if let Some(index) = this.latch.try_consume() {
            return Poll::Ready(Ok(index));
        }
        Poll::Pending
    }
}

impl Drop for ReadFuture {
    fn drop(&mut self) {
        if let Some(waker) = self.registered.take() {
            self.latch.readers().remove(&waker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{EintLine, NUM_BUTTONS};
    use crate::services::EdgeHandler;
    use crate::sync::test_waker::{counting_waker, noop_waker};
    use std::sync::atomic::Ordering as AtomicOrdering;

    fn test_latch() -> Arc<EventLatch> {
        let lines: [EintLine; NUM_BUTTONS] = [8u32, 11, 13, 14, 15, 19].map(EintLine::new);
        Arc::new(EventLatch::new(lines))
    }

    fn poll_once(fut: &mut ReadFuture, waker: &Waker) -> Poll<Result<u8, DriverError>> {
        let mut cx = Context::from_waker(waker);
        Pin::new(fut).poll(&mut cx)
    }

    #[test]
    fn resolves_immediately_when_pending() {
        let latch = test_latch();
        latch.on_edge(EintLine::new(11));
        let mut fut = ReadFuture::new(latch, CancelToken::new());
        let waker = noop_waker();
        assert_eq!(poll_once(&mut fut, &waker), Poll::Ready(Ok(1)));
    }

    #[test]
    fn pends_then_resolves_on_edge() {
        let latch = test_latch();
        let mut fut = ReadFuture::new(latch.clone(), CancelToken::new());
        let (waker, count) = counting_waker();

        assert_eq!(poll_once(&mut fut, &waker), Poll::Pending);
        latch.on_edge(EintLine::new(19));
        assert!(count.load(AtomicOrdering::SeqCst) > 0);
        assert_eq!(poll_once(&mut fut, &waker), Poll::Ready(Ok(5)));
    }

    #[test]
    fn cancellation_resolves_with_error() {
        let latch = test_latch();
        let token = CancelToken::new();
        let mut fut = ReadFuture::new(latch, token.clone());
        let (waker, count) = counting_waker();

        assert_eq!(poll_once(&mut fut, &waker), Poll::Pending);
        token.cancel();
        assert!(count.load(AtomicOrdering::SeqCst) > 0);
        assert_eq!(
            poll_once(&mut fut, &waker),
            Poll::Ready(Err(DriverError::Cancelled))
        );
    }

    #[test]
    fn cancelled_before_first_poll() {
        let latch = test_latch();
        let token = CancelToken::new();
        token.cancel();
        let mut fut = ReadFuture::new(latch, token);
        let waker = noop_waker();
        assert_eq!(
            poll_once(&mut fut, &waker),
            Poll::Ready(Err(DriverError::Cancelled))
        );
    }

    #[test]
    fn drop_removes_wait_set_entry() {
        let latch = test_latch();
        let mut fut = ReadFuture::new(latch.clone(), CancelToken::new());
        let (waker, count) = counting_waker();

        assert_eq!(poll_once(&mut fut, &waker), Poll::Pending);
        assert_eq!(latch.readers().len(), 1);
        drop(fut);
        assert!(latch.readers().is_empty());

        // A later edge no longer touches the dropped reader's waker.
        latch.on_edge(EintLine::new(8));
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn event_after_cancelled_reader_wakes_fresh_reader() {
        let latch = test_latch();
        let token = CancelToken::new();
        let mut cancelled = ReadFuture::new(latch.clone(), token.clone());
        let (old_waker, _old_count) = counting_waker();
        assert_eq!(poll_once(&mut cancelled, &old_waker), Poll::Pending);
        token.cancel();
        assert!(matches!(
            poll_once(&mut cancelled, &old_waker),
            Poll::Ready(Err(DriverError::Cancelled))
        ));
        drop(cancelled);
        assert!(latch.readers().is_empty());

        let mut fresh = ReadFuture::new(latch.clone(), CancelToken::new());
        let (waker, count) = counting_waker();
        assert_eq!(poll_once(&mut fresh, &waker), Poll::Pending);
        latch.on_edge(EintLine::new(13));
        assert!(count.load(AtomicOrdering::SeqCst) > 0);
        assert_eq!(poll_once(&mut fresh, &waker), Poll::Ready(Ok(2)));
    }
}
