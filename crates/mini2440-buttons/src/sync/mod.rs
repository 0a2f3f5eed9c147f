//! Synchronization primitives shared between the interrupt path and readers.

mod spinlock;
mod waitqueue;

#[cfg(test)]
pub(crate) mod test_waker;

pub use spinlock::{SpinLock, SpinLockGuard};
pub use waitqueue::WaitQueue;
