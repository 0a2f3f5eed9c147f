//! Shared helpers for the integration suites.

#![allow(dead_code)] // Each suite uses a subset.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::task::{Context, Poll, Wake, Waker};
use std::thread;

use mini2440_buttons::mock::MockPlatform;
use mini2440_buttons::{ButtonDevice, ResourceTable};

struct ThreadWake(thread::Thread);

impl Wake for ThreadWake {
    fn wake(self: Arc<Self>) {
        self.0.unpark();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.unpark();
    }
}

/// Minimal executor: parks the current thread until the future resolves.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    let waker = Waker::from(Arc::new(ThreadWake(thread::current())));
    let mut cx = Context::from_waker(&waker);
    loop {
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(value) => return value,
            Poll::Pending => thread::park(),
        }
    }
}

struct CountingWake(Arc<AtomicUsize>);

impl Wake for CountingWake {
    fn wake(self: Arc<Self>) {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

/// Waker that counts its wake calls.
pub fn counting_waker() -> (Waker, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let waker = Waker::from(Arc::new(CountingWake(counter.clone())));
    (waker, counter)
}

/// A test descriptor table matching the board wiring.
pub fn test_table() -> ResourceTable {
    use mini2440_buttons::{EintLine, ResourceClaim};
    static CLAIMS: [ResourceClaim; 7] = [
        ResourceClaim::Memory {
            start: 0x5600_0000,
            len: 0x1_0000,
        },
        ResourceClaim::Interrupt(EintLine::new(8)),
        ResourceClaim::Interrupt(EintLine::new(11)),
        ResourceClaim::Interrupt(EintLine::new(13)),
        ResourceClaim::Interrupt(EintLine::new(14)),
        ResourceClaim::Interrupt(EintLine::new(15)),
        ResourceClaim::Interrupt(EintLine::new(19)),
    ];
    ResourceTable::new("test-buttons", &CLAIMS)
}

/// The six EINT numbers, in line-index order.
pub const LINES: [u32; 6] = [8, 11, 13, 14, 15, 19];

/// Builds a device on a fresh mock platform, not yet attached.
pub fn device() -> (Arc<MockPlatform>, Arc<ButtonDevice>) {
    let platform = Arc::new(MockPlatform::new());
    let device = Arc::new(ButtonDevice::new(platform.clone()));
    (platform, device)
}

/// Builds a device already attached and opened against `test_table`.
pub fn opened_device() -> (Arc<MockPlatform>, Arc<ButtonDevice>) {
    let (platform, device) = device();
    device.attach(&test_table()).unwrap();
    device.open().unwrap();
    (platform, device)
}
