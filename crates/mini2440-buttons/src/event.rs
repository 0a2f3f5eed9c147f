//! Single-slot event latch shared between the edge handler and readers.
//!
//! The latch packs the pending flag and the line index into one
//! [`AtomicU16`], so consuming is a single swap: a reader that observes
//! the pending bit always sees the index written before the wake, and two
//! readers racing on the same event cannot both win. A second edge before
//! the first is consumed overwrites the index (last-write-wins; the bank
//! keeps no history by design).

use core::sync::atomic::{AtomicU16, Ordering};

use crate::resource::{EintLine, NUM_BUTTONS};
use crate::services::EdgeHandler;
use crate::sync::WaitQueue;

/// Pending flag, kept above the 8-bit index field.
const PENDING: u16 = 1 << 8;

/// The driver's event record plus the wait set of blocked readers.
///
/// One instance per device, shared with the platform as the installed
/// [`EdgeHandler`]. All fields are interrupt-safe: [`on_edge`] performs one
/// array scan, one atomic store, and one bounded wake pass.
///
/// [`on_edge`]: EdgeHandler::on_edge
pub struct EventLatch {
    /// Lines bound to this bank, in index order.
    lines: [EintLine; NUM_BUTTONS],
    /// `PENDING | line_index`, or 0 when no event is latched.
    record: AtomicU16,
    /// Readers suspended waiting for the pending bit.
    readers: WaitQueue,
}

impl EventLatch {
    /// Creates a cleared latch for the given bound lines.
    #[must_use]
    pub fn new(lines: [EintLine; NUM_BUTTONS]) -> Self {
        Self {
            lines,
            record: AtomicU16::new(0),
            readers: WaitQueue::new(),
        }
    }

    /// Consumes the latched event, if any.
    ///
    /// Exactly one concurrent caller observes a given event; the swap
    /// clears the pending bit and hands back the index atomically.
    pub fn try_consume(&self) -> Option<u8> {
        let record = self.record.swap(0, Ordering::Acquire);
        if record & PENDING != 0 {
            #[allow(clippy::cast_possible_truncation)]
            let index = (record & 0xFF) as u8;
            log::trace!("buttons: consumed event, line index {index}");
            Some(index)
        } else {
            None
        }
    }

    /// Reports whether an event is latched, without consuming it.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.record.load(Ordering::Acquire) & PENDING != 0
    }

    /// Discards any latched event. Called on open to drop stale state.
    pub fn clear(&self) {
        self.record.store(0, Ordering::Release);
    }

    /// Returns the wait set of blocked readers.
    pub(crate) fn readers(&self) -> &WaitQueue {
        &self.readers
    }
}

impl EdgeHandler for EventLatch {
    fn on_edge(&self, line: EintLine) {
        // Linear scan; N is small and compile-time fixed.
        for (index, bound) in self.lines.iter().enumerate() {
            if *bound == line {
                #[allow(clippy::cast_possible_truncation)]
                self.record.store(PENDING | index as u16, Ordering::Release);
                self.readers.wake_all();
                return;
            }
        }
        // Unknown line: cannot happen under correct binding; ignore.
    }
}
