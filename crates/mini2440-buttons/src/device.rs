//! Device lifecycle and the character-device-like control surface.
//!
//! A [`ButtonDevice`] walks `Detached → Attached → Opened → Attached →
//! Detached`. Every hardware acquisition is held in a scoped guard
//! (region claim, register mapping, one guard per interrupt binding), so
//! a failure mid-way through attach or open releases exactly the already
//! acquired resources in reverse order, and teardown is a drop.

extern crate alloc;

use alloc::sync::Arc;
use core::mem;
use core::task::Waker;

use planck_noalloc::vec::ArrayVec;

use crate::delivery::{CancelToken, ReadFuture, Readiness};
use crate::error::DriverError;
use crate::event::EventLatch;
use crate::resource::{EintLine, NUM_BUTTONS, ResourceTable};
use crate::services::{EdgeTrigger, PlatformServices};
use crate::sync::SpinLock;

/// Exclusive claim on the register range; released on drop.
struct RegionClaim {
    services: Arc<dyn PlatformServices>,
    start: u64,
    len: u64,
}

impl RegionClaim {
    fn acquire(
        services: &Arc<dyn PlatformServices>,
        start: u64,
        len: u64,
    ) -> Result<Self, DriverError> {
        services.claim_region(start, len)?;
        Ok(Self {
            services: services.clone(),
            start,
            len,
        })
    }
}

impl Drop for RegionClaim {
    fn drop(&mut self) {
        self.services.release_region(self.start, self.len);
    }
}

/// Live register mapping; unmapped on drop.
struct MmioMap {
    services: Arc<dyn PlatformServices>,
    region: crate::resource::MmioRegion,
}

impl MmioMap {
    fn map(
        services: &Arc<dyn PlatformServices>,
        start: u64,
        len: u64,
    ) -> Result<Self, DriverError> {
        let region = services.map_region(start, len)?;
        Ok(Self {
            services: services.clone(),
            region,
        })
    }
}

impl Drop for MmioMap {
    fn drop(&mut self) {
        self.services.unmap_region(self.region);
    }
}

/// One installed edge handler; deregistered on drop.
struct IrqBinding {
    services: Arc<dyn PlatformServices>,
    line: EintLine,
}

impl IrqBinding {
    fn bind(
        services: &Arc<dyn PlatformServices>,
        line: EintLine,
        handler: Arc<EventLatch>,
    ) -> Result<Self, DriverError> {
        services.register_edge_handler(line, EdgeTrigger::Rising, handler)?;
        Ok(Self {
            services: services.clone(),
            line,
        })
    }
}

impl Drop for IrqBinding {
    fn drop(&mut self) {
        self.services.unregister_edge_handler(self.line);
    }
}

/// Runtime result of claiming the descriptor table.
///
/// Field order matters: the mapping must be torn down before the
/// underlying claim is released.
struct BoundHardware {
    map: MmioMap,
    claim: RegionClaim,
    lines: [EintLine; NUM_BUTTONS],
}

/// Internal lifecycle state with per-state data.
enum State {
    Detached,
    Attached {
        hw: BoundHardware,
        latch: Arc<EventLatch>,
    },
    Opened {
        hw: BoundHardware,
        latch: Arc<EventLatch>,
        bindings: ArrayVec<IrqBinding, NUM_BUTTONS>,
    },
}

/// Lifecycle position of a [`ButtonDevice`], for callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// No hardware bound.
    Detached,
    /// Register range claimed and mapped; interrupts not yet registered.
    Attached,
    /// Interrupt handlers installed; events flowing.
    Opened,
}

/// The button-bank device instance.
///
/// All shared state (event latch, wait set, bound hardware) lives in this
/// instance; tests construct several independent devices side by side.
/// Lifecycle operations serialize on the internal state lock; the read
/// path only touches the latch.
pub struct ButtonDevice {
    services: Arc<dyn PlatformServices>,
    state: SpinLock<State>,
}

impl ButtonDevice {
    /// Creates a detached device using the given platform services.
    #[must_use]
    pub fn new(services: Arc<dyn PlatformServices>) -> Self {
        Self {
            services,
            state: SpinLock::new(State::Detached),
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        match *self.state.lock() {
            State::Detached => DeviceState::Detached,
            State::Attached { .. } => DeviceState::Attached,
            State::Opened { .. } => DeviceState::Opened,
        }
    }

    /// Claims and maps the register range and records the interrupt lines.
    ///
    /// The module-load hook. On failure the device stays `Detached` and no
    /// partially acquired resource survives: the scoped guards release in
    /// reverse acquisition order.
    ///
    /// # Errors
    ///
    /// [`DriverError::MissingResource`] if the table does not hold exactly
    /// one memory claim and exactly [`NUM_BUTTONS`] interrupt claims,
    /// [`DriverError::ResourceUnavailable`] if the range is contended,
    /// [`DriverError::MappingFailed`] if mapping fails, and
    /// [`DriverError::InvalidState`] if the device is not `Detached`.
    pub fn attach(&self, table: &ResourceTable) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if !matches!(*state, State::Detached) {
            return Err(DriverError::InvalidState);
        }

        let (start, len) = table.memory_claim().ok_or(DriverError::MissingResource)?;
        let lines = table
            .interrupt_lines()
            .ok_or(DriverError::MissingResource)?;

        let claim = RegionClaim::acquire(&self.services, start, len)?;
        // A mapping failure drops `claim`, releasing the range.
        let map = MmioMap::map(&self.services, start, len)?;

        let latch = Arc::new(EventLatch::new(lines));
        *state = State::Attached {
            hw: BoundHardware { map, claim, lines },
            latch,
        };
        log::debug!(
            "buttons: attached '{}', registers at {start:#x}+{len:#x}",
            table.name()
        );
        Ok(())
    }

    /// Registers the edge handler on all six lines and starts delivery.
    ///
    /// If registration of line *i* fails, lines *i-1..0* are deregistered
    /// in reverse order before the error is returned; no partial binding
    /// is left live. On success any stale latched event is discarded.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidState`] unless the device is `Attached` (a
    /// second `open()` without `close()` is rejected and never
    /// double-registers), or the registration error from the platform.
    pub fn open(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        match mem::replace(&mut *state, State::Detached) {
            State::Attached { hw, latch } => {
                let mut bindings = ArrayVec::<IrqBinding, NUM_BUTTONS>::new();
                for line in hw.lines {
                    match IrqBinding::bind(&self.services, line, latch.clone()) {
                        Ok(binding) => bindings.push(binding),
                        Err(err) => {
                            log::warn!(
                                "buttons: registering line {} failed: {err}",
                                line.as_u32()
                            );
                            // Unbind in reverse registration order.
                            while bindings.pop().is_some() {}
                            *state = State::Attached { hw, latch };
                            return Err(err);
                        }
                    }
                }
                latch.clear();
                *state = State::Opened {
                    hw,
                    latch,
                    bindings,
                };
                log::debug!("buttons: opened, {NUM_BUTTONS} lines armed");
                Ok(())
            }
            other => {
                *state = other;
                Err(DriverError::InvalidState)
            }
        }
    }

    /// Deregisters all interrupt bindings and stops delivery.
    ///
    /// Unconditional for every bound line, in reverse binding order.
    /// Teardown is best-effort by design; the only reported failure is a
    /// state-machine violation.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidState`] unless the device is `Opened`.
    pub fn close(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        match mem::replace(&mut *state, State::Detached) {
            State::Opened {
                hw,
                latch,
                mut bindings,
            } => {
                while bindings.pop().is_some() {}
                *state = State::Attached { hw, latch };
                log::debug!("buttons: closed, lines released");
                Ok(())
            }
            other => {
                *state = other;
                Err(DriverError::InvalidState)
            }
        }
    }

    /// Unmaps and releases the register range.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidState`] unless the device is `Attached`; the
    /// state machine rules out a double release.
    pub fn detach(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        match mem::replace(&mut *state, State::Detached) {
            State::Attached { hw, latch } => {
                drop(latch);
                // Guard drop order unmaps before releasing the claim.
                drop(hw);
                log::debug!("buttons: detached");
                Ok(())
            }
            other => {
                *state = other;
                Err(DriverError::InvalidState)
            }
        }
    }

    /// Module-unload hook: closes if still open, then detaches.
    ///
    /// Best-effort; underlying teardown cannot fail, and a state-machine
    /// miss here only means there is nothing left to release.
    pub fn shutdown(&self) {
        let _ = self.close();
        if let Err(err) = self.detach() {
            log::debug!("buttons: nothing to detach ({err})");
        }
    }

    /// Non-blocking read of the most recent edge since the last read.
    ///
    /// # Errors
    ///
    /// [`DriverError::WouldBlock`] if no event is latched, or
    /// [`DriverError::InvalidState`] if the device is not open.
    pub fn try_read(&self) -> Result<u8, DriverError> {
        let latch = self.opened_latch()?;
        latch.try_consume().ok_or(DriverError::WouldBlock)
    }

    /// Blocking read: suspends until an edge arrives or `cancel` fires.
    ///
    /// Exactly one concurrent reader consumes a given event. There is no
    /// timeout; race the returned future against the token.
    ///
    /// # Errors
    ///
    /// [`DriverError::Cancelled`] if the token fires before an edge, or
    /// [`DriverError::InvalidState`] if the device is not open.
    pub async fn read(&self, cancel: &CancelToken) -> Result<u8, DriverError> {
        let latch = self.opened_latch()?;
        ReadFuture::new(latch, cancel.clone()).await
    }

    /// Registers `waker` for wake notification and reports readiness
    /// without consuming the latched event.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidState`] if the device is not open.
    pub fn poll_readiness(&self, waker: &Waker) -> Result<Readiness, DriverError> {
        let latch = self.opened_latch()?;
        latch.readers().register(waker);
        if latch.is_pending() {
            Ok(Readiness::READABLE)
        } else {
            Ok(Readiness::empty())
        }
    }

    fn opened_latch(&self) -> Result<Arc<EventLatch>, DriverError> {
        match &*self.state.lock() {
            State::Opened { latch, .. } => Ok(latch.clone()),
            _ => Err(DriverError::InvalidState),
        }
    }
}
