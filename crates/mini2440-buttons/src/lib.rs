//! Edge-triggered button-bank event driver for the mini2440 board.
//!
//! Six GPIO-backed external-interrupt lines feed one logical event
//! stream. The crate is organized the way the hardware is layered:
//!
//! - **Resources** -- [`ResourceTable`] claims ([`ResourceClaim`],
//!   [`EintLine`], [`MmioRegion`]) declared by a board crate.
//! - **Platform contract** -- [`PlatformServices`], the narrow interface
//!   the driver consumes for claiming, mapping, and interrupt binding.
//! - **Event capture** -- [`EventLatch`], the single-slot record written
//!   from interrupt context (last-write-wins; no queueing by design).
//! - **Delivery** -- [`ReadFuture`]/[`CancelToken`]/[`Readiness`], the
//!   blocking and poll-style read surface.
//! - **Lifecycle** -- [`ButtonDevice`], the attach/open/close/detach
//!   state machine that never leaks a mapping or a registered handler.
//!
//! Host-side tests drive the whole stack through [`mock::MockPlatform`].

#![cfg_attr(not(test), no_std)]

pub mod delivery;
pub mod device;
pub mod error;
pub mod event;
pub mod mock;
pub mod resource;
pub mod services;
pub mod sync;

// Re-export the public surface at the crate root for ergonomic imports.
pub use delivery::{CancelToken, ReadFuture, Readiness};
pub use device::{ButtonDevice, DeviceState};
pub use error::DriverError;
pub use event::EventLatch;
pub use resource::{EintLine, MmioRegion, NUM_BUTTONS, ResourceClaim, ResourceTable};
pub use services::{EdgeHandler, EdgeTrigger, PlatformServices};
