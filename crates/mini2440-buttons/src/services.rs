//! Platform service contract for the driver.
//!
//! The driver never touches claim registries, page tables, or interrupt
//! controllers directly; it goes through [`PlatformServices`], implemented
//! by the platform integration (and by [`MockPlatform`](crate::mock) in
//! host-side tests).

extern crate alloc;

use alloc::sync::Arc;

use crate::error::DriverError;
use crate::resource::{EintLine, MmioRegion};

/// Trigger policy for an edge-capable interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTrigger {
    /// Fire on a low-to-high transition.
    Rising,
    /// Fire on a high-to-low transition.
    Falling,
    /// Fire on either transition.
    Both,
}

/// Callback invoked by the platform when a bound line sees an edge.
///
/// Runs in interrupt context: implementations must not block, allocate,
/// or perform unbounded-latency work.
pub trait EdgeHandler: Send + Sync {
    /// Called with the identifier of the line that transitioned.
    fn on_edge(&self, line: EintLine);
}

/// Trait providing platform services to the driver.
///
/// Claim/release and map/unmap are split the way the platform splits them:
/// a claim reserves the range process-wide, a map makes it addressable.
/// Registration installs at most one handler per line; registering an
/// already-bound line fails.
pub trait PlatformServices: Send + Sync {
    /// Reserves exclusive access to a physical register range.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::ResourceUnavailable`] if the range overlaps
    /// an existing claim.
    fn claim_region(&self, start: u64, len: u64) -> Result<(), DriverError>;

    /// Releases a range previously reserved with
    /// [`claim_region`](Self::claim_region).
    fn release_region(&self, start: u64, len: u64);

    /// Maps a claimed physical range into the address space.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::MappingFailed`] on address-space exhaustion
    /// or an invalid range.
    fn map_region(&self, start: u64, len: u64) -> Result<MmioRegion, DriverError>;

    /// Unmaps a region previously returned by [`map_region`](Self::map_region).
    fn unmap_region(&self, region: MmioRegion);

    /// Installs `handler` for edges on `line` with the given trigger.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::RegistrationFailed`] if the line already has
    /// a handler or the platform rejects the trigger.
    fn register_edge_handler(
        &self,
        line: EintLine,
        trigger: EdgeTrigger,
        handler: Arc<dyn EdgeHandler>,
    ) -> Result<(), DriverError>;

    /// Removes the handler installed on `line`, if any.
    fn unregister_edge_handler(&self, line: EintLine);
}
