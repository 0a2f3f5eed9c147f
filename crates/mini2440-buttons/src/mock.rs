//! In-memory platform for host-side testing.
//!
//! [`MockPlatform`] implements [`PlatformServices`] over plain bookkeeping:
//! claims and mappings are counted, handlers are stored per line, and
//! [`fire_edge`](MockPlatform::fire_edge) plays the role of the hardware
//! interrupt dispatch. Failure injection covers the two setup paths the
//! lifecycle must unwind: mapping and handler registration.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::error::DriverError;
use crate::resource::{EintLine, MmioRegion};
use crate::services::{EdgeHandler, EdgeTrigger, PlatformServices};
use crate::sync::SpinLock;

/// A platform double with claim/map/registration accounting.
pub struct MockPlatform {
    claims: SpinLock<Vec<(u64, u64)>>,
    mappings: SpinLock<Vec<(u64, u64)>>,
    handlers: SpinLock<BTreeMap<u32, Arc<dyn EdgeHandler>>>,
    /// Remaining successful registrations before injected failure.
    registration_budget: SpinLock<Option<usize>>,
    fail_mapping: SpinLock<bool>,
    total_registrations: AtomicUsize,
}

impl MockPlatform {
    /// Creates a platform with no claims, mappings, or handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            claims: SpinLock::new(Vec::new()),
            mappings: SpinLock::new(Vec::new()),
            handlers: SpinLock::new(BTreeMap::new()),
            registration_budget: SpinLock::new(None),
            fail_mapping: SpinLock::new(false),
            total_registrations: AtomicUsize::new(0),
        }
    }

    /// Makes every subsequent map request fail.
    pub fn fail_mapping(&self) {
        *self.fail_mapping.lock() = true;
    }

    /// Allows `n` more successful registrations, then fails the rest.
    pub fn fail_registration_after(&self, n: usize) {
        *self.registration_budget.lock() = Some(n);
    }

    /// Number of currently claimed ranges.
    #[must_use]
    pub fn claimed_regions(&self) -> usize {
        self.claims.lock().len()
    }

    /// Number of currently live mappings.
    #[must_use]
    pub fn active_mappings(&self) -> usize {
        self.mappings.lock().len()
    }

    /// Number of lines with an installed handler.
    #[must_use]
    pub fn registered_lines(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Lifetime count of successful registrations.
    #[must_use]
    pub fn total_registrations(&self) -> usize {
        self.total_registrations.load(Ordering::SeqCst)
    }

    /// Simulates a hardware edge on `line`.
    ///
    /// Invokes the installed handler outside any mock lock, the way the
    /// platform's interrupt dispatch would. Returns `false` if the line
    /// has no handler.
    pub fn fire_edge(&self, line: EintLine) -> bool {
        let handler = self.handlers.lock().get(&line.as_u32()).cloned();
        match handler {
            Some(handler) => {
                handler.on_edge(line);
                true
            }
            None => false,
        }
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformServices for MockPlatform {
    fn claim_region(&self, start: u64, len: u64) -> Result<(), DriverError> {
        let mut claims = self.claims.lock();
        let overlaps = claims
            .iter()
            .any(|&(s, l)| start < s + l && s < start + len);
        if overlaps {
            return Err(DriverError::ResourceUnavailable);
        }
        claims.push((start, len));
        Ok(())
    }

    fn release_region(&self, start: u64, len: u64) {
        self.claims.lock().retain(|&(s, l)| (s, l) != (start, len));
    }

    fn map_region(&self, start: u64, len: u64) -> Result<MmioRegion, DriverError> {
        if *self.fail_mapping.lock() {
            return Err(DriverError::MappingFailed);
        }
        if !self.claims.lock().iter().any(|&(s, l)| (s, l) == (start, len)) {
            return Err(DriverError::MappingFailed);
        }
        self.mappings.lock().push((start, len));
        // Identity "mapping" is enough for a double; nothing dereferences it.
        // SAFETY: the region is never accessed through the returned pointer.
        Ok(unsafe { MmioRegion::new(start, start, len) })
    }

    fn unmap_region(&self, region: MmioRegion) {
        self.mappings
            .lock()
            .retain(|&(s, l)| (s, l) != (region.phys_base(), region.size()));
    }

    fn register_edge_handler(
        &self,
        line: EintLine,
        _trigger: EdgeTrigger,
        handler: Arc<dyn EdgeHandler>,
    ) -> Result<(), DriverError> {
        let mut budget = self.registration_budget.lock();
        if let Some(remaining) = budget.as_mut() {
            if *remaining == 0 {
                return Err(DriverError::RegistrationFailed);
            }
            *remaining -= 1;
        }
        drop(budget);

        let mut handlers = self.handlers.lock();
        if handlers.contains_key(&line.as_u32()) {
            return Err(DriverError::RegistrationFailed);
        }
        handlers.insert(line.as_u32(), handler);
        self.total_registrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unregister_edge_handler(&self, line: EintLine) {
        self.handlers.lock().remove(&line.as_u32());
    }
}
