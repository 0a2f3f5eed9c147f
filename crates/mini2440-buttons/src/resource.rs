//! Hardware resource descriptors and the claims table consumed at attach.
//!
//! A board crate declares a [`ResourceTable`]: one memory-range claim for
//! the GPIO register block and one interrupt claim per button line. The
//! driver reads the table verbatim during attach and never inspects board
//! headers directly.

/// Number of button lines on the bank. Compile-time fixed.
pub const NUM_BUTTONS: usize = 6;

/// An external-interrupt line identifier assigned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EintLine(u32);

impl EintLine {
    /// Creates a line identifier from the platform's EINT number.
    #[must_use]
    pub const fn new(eint: u32) -> Self {
        Self(eint)
    }

    /// Returns the raw EINT number.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// One hardware resource claim, immutable once declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClaim {
    /// A memory-mapped register range.
    Memory {
        /// Physical base address of the range.
        start: u64,
        /// Length of the range in bytes.
        len: u64,
    },
    /// An edge-capable interrupt line.
    Interrupt(EintLine),
}

/// A named, static table of resource claims for one device.
#[derive(Debug, Clone, Copy)]
pub struct ResourceTable {
    name: &'static str,
    claims: &'static [ResourceClaim],
}

impl ResourceTable {
    /// Creates a table associating `claims` with a device name.
    #[must_use]
    pub const fn new(name: &'static str, claims: &'static [ResourceClaim]) -> Self {
        Self { name, claims }
    }

    /// Returns the device name this table was declared for.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the raw claim slice.
    #[must_use]
    pub const fn claims(&self) -> &'static [ResourceClaim] {
        self.claims
    }

    /// Returns the sole memory claim, or `None` if there is not exactly one.
    #[must_use]
    pub fn memory_claim(&self) -> Option<(u64, u64)> {
        let mut found = None;
        for claim in self.claims {
            if let ResourceClaim::Memory { start, len } = *claim {
                if found.is_some() {
                    return None;
                }
                found = Some((start, len));
            }
        }
        found
    }

    /// Collects the interrupt lines in declaration order.
    ///
    /// Returns `None` unless the table holds exactly [`NUM_BUTTONS`]
    /// interrupt claims; a short or over-full table is malformed.
    #[must_use]
    pub fn interrupt_lines(&self) -> Option<[EintLine; NUM_BUTTONS]> {
        let mut lines = [EintLine::new(0); NUM_BUTTONS];
        let mut count = 0;
        for claim in self.claims {
            if let ResourceClaim::Interrupt(line) = *claim {
                if count == NUM_BUTTONS {
                    return None;
                }
                lines[count] = line;
                count += 1;
            }
        }
        if count == NUM_BUTTONS { Some(lines) } else { None }
    }
}

/// A live mapping of a physical register range.
///
/// Handed out by the platform in response to a map request. The address
/// pair is opaque to the event path; the driver only ever forwards it back
/// for unmapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioRegion {
    phys_base: u64,
    virt_base: u64,
    size: u64,
}

impl MmioRegion {
    /// Creates a mapped-region descriptor.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `virt_base` is a live mapping of the
    /// physical range and remains valid until the region is unmapped.
    #[must_use]
    pub const unsafe fn new(phys_base: u64, virt_base: u64, size: u64) -> Self {
        Self {
            phys_base,
            virt_base,
            size,
        }
    }

    /// Returns the physical base address.
    #[must_use]
    pub const fn phys_base(&self) -> u64 {
        self.phys_base
    }

    /// Returns the virtual base address of the mapping.
    #[must_use]
    pub const fn virt_base(&self) -> u64 {
        self.virt_base
    }

    /// Returns the size of the region in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns a pointer to the given byte offset within the region.
    ///
    /// Returns `None` if the offset is out of bounds.
    #[must_use]
    pub const fn ptr_at(&self, offset: u64) -> Option<*mut u8> {
        if offset < self.size {
            Some((self.virt_base + offset) as *mut u8)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn memory_claim_found() {
        let table = ResourceTable::new("buttons", &CLAIMS);
        assert_eq!(table.memory_claim(), Some((0x5600_0000, 0x1_0000)));
        let lines = table.interrupt_lines().unwrap();
        assert_eq!(lines[0], EintLine::new(8));
        assert_eq!(lines[5], EintLine::new(19));
    }

    #[test]
    fn duplicate_memory_claim_rejected() {
        static CLAIMS: [ResourceClaim; 2] = [
            ResourceClaim::Memory { start: 0, len: 16 },
            ResourceClaim::Memory { start: 16, len: 16 },
        ];
        let table = ResourceTable::new("buttons", &CLAIMS);
        assert_eq!(table.memory_claim(), None);
    }

    #[test]
    fn short_interrupt_table_rejected() {
        static CLAIMS: [ResourceClaim; 2] = [
            ResourceClaim::Interrupt(EintLine::new(8)),
            ResourceClaim::Interrupt(EintLine::new(11)),
        ];
        let table = ResourceTable::new("buttons", &CLAIMS);
        assert_eq!(table.interrupt_lines(), None);
    }

    #[test]
    fn mmio_region_ptr_at() {
        // SAFETY: test-only, no real hardware behind the addresses.
        let region = unsafe { MmioRegion::new(0x5600_0000, 0x5600_0000, 4096) };
        assert!(region.ptr_at(0).is_some());
        assert!(region.ptr_at(4095).is_some());
        assert!(region.ptr_at(4096).is_none());
    }
}
