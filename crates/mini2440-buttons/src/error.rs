//! Driver error types.

use core::fmt;

/// Errors that can occur during driver operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The hardware resource is exclusively claimed elsewhere.
    ResourceUnavailable,
    /// Mapping the register range into the address space failed.
    MappingFailed,
    /// The resource descriptor table is absent or incomplete.
    MissingResource,
    /// The platform rejected an interrupt-handler registration.
    RegistrationFailed,
    /// No event is pending and the caller asked not to block.
    WouldBlock,
    /// A blocking read was cancelled before an edge arrived.
    Cancelled,
    /// The device is not in a valid state for this operation.
    InvalidState,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable => f.write_str("hardware resource unavailable"),
            Self::MappingFailed => f.write_str("register mapping failed"),
            Self::MissingResource => f.write_str("resource descriptor missing"),
            Self::RegistrationFailed => f.write_str("interrupt registration failed"),
            Self::WouldBlock => f.write_str("no event pending"),
            Self::Cancelled => f.write_str("read cancelled"),
            Self::InvalidState => f.write_str("invalid device state"),
        }
    }
}
