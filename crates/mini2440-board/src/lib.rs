//! Resource descriptor tables for the mini2440 board.
//!
//! Pure data: which physical resources exist on this board model, declared
//! once and looked up by device name at attach time. The driver does not
//! care how these values were obtained.

#![cfg_attr(not(test), no_std)]

use mini2440_buttons::{EintLine, ResourceClaim, ResourceTable};

/// Physical base of the S3C2440 GPIO register block.
pub const GPIO_REGS_BASE: u64 = 0x5600_0000;

/// Size of the GPIO register block in bytes.
pub const GPIO_REGS_LEN: u64 = 0x1_0000;

/// Claims for the button bank: the GPIO register range plus the six
/// external-interrupt lines wired to the board's push buttons.
static BUTTON_CLAIMS: [ResourceClaim; 7] = [
    ResourceClaim::Memory {
        start: GPIO_REGS_BASE,
        len: GPIO_REGS_LEN,
    },
    ResourceClaim::Interrupt(EintLine::new(8)),
    ResourceClaim::Interrupt(EintLine::new(11)),
    ResourceClaim::Interrupt(EintLine::new(13)),
    ResourceClaim::Interrupt(EintLine::new(14)),
    ResourceClaim::Interrupt(EintLine::new(15)),
    ResourceClaim::Interrupt(EintLine::new(19)),
];

/// The button-bank descriptor table, registered at boot.
pub static BUTTONS: ResourceTable = ResourceTable::new("mini2440-buttons", &BUTTON_CLAIMS);
