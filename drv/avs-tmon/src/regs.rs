// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TMON register map and raw access.

use bitflags::bitflags;

pub const STATUS: usize = 0x00;
pub const EN_OVERTEMP_RESET: usize = 0x04;
pub const RESET_THRESH: usize = 0x08;
pub const INT_IDLE_TIME: usize = 0x10;
pub const EN_TEMP_INT_SRCS: usize = 0x14;
pub const INT_THRESH: usize = 0x18;
pub const TEMP_INT_CODE: usize = 0x1c;
pub const TP_TEST_ENABLE: usize = 0x20;

/// Bytes of register space the driver touches.
pub const REGION_SIZE: usize = TP_TEST_ENABLE + 4;

bitflags! {
    /// EN_TEMP_INT_SRCS: which comparators may raise the interrupt.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct IntSrcs: u32 {
        const LOW = 1 << 0;
        const HIGH = 1 << 1;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct OvertempReset: u32 {
        const ENABLE = 1 << 0;
    }
}

/// Builds a contiguous mask covering bits `lo..=hi`.
pub const fn genmask(hi: u32, lo: u32) -> u32 {
    (u32::MAX >> (31 - hi)) & (u32::MAX << lo)
}

/// Access to a block of 32-bit TMON registers, addressed by byte offset.
///
/// Every method is a single load or store; `modify` is a plain
/// read-then-write and is only safe against other writers if the caller
/// serializes access.
pub trait RegisterBlock {
    fn read(&self, offset: usize) -> u32;

    fn write(&self, offset: usize, value: u32);

    /// Clears the bits in `clear`, then sets the bits in `set`, preserving
    /// everything else in the register.
    fn modify(&self, offset: usize, clear: u32, set: u32) {
        let v = self.read(offset);
        self.write(offset, (v & !clear) | set);
    }
}

/// The memory-mapped register block of a real device.
pub struct Mmio {
    base: *mut u32,
}

// Safety: the pointer names device registers rather than Rust-owned memory,
// and nothing about them is tied to the creating thread.
unsafe impl Send for Mmio {}

impl Mmio {
    /// Wraps the register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be 4-byte aligned, map at least [`REGION_SIZE`] bytes of
    /// TMON registers for as long as the `Mmio` lives, and must not be accessed
    /// by anything else in the meantime.
    pub const unsafe fn new(base: *mut u32) -> Self {
        Self { base }
    }

    fn reg(&self, offset: usize) -> *mut u32 {
        debug_assert!(offset % 4 == 0 && offset < REGION_SIZE);
        self.base.wrapping_add(offset / 4)
    }
}

impl RegisterBlock for Mmio {
    fn read(&self, offset: usize) -> u32 {
        // Safety: in range and aligned per the contract on `Mmio::new`.
        unsafe { core::ptr::read_volatile(self.reg(offset)) }
    }

    fn write(&self, offset: usize, value: u32) {
        // Safety: as above.
        unsafe { core::ptr::write_volatile(self.reg(offset), value) }
    }
}
