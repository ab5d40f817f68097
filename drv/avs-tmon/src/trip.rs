// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where each trip lives in the register map.

use crate::codec::CODE_MAX;
use crate::regs::{self, genmask, IntSrcs, OvertempReset};
use drv_avs_tmon_api::TripKind;
use static_assertions::const_assert;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TripDescriptor {
    /// HW bit to enable the trip
    pub enable_offset: usize,
    pub enable_mask: u32,

    /// HW field holding the trip temperature code
    pub reg_offset: usize,
    pub reg_mask: u32,
    pub reg_shift: u32,
}

impl TripDescriptor {
    /// Extracts this trip's code from a threshold register value.
    pub fn field(&self, reg: u32) -> u32 {
        (reg & self.reg_mask) >> self.reg_shift
    }

    /// Positions `code` within this trip's field; bits that do not fit are
    /// dropped.
    pub fn place(&self, code: u32) -> u32 {
        (code << self.reg_shift) & self.reg_mask
    }
}

const LOW: TripDescriptor = TripDescriptor {
    enable_offset: regs::EN_TEMP_INT_SRCS,
    enable_mask: IntSrcs::LOW.bits(),
    reg_offset: regs::INT_THRESH,
    reg_mask: genmask(10, 1),
    reg_shift: 1,
};

const HIGH: TripDescriptor = TripDescriptor {
    enable_offset: regs::EN_TEMP_INT_SRCS,
    enable_mask: IntSrcs::HIGH.bits(),
    reg_offset: regs::INT_THRESH,
    reg_mask: genmask(26, 17),
    reg_shift: 17,
};

const RESET: TripDescriptor = TripDescriptor {
    enable_offset: regs::EN_OVERTEMP_RESET,
    enable_mask: OvertempReset::ENABLE.bits(),
    reg_offset: regs::RESET_THRESH,
    reg_mask: genmask(10, 1),
    reg_shift: 1,
};

// Every threshold field holds exactly one code.
const_assert!(LOW.reg_mask == CODE_MAX << LOW.reg_shift);
const_assert!(HIGH.reg_mask == CODE_MAX << HIGH.reg_shift);
const_assert!(RESET.reg_mask == CODE_MAX << RESET.reg_shift);

// Low and high share both of their registers.
const_assert!(LOW.reg_offset == HIGH.reg_offset);
const_assert!(LOW.reg_mask & HIGH.reg_mask == 0);
const_assert!(LOW.enable_mask & HIGH.enable_mask == 0);

/// Returns the register layout for `kind`.
pub const fn descriptor(kind: TripKind) -> &'static TripDescriptor {
    match kind {
        TripKind::Low => &LOW,
        TripKind::High => &HIGH,
        TripKind::Reset => &RESET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table() {
        let low = descriptor(TripKind::Low);
        assert_eq!(low.enable_offset, 0x14);
        assert_eq!(low.enable_mask, 1 << 0);
        assert_eq!(low.reg_offset, 0x18);
        assert_eq!(low.reg_mask, 0x0000_07fe);

        let high = descriptor(TripKind::High);
        assert_eq!(high.enable_mask, 1 << 1);
        assert_eq!(high.reg_mask, 0x07fe_0000);

        let reset = descriptor(TripKind::Reset);
        assert_eq!(reset.enable_offset, 0x04);
        assert_eq!(reset.reg_offset, 0x08);
        assert_eq!(reset.reg_shift, 1);
    }

    #[test]
    fn field_packing() {
        let low = descriptor(TripKind::Low);
        let high = descriptor(TripKind::High);

        let reg = low.place(0x155) | high.place(0x2aa);
        assert_eq!(reg, (0x155 << 1) | (0x2aa << 17));
        assert_eq!(low.field(reg), 0x155);
        assert_eq!(high.field(reg), 0x2aa);

        // Junk outside the fields is ignored on the way out, and oversized
        // codes are truncated on the way in.
        assert_eq!(low.field(reg | 0x8000_0001), 0x155);
        assert_eq!(low.place(0x7ff), 0x3ff << 1);
    }
}
