// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-SoC differences in the TMON block.
//!
//! The generations differ only in where the status register keeps its
//! valid bit and data field, and in whether trip interrupts are wired up at
//! all; the rest of the register map is shared.

use crate::regs::genmask;
use bitflags::bitflags;

bitflags! {
    /// Operations a part supports.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct Capabilities: u8 {
        const GET_TEMP = 1 << 0;
        const SET_TRIPS = 1 << 1;
    }
}

/// Layout of the STATUS register.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusLayout {
    pub valid_mask: u32,
    pub data_mask: u32,
    pub data_shift: u32,
}

impl StatusLayout {
    /// Returns the temperature code if the status says a conversion has
    /// completed.
    pub fn code(&self, status: u32) -> Option<u32> {
        if status & self.valid_mask == 0 {
            None
        } else {
            Some((status & self.data_mask) >> self.data_shift)
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Variant {
    /// BCM7445 and the other STB parts, with trip interrupts.
    Bcm7445,
    /// BCM2711 (Raspberry Pi 4): readout only.
    Bcm2711,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Bcm7445, Variant::Bcm2711];

    pub const fn status(self) -> StatusLayout {
        match self {
            Variant::Bcm7445 => StatusLayout {
                valid_mask: 1 << 11,
                data_mask: genmask(10, 1),
                data_shift: 1,
            },
            Variant::Bcm2711 => StatusLayout {
                valid_mask: 1 << 10,
                data_mask: genmask(9, 0),
                data_shift: 0,
            },
        }
    }

    pub const fn capabilities(self) -> Capabilities {
        match self {
            Variant::Bcm7445 => {
                Capabilities::GET_TEMP.union(Capabilities::SET_TRIPS)
            }
            Variant::Bcm2711 => Capabilities::GET_TEMP,
        }
    }

    /// The devicetree compatible string for this part.
    pub const fn compatible(self) -> &'static str {
        match self {
            Variant::Bcm7445 => "brcm,avs-tmon",
            Variant::Bcm2711 => "brcm,avs-tmon-bcm2711",
        }
    }

    /// Looks a part up by its devicetree compatible string.
    pub fn from_compatible(compatible: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.compatible() == compatible)
    }
}
