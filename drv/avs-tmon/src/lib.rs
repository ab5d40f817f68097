// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver for the Broadcom STB AVS TMON thermal sensor
//!
//! The TMON block continuously converts the die temperature into a 10-bit
//! code and compares it against three programmable trips:
//!
//! - **low** and **high** raise an interrupt when the temperature falls to
//!   or rises to their threshold;
//! - **reset** resets the chip, with no software involvement, when the
//!   temperature climbs past its threshold.
//!
//! The driver keeps no copy of any trip: every query reads the registers, and
//! every change is a read-modify-write of them. Because several trips share
//! a register, all register access goes through a lock owned by [`Tmon`],
//! which the interrupt path ([`Tmon::handle_interrupt`]) releases before
//! calling back into the thermal framework.

#![cfg_attr(not(test), no_std)]

use drv_avs_tmon_api::{
    high_bound, low_bound, MilliCelsius, ThermalSensor, TmonError, TripKind,
    TripStatus,
};
use enum_map::EnumMap;
use ringbuf::{ringbuf, ringbuf_entry};
use spin::Mutex;

pub mod codec;
mod irq;
pub mod regs;
pub mod trip;
pub mod variant;

pub use regs::{Mmio, RegisterBlock};
pub use variant::{Capabilities, Variant};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Trace {
    None,
    Attached(Variant),
    NotReady { status: u32 },
    TripEnable { kind: TripKind, enabled: bool },
    TripTemp {
        kind: TripKind,
        temp: MilliCelsius,
        code: u32,
    },
    SetTrips {
        low: Option<MilliCelsius>,
        high: Option<MilliCelsius>,
    },
    TripsUnsupported(Variant),
    Interrupt {
        low: MilliCelsius,
        intr: MilliCelsius,
        high: MilliCelsius,
    },
}

ringbuf!(Trace, 32, Trace::None);

/// One TMON instance.
pub struct Tmon<R> {
    regs: Mutex<R>,
    variant: Variant,
}

impl<R: RegisterBlock> Tmon<R> {
    /// Takes ownership of a mapped register block for the given part.
    pub fn new(regs: R, variant: Variant) -> Self {
        ringbuf_entry!(Trace::Attached(variant));
        Self {
            regs: Mutex::new(regs),
            variant,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Arms or disarms a trip.
    pub fn set_trip_enabled(&self, kind: TripKind, enabled: bool) {
        enable_trip(&*self.regs.lock(), kind, enabled);
    }

    /// Reads back the temperature a trip is programmed for.
    pub fn trip_temperature(&self, kind: TripKind) -> MilliCelsius {
        read_trip_temp(&*self.regs.lock(), kind)
    }

    /// Programs a trip's threshold, leaving its enable state alone.
    pub fn set_trip_temperature(&self, kind: TripKind, temp: MilliCelsius) {
        write_trip_temp(&*self.regs.lock(), kind, temp);
    }

    /// Reads the latest conversion.
    ///
    /// Readings below zero are reported as zero.
    pub fn get_current_temperature(&self) -> Result<MilliCelsius, TmonError> {
        let status = self.regs.lock().read(regs::STATUS);

        let code = self.variant.status().code(status).ok_or_else(|| {
            ringbuf_entry!(Trace::NotReady { status });
            TmonError::NotReady
        })?;

        Ok(codec::code_to_temp(code).clamp_non_negative())
    }

    /// Sets the window outside of which the sensor interrupts. `None` on
    /// either side turns that comparator off without touching its threshold.
    pub fn set_trips(
        &self,
        low: Option<MilliCelsius>,
        high: Option<MilliCelsius>,
    ) -> Result<(), TmonError> {
        if !self.variant.capabilities().contains(Capabilities::SET_TRIPS) {
            ringbuf_entry!(Trace::TripsUnsupported(self.variant));
            return Err(TmonError::TripsUnsupported);
        }

        ringbuf_entry!(Trace::SetTrips { low, high });

        let regs = self.regs.lock();
        for (kind, bound) in [(TripKind::Low, low), (TripKind::High, high)] {
            match bound {
                Some(temp) => {
                    write_trip_temp(&*regs, kind, temp);
                    enable_trip(&*regs, kind, true);
                }
                None => enable_trip(&*regs, kind, false),
            }
        }

        Ok(())
    }

    /// Reads every trip's enable bit and threshold in one go.
    pub fn trip_status(&self) -> EnumMap<TripKind, TripStatus> {
        let regs = self.regs.lock();
        EnumMap::from_fn(|kind| TripStatus {
            enabled: trip_enabled(&*regs, kind),
            threshold: read_trip_temp(&*regs, kind),
        })
    }
}

impl<R: RegisterBlock> ThermalSensor for Tmon<R> {
    fn get_temp(&self) -> Result<MilliCelsius, TmonError> {
        self.get_current_temperature()
    }

    fn set_trips(&self, low: i32, high: i32) -> Result<(), TmonError> {
        Tmon::set_trips(self, low_bound(low), high_bound(high))
    }
}

// The helpers below expect the caller to hold the register lock.

fn enable_trip<R: RegisterBlock>(regs: &R, kind: TripKind, enabled: bool) {
    let trip = trip::descriptor(kind);

    ringbuf_entry!(Trace::TripEnable { kind, enabled });

    if enabled {
        regs.modify(trip.enable_offset, 0, trip.enable_mask);
    } else {
        regs.modify(trip.enable_offset, trip.enable_mask, 0);
    }
}

fn trip_enabled<R: RegisterBlock>(regs: &R, kind: TripKind) -> bool {
    let trip = trip::descriptor(kind);
    regs.read(trip.enable_offset) & trip.enable_mask != 0
}

fn read_trip_temp<R: RegisterBlock>(
    regs: &R,
    kind: TripKind,
) -> MilliCelsius {
    let trip = trip::descriptor(kind);
    codec::code_to_temp(trip.field(regs.read(trip.reg_offset)))
}

fn write_trip_temp<R: RegisterBlock>(
    regs: &R,
    kind: TripKind,
    temp: MilliCelsius,
) {
    let trip = trip::descriptor(kind);

    // A low trip fires at or below its threshold, so round its code toward
    // the cold side.
    let code = codec::temp_to_code(temp, kind == TripKind::Low);

    ringbuf_entry!(Trace::TripTemp { kind, temp, code });

    regs.modify(trip.reg_offset, trip.reg_mask, trip.place(code));
}
