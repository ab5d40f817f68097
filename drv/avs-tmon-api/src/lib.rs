// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client API for the AVS TMON thermal sensor driver
//!
//! This is the boundary between the driver and the thermal framework that
//! consumes it: the framework polls and programs trips through
//! [`ThermalSensor`], and the driver pushes interrupt-time readings back
//! through [`ThermalZone`].

#![cfg_attr(not(test), no_std)]

use enum_map::Enum;

/// Temperature in millidegrees Celsius
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MilliCelsius(pub i32);

impl MilliCelsius {
    pub const ZERO: Self = Self(0);

    /// Saturates negative readings to zero.
    pub fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Self::ZERO
        } else {
            self
        }
    }
}

impl From<MilliCelsius> for i32 {
    fn from(t: MilliCelsius) -> Self {
        t.0
    }
}

/// Framework value for "no lower bound". Anything at or below this turns the
/// low comparator off. (The framework uses `-i32::MAX` rather than `i32::MIN`.)
pub const NO_LOW_TRIP: i32 = -i32::MAX;

/// Framework value for "no upper bound"; turns the high comparator off.
pub const NO_HIGH_TRIP: i32 = i32::MAX;

/// Translates a framework low bound into an optional threshold.
pub fn low_bound(raw: i32) -> Option<MilliCelsius> {
    if raw <= NO_LOW_TRIP {
        None
    } else {
        Some(MilliCelsius(raw))
    }
}

/// Translates a framework high bound into an optional threshold.
pub fn high_bound(raw: i32) -> Option<MilliCelsius> {
    if raw == NO_HIGH_TRIP {
        None
    } else {
        Some(MilliCelsius(raw))
    }
}

/// The hardware trip points.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Enum)]
pub enum TripKind {
    /// Interrupts when the temperature falls to the threshold
    Low,
    /// Interrupts when the temperature rises to the threshold
    High,
    /// Resets the chip, without software involvement, above the threshold
    Reset,
}

/// A trip's configuration as read back from hardware.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TripStatus {
    pub enabled: bool,
    pub threshold: MilliCelsius,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TmonError {
    /// The sensor has not finished a conversion; try again later.
    NotReady = 1,
    /// This part has no software-programmable trip interrupts.
    TripsUnsupported,
}

/// Interrupt handler disposition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IrqReturn {
    /// The interrupt was not ours.
    None,
    Handled,
}

/// Operations the framework invokes on a sensor.
pub trait ThermalSensor {
    /// Returns the current temperature.
    fn get_temp(&self) -> Result<MilliCelsius, TmonError>;

    /// Programs the window outside of which the sensor should interrupt.
    /// [`NO_LOW_TRIP`] and [`NO_HIGH_TRIP`] leave that side unbounded.
    fn set_trips(&self, low: i32, high: i32) -> Result<(), TmonError>;
}

/// The framework side of a sensor: where interrupt-driven readings go.
pub trait ThermalZone {
    /// Delivers a new reading. This may block, and may call back into the
    /// sensor.
    fn update(&self, temp: MilliCelsius);
}

impl<Z: ThermalZone + ?Sized> ThermalZone for &Z {
    fn update(&self, temp: MilliCelsius) {
        (**self).update(temp)
    }
}
