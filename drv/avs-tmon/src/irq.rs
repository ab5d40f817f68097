// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Threshold-crossing interrupt handling.

use crate::{
    codec, enable_trip, read_trip_temp, regs, RegisterBlock, Tmon, Trace,
};
use drv_avs_tmon_api::{IrqReturn, ThermalZone, TripKind};
use ringbuf::ringbuf_entry_root;

impl<R: RegisterBlock> Tmon<R> {
    /// Services the TMON interrupt. Call this from a thread, not from the
    /// interrupt itself: it takes the register lock and then calls into
    /// `zone`, which may block.
    ///
    /// Whichever of the low and high trips the latched temperature has reached
    /// is disarmed, so the interrupt stays quiet until the framework
    /// reacts to `zone.update()` by programming new trips.
    pub fn handle_interrupt<Z: ThermalZone + ?Sized>(
        &self,
        zone: &Z,
    ) -> IrqReturn {
        let intr = {
            let regs = self.regs.lock();

            let low = read_trip_temp(&*regs, TripKind::Low);
            let high = read_trip_temp(&*regs, TripKind::High);
            let intr = codec::code_to_temp(regs.read(regs::TEMP_INT_CODE));

            ringbuf_entry_root!(Trace::Interrupt { low, intr, high });

            if intr >= high {
                enable_trip(&*regs, TripKind::High, false);
            }
            if intr <= low {
                enable_trip(&*regs, TripKind::Low, false);
            }

            intr
        };

        // Report the latched reading rather than a fresh one: by now the
        // temperature may already be back across the threshold.
        //
        // Unlike `get_current_temperature`, this is not clamped at zero.
        zone.update(intr);

        IrqReturn::Handled
    }
}
