// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion between TMON codes and temperatures.
//!
//! The sensor reports a 10-bit code that falls as temperature rises:
//! `temp = OFFSET - code * SLOPE`, in millidegrees Celsius.

use drv_avs_tmon_api::MilliCelsius;

/// Default coefficients
pub const SLOPE: i32 = 487;
pub const OFFSET: i32 = 410040;

/// Largest code the hardware can hold; also the field mask.
pub const CODE_MAX: u32 = 0x3ff;

/// Anything colder than this saturates to [`CODE_MAX`].
pub const TEMP_MIN: i32 = -88161;

/// Converts a hardware code to a temperature. Bits above [`CODE_MAX`] are
/// ignored.
pub fn code_to_temp(code: u32) -> MilliCelsius {
    // At most 0x3ff * 487, which fits comfortably in an i32.
    MilliCelsius(OFFSET - ((code & CODE_MAX) * SLOPE as u32) as i32)
}

/// Converts a temperature to a hardware code.
///
/// If `round_low` is set the code is rounded up, which is toward the colder
/// side: the programmed threshold then sits at or below `temp`. Otherwise
/// the division truncates, toward the warmer side.
pub fn temp_to_code(temp: MilliCelsius, round_low: bool) -> u32 {
    let MilliCelsius(t) = temp;

    if t < TEMP_MIN {
        return CODE_MAX;
    }
    if t >= OFFSET {
        return 0;
    }

    // In (0, OFFSET - TEMP_MIN], so neither this nor the rounding below can
    // overflow.
    let delta = OFFSET - t;
    let code = if round_low {
        (delta + SLOPE - 1) / SLOPE
    } else {
        delta / SLOPE
    };
    code as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_points() {
        assert_eq!(code_to_temp(0), MilliCelsius(410040));
        assert_eq!(code_to_temp(0x3ff), MilliCelsius(410040 - 1023 * 487));
        // The coldest code is exactly the saturation floor.
        assert_eq!(code_to_temp(CODE_MAX), MilliCelsius(TEMP_MIN));
    }

    #[test]
    fn decode_ignores_high_bits() {
        assert_eq!(code_to_temp(0x400), code_to_temp(0));
        assert_eq!(code_to_temp(0xffff_fc01), code_to_temp(1));
    }

    #[test]
    fn every_code_round_trips() {
        for code in 0..=CODE_MAX {
            assert_eq!(
                temp_to_code(code_to_temp(code), false),
                code,
                "code {code:#x}"
            );
            // Exact boundaries round the same way in both directions.
            assert_eq!(temp_to_code(code_to_temp(code), true), code);
        }
    }

    #[test]
    fn saturation_edges() {
        assert_eq!(temp_to_code(MilliCelsius(TEMP_MIN - 1), false), CODE_MAX);
        assert_eq!(temp_to_code(MilliCelsius(TEMP_MIN), false), CODE_MAX);
        assert_eq!(temp_to_code(MilliCelsius(TEMP_MIN), true), CODE_MAX);
        assert_eq!(temp_to_code(MilliCelsius(OFFSET), true), 0);
        assert_eq!(temp_to_code(MilliCelsius(OFFSET - 1), false), 0);
        assert_eq!(temp_to_code(MilliCelsius(OFFSET - 1), true), 1);
        assert_eq!(temp_to_code(MilliCelsius(i32::MIN), true), CODE_MAX);
        assert_eq!(temp_to_code(MilliCelsius(i32::MAX), false), 0);
    }

    #[test]
    fn low_side_rounding_example() {
        // 50 C sits between codes 739 (50147) and 740 (49660).
        let t = MilliCelsius(50000);
        assert_eq!(temp_to_code(t, false), 739);
        assert_eq!(temp_to_code(t, true), 740);
        assert_eq!(code_to_temp(740), MilliCelsius(49660));
    }

    proptest! {
        #[test]
        fn too_cold_saturates_high(
            t in i32::MIN..TEMP_MIN,
            low in any::<bool>()
        ) {
            prop_assert_eq!(temp_to_code(MilliCelsius(t), low), CODE_MAX);
        }

        #[test]
        fn too_hot_saturates_low(
            t in OFFSET..=i32::MAX,
            low in any::<bool>()
        ) {
            prop_assert_eq!(temp_to_code(MilliCelsius(t), low), 0);
        }

        #[test]
        fn never_exceeds_code_max(t in any::<i32>(), low in any::<bool>()) {
            prop_assert!(temp_to_code(MilliCelsius(t), low) <= CODE_MAX);
        }

        #[test]
        fn rounding_direction(t in code_to_temp(CODE_MAX).0..OFFSET) {
            let temp = MilliCelsius(t);
            let up = temp_to_code(temp, true);
            let down = temp_to_code(temp, false);

            if (OFFSET - t) % SLOPE == 0 {
                prop_assert_eq!(up, down);
            } else {
                prop_assert_eq!(up, down + 1);
            }

            // The low threshold never lands above what was asked for, and the
            // truncated one never lands below.
            prop_assert!(code_to_temp(up) <= temp);
            prop_assert!(code_to_temp(down) >= temp);
        }
    }
}
