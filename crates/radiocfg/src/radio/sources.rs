//! Numbering of mix sources and switch sources.
//!
//! Both spaces are contiguous families of ids. The grammars in
//! [`crate::refs`] handle the parameterized families; every other id is named
//! in [`MIX_SOURCES`] or [`SWITCH_SOURCES`].

use super::{
    MAX_FLIGHT_MODES, MAX_GVARS, MAX_INPUTS, MAX_LOGICAL_SWITCHES, MAX_OUTPUT_CHANNELS,
    MAX_SCRIPT_OUTPUTS, MAX_SCRIPTS, MAX_TELEMETRY_SENSORS, MAX_TRAINER_CHANNELS, NUM_CYCLIC, NUM_POTS, NUM_SLIDERS,
    NUM_STICKS, NUM_SWITCHES, NUM_TIMERS, NUM_TRIMS, XPOTS_MULTIPOS_COUNT,
};
use crate::enums::EnumTable;

// Mix sources.
pub const MIXSRC_NONE: i64 = 0;
pub const MIXSRC_FIRST_INPUT: i64 = 1;
pub const MIXSRC_LAST_INPUT: i64 = MIXSRC_FIRST_INPUT + MAX_INPUTS as i64 - 1;
pub const MIXSRC_FIRST_LUA: i64 = MIXSRC_LAST_INPUT + 1;
pub const MIXSRC_LAST_LUA: i64 = MIXSRC_FIRST_LUA + (MAX_SCRIPTS * MAX_SCRIPT_OUTPUTS) as i64 - 1;
pub const MIXSRC_FIRST_STICK: i64 = MIXSRC_LAST_LUA + 1;
pub const MIXSRC_FIRST_POT: i64 = MIXSRC_FIRST_STICK + NUM_STICKS as i64;
pub const MIXSRC_FIRST_SLIDER: i64 = MIXSRC_FIRST_POT + NUM_POTS as i64;
pub const MIXSRC_MAX: i64 = MIXSRC_FIRST_SLIDER + NUM_SLIDERS as i64;
pub const MIXSRC_FIRST_CYC: i64 = MIXSRC_MAX + 1;
pub const MIXSRC_FIRST_TRIM: i64 = MIXSRC_FIRST_CYC + NUM_CYCLIC as i64;
pub const MIXSRC_FIRST_SWITCH: i64 = MIXSRC_FIRST_TRIM + NUM_TRIMS as i64;
pub const MIXSRC_FIRST_LOGICAL_SWITCH: i64 = MIXSRC_FIRST_SWITCH + NUM_SWITCHES as i64;
pub const MIXSRC_LAST_LOGICAL_SWITCH: i64 = MIXSRC_FIRST_LOGICAL_SWITCH + MAX_LOGICAL_SWITCHES as i64 - 1;
pub const MIXSRC_FIRST_TRAINER: i64 = MIXSRC_LAST_LOGICAL_SWITCH + 1;
pub const MIXSRC_LAST_TRAINER: i64 = MIXSRC_FIRST_TRAINER + MAX_TRAINER_CHANNELS as i64 - 1;
pub const MIXSRC_FIRST_CH: i64 = MIXSRC_LAST_TRAINER + 1;
pub const MIXSRC_LAST_CH: i64 = MIXSRC_FIRST_CH + MAX_OUTPUT_CHANNELS as i64 - 1;
pub const MIXSRC_FIRST_GVAR: i64 = MIXSRC_LAST_CH + 1;
pub const MIXSRC_LAST_GVAR: i64 = MIXSRC_FIRST_GVAR + MAX_GVARS as i64 - 1;
pub const MIXSRC_TX_VOLTAGE: i64 = MIXSRC_LAST_GVAR + 1;
pub const MIXSRC_TX_TIME: i64 = MIXSRC_TX_VOLTAGE + 1;
pub const MIXSRC_TX_GPS: i64 = MIXSRC_TX_TIME + 1;
pub const MIXSRC_FIRST_TIMER: i64 = MIXSRC_TX_GPS + 1;
pub const MIXSRC_FIRST_TELEM: i64 = MIXSRC_FIRST_TIMER + NUM_TIMERS as i64;
/// Each sensor has a value, a minimum (`-`) and a maximum (`+`) source.
pub const MIXSRC_LAST_TELEM: i64 = MIXSRC_FIRST_TELEM + 3 * MAX_TELEMETRY_SENSORS as i64 - 1;

// Switch sources. Negative ids invert the switch.
pub const SWSRC_NONE: i64 = 0;
pub const SWSRC_FIRST_SWITCH: i64 = 1;
pub const SWSRC_FIRST_MULTIPOS_SWITCH: i64 = SWSRC_FIRST_SWITCH + 3 * NUM_SWITCHES as i64;
pub const SWSRC_LAST_MULTIPOS_SWITCH: i64 = SWSRC_FIRST_MULTIPOS_SWITCH + (NUM_POTS * XPOTS_MULTIPOS_COUNT) as i64 - 1;
pub const SWSRC_FIRST_TRIM: i64 = SWSRC_LAST_MULTIPOS_SWITCH + 1;
pub const SWSRC_FIRST_LOGICAL_SWITCH: i64 = SWSRC_FIRST_TRIM + 2 * NUM_TRIMS as i64;
pub const SWSRC_LAST_LOGICAL_SWITCH: i64 = SWSRC_FIRST_LOGICAL_SWITCH + MAX_LOGICAL_SWITCHES as i64 - 1;
pub const SWSRC_ON: i64 = SWSRC_LAST_LOGICAL_SWITCH + 1;
pub const SWSRC_ONE: i64 = SWSRC_ON + 1;
pub const SWSRC_FIRST_FLIGHT_MODE: i64 = SWSRC_ONE + 1;
pub const SWSRC_LAST_FLIGHT_MODE: i64 = SWSRC_FIRST_FLIGHT_MODE + MAX_FLIGHT_MODES as i64 - 1;
pub const SWSRC_TELEMETRY_STREAMING: i64 = SWSRC_LAST_FLIGHT_MODE + 1;
pub const SWSRC_FIRST_SENSOR: i64 = SWSRC_TELEMETRY_STREAMING + 1;
pub const SWSRC_LAST_SENSOR: i64 = SWSRC_FIRST_SENSOR + MAX_TELEMETRY_SENSORS as i64 - 1;
pub const SWSRC_RADIO_ACTIVITY: i64 = SWSRC_LAST_SENSOR + 1;
pub const SWSRC_LAST: i64 = SWSRC_RADIO_ACTIVITY;

pub static MIX_SOURCES: EnumTable = EnumTable::new(
    "sources",
    &[
        (MIXSRC_NONE, "NONE"),
        (MIXSRC_FIRST_STICK, "Rud"),
        (MIXSRC_FIRST_STICK + 1, "Ele"),
        (MIXSRC_FIRST_STICK + 2, "Thr"),
        (MIXSRC_FIRST_STICK + 3, "Ail"),
        (MIXSRC_FIRST_POT, "P1"),
        (MIXSRC_FIRST_POT + 1, "P2"),
        (MIXSRC_FIRST_POT + 2, "P3"),
        (MIXSRC_FIRST_SLIDER, "SL1"),
        (MIXSRC_FIRST_SLIDER + 1, "SL2"),
        (MIXSRC_MAX, "MAX"),
        (MIXSRC_FIRST_CYC, "CYC1"),
        (MIXSRC_FIRST_CYC + 1, "CYC2"),
        (MIXSRC_FIRST_CYC + 2, "CYC3"),
        (MIXSRC_FIRST_TRIM, "TrimRud"),
        (MIXSRC_FIRST_TRIM + 1, "TrimEle"),
        (MIXSRC_FIRST_TRIM + 2, "TrimThr"),
        (MIXSRC_FIRST_TRIM + 3, "TrimAil"),
        (MIXSRC_FIRST_SWITCH, "SA"),
        (MIXSRC_FIRST_SWITCH + 1, "SB"),
        (MIXSRC_FIRST_SWITCH + 2, "SC"),
        (MIXSRC_FIRST_SWITCH + 3, "SD"),
        (MIXSRC_FIRST_SWITCH + 4, "SE"),
        (MIXSRC_FIRST_SWITCH + 5, "SF"),
        (MIXSRC_FIRST_SWITCH + 6, "SG"),
        (MIXSRC_FIRST_SWITCH + 7, "SH"),
        (MIXSRC_FIRST_SWITCH + 8, "SI"),
        (MIXSRC_FIRST_SWITCH + 9, "SJ"),
        (MIXSRC_TX_VOLTAGE, "TX_VOLTAGE"),
        (MIXSRC_TX_TIME, "TX_TIME"),
        (MIXSRC_TX_GPS, "TX_GPS"),
        (MIXSRC_FIRST_TIMER, "TIMER1"),
        (MIXSRC_FIRST_TIMER + 1, "TIMER2"),
        (MIXSRC_FIRST_TIMER + 2, "TIMER3"),
    ],
);

pub static SWITCH_SOURCES: EnumTable = EnumTable::new(
    "switches",
    &[
        (SWSRC_NONE, "NONE"),
        (SWSRC_FIRST_SWITCH, "SA0"),
        (SWSRC_FIRST_SWITCH + 1, "SA1"),
        (SWSRC_FIRST_SWITCH + 2, "SA2"),
        (SWSRC_FIRST_SWITCH + 3, "SB0"),
        (SWSRC_FIRST_SWITCH + 4, "SB1"),
        (SWSRC_FIRST_SWITCH + 5, "SB2"),
        (SWSRC_FIRST_SWITCH + 6, "SC0"),
        (SWSRC_FIRST_SWITCH + 7, "SC1"),
        (SWSRC_FIRST_SWITCH + 8, "SC2"),
        (SWSRC_FIRST_SWITCH + 9, "SD0"),
        (SWSRC_FIRST_SWITCH + 10, "SD1"),
        (SWSRC_FIRST_SWITCH + 11, "SD2"),
        (SWSRC_FIRST_SWITCH + 12, "SE0"),
        (SWSRC_FIRST_SWITCH + 13, "SE1"),
        (SWSRC_FIRST_SWITCH + 14, "SE2"),
        (SWSRC_FIRST_SWITCH + 15, "SF0"),
        (SWSRC_FIRST_SWITCH + 16, "SF1"),
        (SWSRC_FIRST_SWITCH + 17, "SF2"),
        (SWSRC_FIRST_SWITCH + 18, "SG0"),
        (SWSRC_FIRST_SWITCH + 19, "SG1"),
        (SWSRC_FIRST_SWITCH + 20, "SG2"),
        (SWSRC_FIRST_SWITCH + 21, "SH0"),
        (SWSRC_FIRST_SWITCH + 22, "SH1"),
        (SWSRC_FIRST_SWITCH + 23, "SH2"),
        (SWSRC_FIRST_SWITCH + 24, "SI0"),
        (SWSRC_FIRST_SWITCH + 25, "SI1"),
        (SWSRC_FIRST_SWITCH + 26, "SI2"),
        (SWSRC_FIRST_SWITCH + 27, "SJ0"),
        (SWSRC_FIRST_SWITCH + 28, "SJ1"),
        (SWSRC_FIRST_SWITCH + 29, "SJ2"),
        (SWSRC_FIRST_TRIM, "TrimRudL"),
        (SWSRC_FIRST_TRIM + 1, "TrimRudR"),
        (SWSRC_FIRST_TRIM + 2, "TrimEleD"),
        (SWSRC_FIRST_TRIM + 3, "TrimEleU"),
        (SWSRC_FIRST_TRIM + 4, "TrimThrD"),
        (SWSRC_FIRST_TRIM + 5, "TrimThrU"),
        (SWSRC_FIRST_TRIM + 6, "TrimAilL"),
        (SWSRC_FIRST_TRIM + 7, "TrimAilR"),
        (SWSRC_ON, "ON"),
        (SWSRC_ONE, "ONE"),
        (SWSRC_TELEMETRY_STREAMING, "TELEM"),
        (SWSRC_RADIO_ACTIVITY, "RADIO_ACT"),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ranges() {
        assert_eq!(MIXSRC_FIRST_LUA, 33);
        assert_eq!(MIXSRC_FIRST_STICK, 87);
        assert_eq!(MIXSRC_MAX, 96);
        assert_eq!(MIXSRC_FIRST_SWITCH, 104);
        assert_eq!(MIXSRC_FIRST_LOGICAL_SWITCH, 114);
        assert_eq!(MIXSRC_FIRST_TRAINER, 178);
        assert_eq!(MIXSRC_FIRST_CH, 194);
        assert_eq!(MIXSRC_FIRST_GVAR, 226);
        assert_eq!(MIXSRC_TX_VOLTAGE, 235);
        assert_eq!(MIXSRC_FIRST_TELEM, 241);
        assert_eq!(MIXSRC_LAST_TELEM, 420);
    }

    #[test]
    fn test_switch_ranges() {
        assert_eq!(SWSRC_FIRST_MULTIPOS_SWITCH, 31);
        assert_eq!(SWSRC_FIRST_TRIM, 49);
        assert_eq!(SWSRC_FIRST_LOGICAL_SWITCH, 57);
        assert_eq!(SWSRC_ON, 121);
        assert_eq!(SWSRC_FIRST_FLIGHT_MODE, 123);
        assert_eq!(SWSRC_TELEMETRY_STREAMING, 132);
        assert_eq!(SWSRC_FIRST_SENSOR, 133);
        assert_eq!(SWSRC_RADIO_ACTIVITY, 193);
    }

    #[test]
    fn test_named_ids_are_unique() {
        for table in [&MIX_SOURCES, &SWITCH_SOURCES] {
            for (i, (value, name)) in table.entries.iter().enumerate() {
                assert!(table.entries[..i].iter().all(|(v, n)| v != value && n != name), "{name}");
            }
        }
    }
}
