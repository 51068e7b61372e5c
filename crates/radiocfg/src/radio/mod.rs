//! Current-version (221) radio settings and model layouts.

pub mod general;
pub mod model;
pub mod sources;
pub mod tables;

/// Storage version of the layouts in this module.
pub const CURRENT_VERSION: u8 = 221;

pub const NUM_STICKS: usize = 4;
pub const NUM_POTS: usize = 3;
pub const NUM_SLIDERS: usize = 2;
pub const NUM_SWITCHES: usize = 10;
pub const NUM_TRIMS: usize = 4;
pub const NUM_CYCLIC: usize = 3;
pub const NUM_TIMERS: usize = 3;
pub const NUM_MODULES: usize = 2;
pub const XPOTS_MULTIPOS_COUNT: usize = 6;

pub const MAX_INPUTS: usize = 32;
pub const MAX_SCRIPTS: usize = 9;
pub const MAX_SCRIPT_OUTPUTS: usize = 6;
pub const MAX_LOGICAL_SWITCHES: usize = 64;
pub const MAX_TRAINER_CHANNELS: usize = 16;
pub const MAX_OUTPUT_CHANNELS: usize = 32;
pub const MAX_GVARS: usize = 9;
pub const MAX_FLIGHT_MODES: usize = 9;
pub const MAX_TELEMETRY_SENSORS: usize = 60;
pub const MAX_MIXERS: usize = 16;
pub const MAX_CUSTOM_FUNCTIONS: usize = 16;

pub const LEN_MODEL_NAME: usize = 15;
pub const LEN_MODEL_FILENAME: usize = 17;
pub const LEN_FLIGHT_MODE_NAME: usize = 10;
pub const LEN_FUNCTION_NAME: usize = 6;
pub const LEN_MIX_NAME: usize = 6;
pub const LEN_ANA_NAME: usize = 3;
pub const LEN_SWITCH_NAME: usize = 3;

/// Largest gvar value; `GVAR_MAX + 1` marks a flight mode gvar as inherited.
pub const GVAR_MAX: i64 = 1024;

/// Default speaker volume level, stored as an offset from it.
pub const VOLUME_LEVEL_DEF: i64 = 12;
