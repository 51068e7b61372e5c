//! Enumerated tables of the current layouts.

use crate::enums::EnumTable;

pub static BEEPER_MODE: EnumTable = EnumTable::new(
    "beeper mode",
    &[(-2, "mode_quiet"), (-1, "mode_alarms"), (0, "mode_nokeys"), (1, "mode_all")],
);

pub const TRAINER_MODE_OFF: i64 = 0;

pub static TRAINER_MODE: EnumTable = EnumTable::new(
    "trainer mode",
    &[
        (TRAINER_MODE_OFF, "OFF"),
        (1, "MASTER_TRAINER_JACK"),
        (2, "SLAVE"),
        (3, "MASTER_SBUS_EXT"),
        (4, "MASTER_CPPM_EXT"),
        (5, "MASTER_BATT_COMP"),
        (6, "MASTER_BT"),
        (7, "SLAVE_BT"),
        (8, "MASTER_MULTI"),
    ],
);

pub static SWITCH_CONFIG: EnumTable = EnumTable::new(
    "switch config",
    &[(0, "none"), (1, "toggle"), (2, "2pos"), (3, "3pos")],
);

pub static POT_CONFIG: EnumTable = EnumTable::new(
    "pot config",
    &[(0, "none"), (1, "with_detent"), (2, "multipos_switch"), (3, "without_detent")],
);

pub static SLIDER_CONFIG: EnumTable = EnumTable::new("slider config", &[(0, "none"), (1, "with_detent")]);

pub static MIX_MULTIPLEX: EnumTable = EnumTable::new("multiplex", &[(0, "ADD"), (1, "MULTIPLY"), (2, "REPLACE")]);

pub const LS_FUNC_NONE: i64 = 0;

pub static LS_FUNC: EnumTable = EnumTable::new(
    "logical switch function",
    &[
        (LS_FUNC_NONE, "FUNC_NONE"),
        (1, "FUNC_VEQUAL"),
        (2, "FUNC_VALMOSTEQUAL"),
        (3, "FUNC_VPOS"),
        (4, "FUNC_VNEG"),
        (5, "FUNC_APOS"),
        (6, "FUNC_ANEG"),
        (7, "FUNC_AND"),
        (8, "FUNC_OR"),
        (9, "FUNC_XOR"),
        (10, "FUNC_EDGE"),
        (11, "FUNC_EQUAL"),
        (12, "FUNC_GREATER"),
        (13, "FUNC_LESS"),
        (14, "FUNC_DIFFEGREATER"),
        (15, "FUNC_ADIFFEGREATER"),
        (16, "FUNC_TIMER"),
        (17, "FUNC_STICKY"),
    ],
);

/// How a logical switch function interprets its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsFamily {
    /// `v1` is a source, `v2` a value.
    Value,
    /// Both operands are switches.
    Bool,
    /// Both operands are sources.
    Compare,
    /// Both operands are durations.
    Timer,
}

impl LsFamily {
    pub fn of(func: i64) -> Self {
        match func {
            7..=10 | 17 => LsFamily::Bool,
            11..=13 => LsFamily::Compare,
            16 => LsFamily::Timer,
            _ => LsFamily::Value,
        }
    }
}

pub const CFN_PLAY_TRACK: i64 = 11;
pub const CFN_PLAY_SCRIPT: i64 = 13;
pub const CFN_BACKGND_MUSIC: i64 = 14;

pub static CFN_FUNC: EnumTable = EnumTable::new(
    "special function",
    &[
        (0, "OVERRIDE_CHANNEL"),
        (1, "TRAINER"),
        (2, "INSTANT_TRIM"),
        (3, "RESET"),
        (4, "SET_TIMER"),
        (5, "ADJUST_GVAR"),
        (6, "VOLUME"),
        (7, "SET_FAILSAFE"),
        (8, "RANGECHECK"),
        (9, "BIND"),
        (10, "PLAY_SOUND"),
        (11, "PLAY_TRACK"),
        (12, "PLAY_VALUE"),
        (13, "PLAY_SCRIPT"),
        (14, "BACKGND_MUSIC"),
        (15, "BACKGND_MUSIC_PAUSE"),
        (16, "VARIO"),
        (17, "HAPTIC"),
        (18, "LOGS"),
        (19, "BACKLIGHT"),
        (20, "SCREENSHOT"),
        (21, "RACING_MODE"),
    ],
);

pub const MODULE_TYPE_NONE: i64 = 0;
pub const MODULE_TYPE_PPM: i64 = 1;
pub const MODULE_TYPE_XJT_PXX1: i64 = 2;
pub const MODULE_TYPE_ISRM_PXX2: i64 = 3;
pub const MODULE_TYPE_DSM2: i64 = 4;
pub const MODULE_TYPE_CROSSFIRE: i64 = 5;
pub const MODULE_TYPE_MULTIMODULE: i64 = 6;
pub const MODULE_TYPE_R9M_PXX1: i64 = 7;
pub const MODULE_TYPE_R9M_PXX2: i64 = 8;
pub const MODULE_TYPE_R9M_LITE_PXX1: i64 = 9;
pub const MODULE_TYPE_R9M_LITE_PXX2: i64 = 10;
pub const MODULE_TYPE_GHOST: i64 = 11;
pub const MODULE_TYPE_R9M_LITE_PRO_PXX2: i64 = 12;
pub const MODULE_TYPE_SBUS: i64 = 13;
pub const MODULE_TYPE_XJT_LITE_PXX2: i64 = 14;
pub const MODULE_TYPE_FLYSKY: i64 = 15;

pub const FLYSKY_SUBTYPE_AFHDS3: i64 = 0;
pub const FLYSKY_SUBTYPE_AFHDS2A: i64 = 1;

pub static MODULE_TYPE: EnumTable = EnumTable::new(
    "module type",
    &[
        (MODULE_TYPE_NONE, "TYPE_NONE"),
        (MODULE_TYPE_PPM, "TYPE_PPM"),
        (MODULE_TYPE_XJT_PXX1, "TYPE_XJT_PXX1"),
        (MODULE_TYPE_ISRM_PXX2, "TYPE_ISRM_PXX2"),
        (MODULE_TYPE_DSM2, "TYPE_DSM2"),
        (MODULE_TYPE_CROSSFIRE, "TYPE_CROSSFIRE"),
        (MODULE_TYPE_MULTIMODULE, "TYPE_MULTIMODULE"),
        (MODULE_TYPE_R9M_PXX1, "TYPE_R9M_PXX1"),
        (MODULE_TYPE_R9M_PXX2, "TYPE_R9M_PXX2"),
        (MODULE_TYPE_R9M_LITE_PXX1, "TYPE_R9M_LITE_PXX1"),
        (MODULE_TYPE_R9M_LITE_PXX2, "TYPE_R9M_LITE_PXX2"),
        (MODULE_TYPE_GHOST, "TYPE_GHOST"),
        (MODULE_TYPE_R9M_LITE_PRO_PXX2, "TYPE_R9M_LITE_PRO_PXX2"),
        (MODULE_TYPE_SBUS, "TYPE_SBUS"),
        (MODULE_TYPE_XJT_LITE_PXX2, "TYPE_XJT_LITE_PXX2"),
        (MODULE_TYPE_FLYSKY, "TYPE_FLYSKY"),
    ],
);

pub static FAILSAFE_MODE: EnumTable = EnumTable::new(
    "failsafe mode",
    &[(0, "NOT_SET"), (1, "HOLD"), (2, "CUSTOM"), (3, "NOPULSES"), (4, "RECEIVER")],
);
