//! Per-model settings.

use std::sync::LazyLock;

use super::{
    GVAR_MAX, LEN_FLIGHT_MODE_NAME, LEN_FUNCTION_NAME, LEN_MIX_NAME, LEN_MODEL_NAME, MAX_CUSTOM_FUNCTIONS, MAX_FLIGHT_MODES, MAX_GVARS,
    MAX_LOGICAL_SWITCHES, MAX_MIXERS, NUM_MODULES,
    tables::{
        CFN_BACKGND_MUSIC, CFN_FUNC, CFN_PLAY_SCRIPT, CFN_PLAY_TRACK, FAILSAFE_MODE, FLYSKY_SUBTYPE_AFHDS2A, FLYSKY_SUBTYPE_AFHDS3, LS_FUNC, LsFamily, MIX_MULTIPLEX,
        MODULE_TYPE, MODULE_TYPE_CROSSFIRE, MODULE_TYPE_DSM2, MODULE_TYPE_FLYSKY, MODULE_TYPE_GHOST,
        MODULE_TYPE_ISRM_PXX2, MODULE_TYPE_MULTIMODULE, MODULE_TYPE_NONE, MODULE_TYPE_PPM, MODULE_TYPE_R9M_LITE_PRO_PXX2,
        MODULE_TYPE_R9M_LITE_PXX1, MODULE_TYPE_R9M_LITE_PXX2, MODULE_TYPE_R9M_PXX1, MODULE_TYPE_R9M_PXX2,
        MODULE_TYPE_SBUS, MODULE_TYPE_XJT_LITE_PXX2, MODULE_TYPE_XJT_PXX1,
    },
};
use crate::{
    bits,
    compiled::Layout,
    errors::{DecodeError, SchemaError},
    refs::{GVAR_WEIGHT, SOURCE, SWITCH, SWITCH_WARNING},
    schema::{FieldCodec, FieldContext, Node, member_span},
    transform::{Transcode, Transform},
};

pub const MODEL_SIZE: usize = 1318;

/// Marks a flight mode gvar that inherits the default mode's value.
pub const GVAR_INHERITED: i64 = GVAR_MAX + 1;

fn member(ctx: &FieldContext<'_>, data: &[u8], nodes: &[Node], name: &str) -> u64 {
    ctx.member_value(data, nodes, name).unwrap_or(0)
}

fn mix_is_active(ctx: &FieldContext<'_>, data: &[u8]) -> bool {
    member(ctx, data, &MIX_FIELDS, "srcRaw") != 0
}

fn ls_is_active(ctx: &FieldContext<'_>, data: &[u8]) -> bool {
    member(ctx, data, &LS_FIELDS, "func") != 0
}

fn cfn_is_active(ctx: &FieldContext<'_>, data: &[u8]) -> bool {
    member(ctx, data, &CFN_FIELDS, "swtch") != 0
}

fn gvar_is_active(ctx: &FieldContext<'_>, data: &[u8]) -> bool {
    bits::read_bits_at(data, ctx.bit_offset(), ctx.bits())
        .is_ok_and(|raw| bits::sign_extend(raw, ctx.bits()) != GVAR_INHERITED)
}

/// The default flight mode is active when anything is set. Other modes are
/// active when a non-gvar field is set or any gvar is overridden.
fn fmd_is_active(ctx: &FieldContext<'_>, data: &[u8]) -> bool {
    let start = ctx.bit_offset();
    if ctx.index(0) == Some(0) {
        return !bits::is_zero(data, start, ctx.bits()).unwrap_or(true);
    }

    let Some(gvars) = member_span(&FMD_FIELDS, "gvars") else {
        return false;
    };
    if !bits::is_zero(data, start, gvars.offset).unwrap_or(true) {
        return true;
    }
    (0..MAX_GVARS).any(|i| {
        bits::read_bits_at(data, start + gvars.offset + i * 16, 16)
            .is_ok_and(|raw| bits::sign_extend(raw, 16) != GVAR_INHERITED)
    })
}

/// Picks the `mod` union branch from the module type and subtype.
fn select_mod_type(ctx: &FieldContext<'_>, data: &[u8]) -> usize {
    let kind = ctx.sibling_value(data, "type").unwrap_or(0) as i64;
    let sub_type = ctx.sibling_value(data, "subType").unwrap_or(0) as i64;
    match kind {
        MODULE_TYPE_NONE | MODULE_TYPE_PPM | MODULE_TYPE_DSM2 | MODULE_TYPE_CROSSFIRE | MODULE_TYPE_GHOST => 1,
        MODULE_TYPE_MULTIMODULE => 2,
        MODULE_TYPE_XJT_PXX1 | MODULE_TYPE_R9M_PXX1 | MODULE_TYPE_R9M_LITE_PXX1 => 3,
        MODULE_TYPE_SBUS => 4,
        MODULE_TYPE_ISRM_PXX2
        | MODULE_TYPE_R9M_PXX2
        | MODULE_TYPE_R9M_LITE_PXX2
        | MODULE_TYPE_R9M_LITE_PRO_PXX2
        | MODULE_TYPE_XJT_LITE_PXX2 => 5,
        MODULE_TYPE_FLYSKY if sub_type == FLYSKY_SUBTYPE_AFHDS2A => 6,
        MODULE_TYPE_FLYSKY if sub_type == FLYSKY_SUBTYPE_AFHDS3 => 7,
        _ => 0,
    }
}

/// Functions that name a file use the `play` branch, every other one `all`.
/// `clear` is never selected.
fn select_custom_fn(ctx: &FieldContext<'_>, data: &[u8]) -> usize {
    match ctx.sibling_value(data, "func").unwrap_or(0) as i64 {
        CFN_PLAY_TRACK | CFN_PLAY_SCRIPT | CFN_BACKGND_MUSIC => 0,
        _ => 1,
    }
}

/// Logical switch operand whose grammar follows the switch's function.
pub struct LsOperand {
    first: bool,
}

impl LsOperand {
    fn transcode(&self, ctx: &FieldContext<'_>, data: &[u8]) -> Transcode {
        let func = ctx.sibling_value(data, "func").unwrap_or(0) as i64;
        match (LsFamily::of(func), self.first) {
            (LsFamily::Bool, _) => Transcode::Ref(&SWITCH),
            (LsFamily::Compare, _) | (LsFamily::Value, true) => Transcode::Ref(&SOURCE),
            (LsFamily::Value | LsFamily::Timer, _) => Transcode::Int(Transform::signed()),
        }
    }
}

impl FieldCodec for LsOperand {
    fn read(&self, ctx: &FieldContext<'_>, data: &mut [u8], text: &str) -> Result<(), DecodeError> {
        let raw = self.transcode(ctx, data).decode(ctx, text)?;
        bits::write_bits_at(data, ctx.bit_offset(), ctx.bits(), raw)?;
        Ok(())
    }

    fn write(&self, ctx: &FieldContext<'_>, data: &[u8]) -> Option<String> {
        let raw = bits::read_bits_at(data, ctx.bit_offset(), ctx.bits()).ok()?;
        self.transcode(ctx, data).encode(ctx, raw)
    }
}

static LS_V1: LsOperand = LsOperand { first: true };
static LS_V2: LsOperand = LsOperand { first: false };

static MODEL_ID: Node = Node::uint("", 8);
pub static HEADER_FIELDS: [Node; 2] = [
    Node::text("name", LEN_MODEL_NAME),
    Node::array("modelId", 2, &MODEL_ID),
];

pub static MIX_FIELDS: [Node; 15] = [
    Node::reference("weight", 11, &GVAR_WEIGHT),
    Node::uint("destCh", 5),
    Node::reference("srcRaw", 10, &SOURCE),
    Node::enumerated("mltpx", 2, &MIX_MULTIPLEX),
    Node::uint("mixWarn", 2),
    Node::uint("carryTrim", 1),
    Node::padding(1),
    Node::reference("swtch", 10, &SWITCH),
    Node::uint("flightModes", 9),
    Node::padding(5),
    Node::reference("offset", 11, &GVAR_WEIGHT),
    Node::padding(5),
    Node::uint("delayUp", 8),
    Node::uint("delayDown", 8),
    Node::text("name", LEN_MIX_NAME),
];
pub static MIX_ELEM: Node = Node::group("", &MIX_FIELDS);

pub static LS_FIELDS: [Node; 9] = [
    Node::enumerated("func", 6, &LS_FUNC),
    Node::padding(2),
    Node::custom("v1", 10, &LS_V1),
    Node::padding(6),
    Node::custom("v2", 16, &LS_V2),
    Node::reference("andsw", 10, &SWITCH),
    Node::padding(6),
    Node::uint("delay", 8),
    Node::uint("duration", 8),
];
pub static LS_ELEM: Node = Node::group("", &LS_FIELDS);

static CFN_PLAY: [Node; 1] = [Node::text("name", LEN_FUNCTION_NAME)];
static CFN_ALL: [Node; 4] = [
    Node::int("val", 16),
    Node::uint("mode", 8),
    Node::uint("param", 8),
    Node::padding(16),
];
static CFN_CLEAR: [Node; 2] = [Node::int("val1", 32), Node::padding(16)];
static CFN_BRANCHES: [Node; 3] = [
    Node::group("play", &CFN_PLAY),
    Node::group("all", &CFN_ALL),
    Node::group("clear", &CFN_CLEAR),
];

pub static CFN_FIELDS: [Node; 5] = [
    Node::reference("swtch", 10, &SWITCH),
    Node::enumerated("func", 6, &CFN_FUNC),
    Node::union("fp", select_custom_fn, &CFN_BRANCHES),
    Node::uint("active", 1),
    Node::padding(7),
];
pub static CFN_ELEM: Node = Node::group("", &CFN_FIELDS);

static GVAR_ELEM: Node = Node::int("", 16);
pub static FMD_FIELDS: [Node; 6] = [
    Node::text("name", LEN_FLIGHT_MODE_NAME),
    Node::reference("swtch", 10, &SWITCH),
    Node::padding(6),
    Node::uint("fadeIn", 8),
    Node::uint("fadeOut", 8),
    Node::array("gvars", MAX_GVARS, &GVAR_ELEM).when(gvar_is_active),
];
pub static FMD_ELEM: Node = Node::group("", &FMD_FIELDS);

static RAW_MOD: [Node; 1] = [Node::uint("data", 24)];
static PPM_MOD: [Node; 4] = [
    Node::int("delay", 6),
    Node::uint("pulsePol", 1),
    Node::uint("outputType", 1),
    Node::int("frameLength", 8),
];
static MULTI_MOD: [Node; 8] = [
    Node::uint("rfProtocol", 6),
    Node::padding(2),
    Node::int("optionValue", 8),
    Node::uint("disableTelemetry", 1),
    Node::uint("disableMapping", 1),
    Node::uint("autoBindMode", 1),
    Node::uint("lowPowerMode", 1),
    Node::padding(4),
];
static PXX_MOD: [Node; 5] = [
    Node::uint("power", 2),
    Node::uint("receiverTelemetryOff", 1),
    Node::uint("receiverHigherChannels", 1),
    Node::uint("antennaMode", 2),
    Node::padding(2),
];
static SBUS_MOD: [Node; 3] = [Node::int("refreshRate", 8), Node::uint("inverted", 1), Node::padding(7)];
static PXX2_MOD: [Node; 3] = [Node::uint("receivers", 8), Node::uint("racingMode", 1), Node::padding(7)];
static AFHDS2A_MOD: [Node; 5] = [
    Node::uint("emi", 2),
    Node::uint("telemetry", 1),
    Node::uint("phyMode", 3),
    Node::padding(2),
    Node::uint("servoFreq", 16),
];
static AFHDS3_MOD: [Node; 5] = [
    Node::uint("bindPower", 3),
    Node::uint("runPower", 3),
    Node::uint("emi", 1),
    Node::uint("telemetry", 1),
    Node::uint("failsafeTimeout", 16),
];
static MOD_BRANCHES: [Node; 8] = [
    Node::group("raw", &RAW_MOD),
    Node::group("ppm", &PPM_MOD),
    Node::group("multi", &MULTI_MOD),
    Node::group("pxx", &PXX_MOD),
    Node::group("sbus", &SBUS_MOD),
    Node::group("pxx2", &PXX2_MOD),
    Node::group("afhds2a", &AFHDS2A_MOD),
    Node::group("afhds3", &AFHDS3_MOD),
];

pub static MODULE_FIELDS: [Node; 7] = [
    Node::enumerated("type", 4, &MODULE_TYPE),
    Node::uint("subType", 4),
    Node::uint("channelsStart", 8),
    Node::transformed("channelsCount", 8, Transform::signed().with_offset(8)),
    Node::enumerated("failsafeMode", 4, &FAILSAFE_MODE),
    Node::padding(4),
    Node::union("mod", select_mod_type, &MOD_BRANCHES),
];
pub static MODULE_ELEM: Node = Node::group("", &MODULE_FIELDS);

pub static MODEL_NODES: [Node; 14] = [
    Node::group("header", &HEADER_FIELDS),
    Node::int("trimInc", 3),
    Node::uint("disableThrottleWarning", 1),
    Node::uint("extendedLimits", 1),
    Node::uint("extendedTrims", 1),
    Node::uint("throttleReversed", 1),
    Node::padding(1),
    Node::uint("beepANACenter", 16),
    Node::array("mixData", MAX_MIXERS, &MIX_ELEM).when(mix_is_active),
    Node::array("logicalSw", MAX_LOGICAL_SWITCHES, &LS_ELEM).when(ls_is_active),
    Node::array("customFn", MAX_CUSTOM_FUNCTIONS, &CFN_ELEM).when(cfn_is_active),
    Node::array("flightModeData", MAX_FLIGHT_MODES, &FMD_ELEM).when(fmd_is_active),
    Node::reference("switchWarningState", 32, &SWITCH_WARNING),
    Node::array("moduleData", NUM_MODULES, &MODULE_ELEM),
];

static MODEL: LazyLock<Result<Layout, SchemaError>> =
    LazyLock::new(|| Layout::compile("model", &MODEL_NODES, MODEL_SIZE));

/// The compiled current model layout.
pub fn model_layout() -> Result<&'static Layout, SchemaError> {
    MODEL.as_ref().map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        text::{self, Entry},
        walker,
    };

    fn scalar<'a>(entries: &'a [Entry], path: &str) -> Option<&'a str> {
        text::find_path(entries, path).and_then(Entry::as_scalar)
    }

    fn element(key: &str, fields: &[(&str, &str)]) -> Entry {
        Entry::block(key, fields.iter().map(|&(k, v)| Entry::scalar(k, v)).collect())
    }

    #[test]
    fn test_layout_compiles() {
        let layout = model_layout().unwrap();
        assert_eq!(layout.size_bytes(), MODEL_SIZE);
        assert_eq!(layout.locate("mixData").map(|s| s.offset), Some(160));
        assert_eq!(layout.locate("mixData.1").map(|s| s.offset), Some(160 + 136));
        assert_eq!(layout.locate("logicalSw").map(|s| s.offset), Some(2336));
        assert_eq!(layout.locate("switchWarningState").map(|s| s.offset), Some(10432));
        assert!(layout.field("moduleData.1.mod.multi.rfProtocol").is_some_and(|f| f.overlay));
        assert!(layout.field("customFn.15.fp.play.name").is_some_and(|f| f.overlay));
    }

    #[test]
    fn test_custom_function_union_follows_function() {
        let layout = model_layout().unwrap();
        let entries = vec![Entry::block(
            "customFn",
            vec![
                Entry::block(
                    "0",
                    vec![
                        Entry::scalar("swtch", "SA2"),
                        Entry::scalar("func", "PLAY_TRACK"),
                        Entry::block("fp", vec![element("play", &[("name", "hello")])]),
                    ],
                ),
                Entry::block(
                    "1",
                    vec![
                        Entry::scalar("swtch", "ON"),
                        Entry::scalar("func", "ADJUST_GVAR"),
                        Entry::block("fp", vec![element("all", &[("val", "-40"), ("mode", "1"), ("param", "3")])]),
                        Entry::scalar("active", "1"),
                    ],
                ),
            ],
        )];
        let encoded = walker::encode(layout, &entries).unwrap();
        assert!(encoded.issues.is_empty(), "{:?}", encoded.issues);
        assert_eq!(layout.get_text(&encoded.bytes, "customFn.0.fp.play.name").unwrap(), "hello");
        assert_eq!(layout.get_int(&encoded.bytes, "customFn.1.fp.all.val").unwrap(), -40);
        assert_eq!(layout.get_int(&encoded.bytes, "customFn.1.fp.all.param").unwrap(), 3);

        let decoded = walker::decode(layout, &encoded.bytes).unwrap();
        assert_eq!(scalar(&decoded, "customFn.0.fp.play.name"), Some("hello"));
        assert!(text::find_path(&decoded, "customFn.0.fp.all").is_none());
        assert_eq!(scalar(&decoded, "customFn.1.fp.all.val"), Some("-40"));
        assert_eq!(scalar(&decoded, "customFn.1.active"), Some("1"));
        assert!(text::find_path(&decoded, "customFn.1.fp.play").is_none());
    }

    #[test]
    fn test_zeroed_model_emits_only_defaults() {
        let layout = model_layout().unwrap();
        let decoded = walker::decode(layout, &layout.zeroed()).unwrap();
        assert!(text::find(&decoded, "mixData").is_none());
        assert!(text::find(&decoded, "logicalSw").is_none());
        assert!(text::find(&decoded, "customFn").is_none());
        assert!(text::find_path(&decoded, "flightModeData.0").is_none());
        assert_eq!(scalar(&decoded, "moduleData.0.type"), Some("TYPE_NONE"));
        assert!(text::find_path(&decoded, "moduleData.0.mod.ppm").is_some());
    }

    #[test]
    fn test_mixes() {
        let layout = model_layout().unwrap();
        let entries = vec![Entry::block(
            "mixData",
            vec![
                element("0", &[("weight", "GV2"), ("srcRaw", "Thr"), ("destCh", "2"), ("name", "Thr")]),
                element("3", &[("weight", "-50"), ("srcRaw", "ls(1)"), ("swtch", "!SB1"), ("mltpx", "REPLACE")]),
            ],
        )];
        let encoded = walker::encode(layout, &entries).unwrap();
        assert!(encoded.issues.is_empty());
        assert_eq!(layout.get_int(&encoded.bytes, "mixData.0.weight").unwrap(), -127);
        assert_eq!(layout.get_int(&encoded.bytes, "mixData.3.mltpx").unwrap(), 2);

        let decoded = walker::decode(layout, &encoded.bytes).unwrap();
        let mixes = text::find(&decoded, "mixData").and_then(Entry::as_block).unwrap();
        assert_eq!(mixes.iter().map(|e| e.key.as_str()).collect::<Vec<_>>(), ["0", "3"]);
        assert_eq!(scalar(&decoded, "mixData.0.weight"), Some("GV2"));
        assert_eq!(scalar(&decoded, "mixData.0.name"), Some("Thr"));
        assert_eq!(scalar(&decoded, "mixData.3.srcRaw"), Some("ls(1)"));
        assert_eq!(scalar(&decoded, "mixData.3.swtch"), Some("!SB1"));
        assert_eq!(scalar(&decoded, "mixData.3.offset"), Some("0"));
    }

    #[test]
    fn test_logical_switch_operands_follow_function() {
        let layout = model_layout().unwrap();
        let entries = vec![Entry::block(
            "logicalSw",
            vec![
                element("0", &[("func", "FUNC_AND"), ("v1", "L2"), ("v2", "!SA0")]),
                element("1", &[("func", "FUNC_VPOS"), ("v1", "Thr"), ("v2", "-50")]),
                element("2", &[("func", "FUNC_LESS"), ("v1", "I0"), ("v2", "ch(3)")]),
                element("3", &[("func", "FUNC_TIMER"), ("v1", "10"), ("v2", "-20")]),
            ],
        )];
        let encoded = walker::encode(layout, &entries).unwrap();
        assert!(encoded.issues.is_empty());
        assert_eq!(layout.get_int(&encoded.bytes, "logicalSw.1.v2").unwrap() as i16, -50);

        let decoded = walker::decode(layout, &encoded.bytes).unwrap();
        assert_eq!(scalar(&decoded, "logicalSw.0.v1"), Some("L2"));
        assert_eq!(scalar(&decoded, "logicalSw.0.v2"), Some("!SA0"));
        assert_eq!(scalar(&decoded, "logicalSw.1.v1"), Some("Thr"));
        assert_eq!(scalar(&decoded, "logicalSw.1.v2"), Some("-50"));
        assert_eq!(scalar(&decoded, "logicalSw.2.v2"), Some("ch(3)"));
        assert_eq!(scalar(&decoded, "logicalSw.3.v1"), Some("10"));
        assert_eq!(scalar(&decoded, "logicalSw.3.v2"), Some("-20"));
        assert!(text::find_path(&decoded, "logicalSw.4").is_none());
    }

    #[test]
    fn test_flight_mode_gvars() {
        let layout = model_layout().unwrap();
        let mut data = layout.zeroed();
        for fm in 1..MAX_FLIGHT_MODES {
            for gv in 0..MAX_GVARS {
                layout
                    .set_int(&mut data, &format!("flightModeData.{fm}.gvars.{gv}"), GVAR_INHERITED)
                    .unwrap();
            }
        }
        layout.set_int(&mut data, "flightModeData.2.gvars.4", 0).unwrap();
        layout.set_int(&mut data, "flightModeData.3.fadeIn", 5).unwrap();

        let decoded = walker::decode(layout, &data).unwrap();
        let modes = text::find(&decoded, "flightModeData").and_then(Entry::as_block).unwrap();
        assert_eq!(modes.iter().map(|e| e.key.as_str()).collect::<Vec<_>>(), ["2", "3"]);
        let gvars = text::find_path(&decoded, "flightModeData.2.gvars").and_then(Entry::as_block).unwrap();
        assert_eq!(gvars, [Entry::scalar("4", "0")]);
        assert_eq!(scalar(&decoded, "flightModeData.3.fadeIn"), Some("5"));
        assert!(text::find_path(&decoded, "flightModeData.3.gvars").is_none());
    }

    #[test]
    fn test_module_union_follows_type() {
        let layout = model_layout().unwrap();
        let entries = vec![Entry::block(
            "moduleData",
            vec![
                Entry::block(
                    "0",
                    vec![
                        Entry::scalar("type", "TYPE_MULTIMODULE"),
                        Entry::scalar("channelsCount", "16"),
                        Entry::block(
                            "mod",
                            vec![element("multi", &[("rfProtocol", "5"), ("optionValue", "-3"), ("lowPowerMode", "1")])],
                        ),
                    ],
                ),
                Entry::block(
                    "1",
                    vec![
                        Entry::scalar("type", "TYPE_FLYSKY"),
                        Entry::scalar("subType", "1"),
                        Entry::block("mod", vec![element("afhds2a", &[("servoFreq", "400")])]),
                    ],
                ),
            ],
        )];
        let encoded = walker::encode(layout, &entries).unwrap();
        assert!(encoded.issues.is_empty());
        assert_eq!(layout.get_int(&encoded.bytes, "moduleData.0.channelsCount").unwrap(), 8);

        let decoded = walker::decode(layout, &encoded.bytes).unwrap();
        assert_eq!(scalar(&decoded, "moduleData.0.channelsCount"), Some("16"));
        assert_eq!(scalar(&decoded, "moduleData.0.mod.multi.optionValue"), Some("-3"));
        assert_eq!(scalar(&decoded, "moduleData.0.mod.multi.lowPowerMode"), Some("1"));
        assert!(text::find_path(&decoded, "moduleData.0.mod.ppm").is_none());
        assert_eq!(scalar(&decoded, "moduleData.1.mod.afhds2a.servoFreq"), Some("400"));
    }

    #[test]
    fn test_switch_warning_mask() {
        let layout = model_layout().unwrap();
        let entries = vec![Entry::scalar("switchWarningState", "AuJd")];
        let data = walker::encode(layout, &entries).unwrap().bytes;
        assert_eq!(layout.get_int(&data, "switchWarningState").unwrap(), 1 | (3 << 27));
        let decoded = walker::decode(layout, &data).unwrap();
        assert_eq!(scalar(&decoded, "switchWarningState"), Some("AuJd"));
    }
}
