//! Binary layouts of the versions that predate the current one.
//!
//! Legacy layouts are only used to address fields by path while migrating.
//! Their leaves keep the current paths so [`Layout::copy_common`] can pair
//! them; the transcoders they reuse are never used to render legacy text.

use std::sync::LazyLock;

use radiocfg::{
    compiled::Layout,
    errors::SchemaError,
    radio::{
        LEN_ANA_NAME, LEN_MODEL_FILENAME, LEN_SWITCH_NAME, MAX_CUSTOM_FUNCTIONS, MAX_FLIGHT_MODES,
        MAX_LOGICAL_SWITCHES, MAX_MIXERS, NUM_MODULES, NUM_POTS, NUM_SLIDERS, NUM_STICKS,
        model::{CFN_ELEM, FMD_ELEM, HEADER_FIELDS, LS_ELEM, MIX_ELEM, MODULE_ELEM},
    },
    schema::Node,
};

/// Switch count before version 221.
pub const LEGACY_NUM_SWITCHES: usize = 8;

pub const RADIO_219_SIZE: usize = 84;
pub const RADIO_220_SIZE: usize = 85;
/// Models 219 and 220 share a binary layout; only their numbering differs.
pub const MODEL_LEGACY_SIZE: usize = 1317;

static SWITCH_TYPE: [Node; 1] = [Node::uint("type", 2)];
static SWITCH_ELEM: Node = Node::group("", &SWITCH_TYPE);
static POT_TYPE: [Node; 1] = [Node::uint("type", 2)];
static POT_ELEM: Node = Node::group("", &POT_TYPE);
static SLIDER_TYPE: [Node; 1] = [Node::uint("type", 1)];
static SLIDER_ELEM: Node = Node::group("", &SLIDER_TYPE);

macro_rules! radio_nodes {
    ($($inactivity:expr)?) => {
        [
            Node::uint("version", 8),
            Node::uint("vBatWarn", 8),
            Node::int("vBatMin", 8),
            Node::int("vBatMax", 8),
            Node::int("beepMode", 3),
            Node::int("beepVolume", 3),
            Node::padding(2),
            Node::int("speakerVolume", 5),
            Node::int("hapticMode", 3),
            Node::int("varioPitch", 8),
            Node::int("varioRange", 8),
            Node::uint("speakerPitch", 8),
            Node::uint("trainerMode", 4),
            Node::padding(4),
            $($inactivity,)?
            Node::array("switchConfig", LEGACY_NUM_SWITCHES, &SWITCH_ELEM),
            Node::array("potsConfig", NUM_POTS, &POT_ELEM),
            Node::array("slidersConfig", NUM_SLIDERS, &SLIDER_ELEM),
            Node::padding(8),
            Node::reserved("switchNames", LEGACY_NUM_SWITCHES * LEN_SWITCH_NAME * 8),
            Node::reserved("anaNames", (NUM_STICKS + NUM_POTS + NUM_SLIDERS) * LEN_ANA_NAME * 8),
            Node::text("ttsLanguage", 2),
            Node::text("currModelFilename", LEN_MODEL_FILENAME),
        ]
    };
}

/// Version 219 has no inactivity timer, and its trainer mode table has no
/// `OFF` entry.
pub static RADIO_219_NODES: [Node; 22] = radio_nodes!();
pub static RADIO_220_NODES: [Node; 23] = radio_nodes!(Node::uint("inactivityTimer", 8));

/// Models before 221 store 3 warning bits for each of 8 switches.
pub static MODEL_LEGACY_NODES: [Node; 14] = [
    Node::group("header", &HEADER_FIELDS),
    Node::int("trimInc", 3),
    Node::uint("disableThrottleWarning", 1),
    Node::uint("extendedLimits", 1),
    Node::uint("extendedTrims", 1),
    Node::uint("throttleReversed", 1),
    Node::padding(1),
    Node::uint("beepANACenter", 16),
    Node::array("mixData", MAX_MIXERS, &MIX_ELEM),
    Node::array("logicalSw", MAX_LOGICAL_SWITCHES, &LS_ELEM),
    Node::array("customFn", MAX_CUSTOM_FUNCTIONS, &CFN_ELEM),
    Node::array("flightModeData", MAX_FLIGHT_MODES, &FMD_ELEM),
    Node::uint("switchWarningState", 3 * LEGACY_NUM_SWITCHES),
    Node::array("moduleData", NUM_MODULES, &MODULE_ELEM),
];

type Compiled = LazyLock<Result<Layout, SchemaError>>;

static RADIO_219: Compiled = LazyLock::new(|| Layout::compile("radio v219", &RADIO_219_NODES, RADIO_219_SIZE));
static RADIO_220: Compiled = LazyLock::new(|| Layout::compile("radio v220", &RADIO_220_NODES, RADIO_220_SIZE));
static MODEL_219: Compiled =
    LazyLock::new(|| Layout::compile("model v219", &MODEL_LEGACY_NODES, MODEL_LEGACY_SIZE));
static MODEL_220: Compiled =
    LazyLock::new(|| Layout::compile("model v220", &MODEL_LEGACY_NODES, MODEL_LEGACY_SIZE));

fn get(layout: &'static Compiled) -> Result<&'static Layout, SchemaError> {
    layout.as_ref().map_err(Clone::clone)
}

pub fn radio_219() -> Result<&'static Layout, SchemaError> {
    get(&RADIO_219)
}

pub fn radio_220() -> Result<&'static Layout, SchemaError> {
    get(&RADIO_220)
}

pub fn model_219() -> Result<&'static Layout, SchemaError> {
    get(&MODEL_219)
}

pub fn model_220() -> Result<&'static Layout, SchemaError> {
    get(&MODEL_220)
}

#[cfg(test)]
mod tests {
    use radiocfg::radio::{general::radio_layout, model::model_layout};

    use super::*;

    #[test]
    fn test_legacy_layouts_compile() {
        assert_eq!(radio_219().unwrap().size_bytes(), RADIO_219_SIZE);
        assert_eq!(radio_220().unwrap().size_bytes(), RADIO_220_SIZE);
        assert_eq!(model_219().unwrap().size_bytes(), MODEL_LEGACY_SIZE);
        assert_eq!(model_220().unwrap().size_bytes(), MODEL_LEGACY_SIZE);
    }

    #[test]
    fn test_legacy_paths_match_current() {
        let old = radio_220().unwrap();
        let current = radio_layout().unwrap();
        for field in old.fields() {
            assert!(current.field(&field.path).is_some(), "{}", field.path);
        }
        assert_eq!(old.locate("switchNames").map(|s| s.offset), current.locate("switchNames").map(|s| s.offset));

        let model = model_layout().unwrap();
        let legacy = model_220().unwrap();
        assert_eq!(legacy.fields().len(), model.fields().len());
        assert_eq!(
            legacy.locate("moduleData").map(|s| s.offset + 8),
            model.locate("moduleData").map(|s| s.offset)
        );
    }
}
