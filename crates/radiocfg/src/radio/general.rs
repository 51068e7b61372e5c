//! Radio-wide settings.

use std::sync::LazyLock;

use super::{
    LEN_ANA_NAME, LEN_MODEL_FILENAME, LEN_SWITCH_NAME, NUM_POTS, NUM_SLIDERS, NUM_STICKS, NUM_SWITCHES,
    VOLUME_LEVEL_DEF,
    sources::{MIX_SOURCES, MIXSRC_FIRST_POT, MIXSRC_FIRST_SLIDER, MIXSRC_FIRST_STICK, MIXSRC_FIRST_SWITCH},
    tables::{BEEPER_MODE, POT_CONFIG, SLIDER_CONFIG, SWITCH_CONFIG, TRAINER_MODE},
};
use crate::{
    bits,
    compiled::Layout,
    errors::{DecodeError, SchemaError},
    schema::{FieldCodec, FieldContext, IndexCodec, Node},
    transform::Transform,
};

pub const RADIO_SIZE: usize = 91;

/// Name of a stick, pot, slider or switch. The text lives in one of the
/// radio's shared name tables, at the slot of the enclosing array element.
pub struct NameSlot {
    table: &'static str,
    first: usize,
    len: usize,
}

impl NameSlot {
    /// Bit offset of this element's slot inside the table.
    fn slot(&self, ctx: &FieldContext<'_>) -> Option<usize> {
        let table = ctx.locate(self.table)?;
        let slot = self.first + ctx.index(0)?;
        let offset = table.offset + slot * self.len * 8;
        (offset + self.len * 8 <= table.offset + table.bits).then_some(offset)
    }
}

impl FieldCodec for NameSlot {
    fn read(&self, ctx: &FieldContext<'_>, data: &mut [u8], text: &str) -> Result<(), DecodeError> {
        let offset = self
            .slot(ctx)
            .ok_or_else(|| DecodeError::InvalidReference(self.table.to_string()))?;
        if !bits::is_latin1(text) {
            return Err(DecodeError::InvalidText(text.to_string()));
        }
        bits::write_text_at(data, offset, self.len, text)?;
        Ok(())
    }

    fn write(&self, ctx: &FieldContext<'_>, data: &[u8]) -> Option<String> {
        let name = bits::read_text_at(data, self.slot(ctx)?, self.len).ok()?;
        (!name.is_empty()).then_some(name)
    }
}

static STICK_NAME: NameSlot = NameSlot {
    table: "anaNames",
    first: 0,
    len: LEN_ANA_NAME,
};
static POT_NAME: NameSlot = NameSlot {
    table: "anaNames",
    first: NUM_STICKS,
    len: LEN_ANA_NAME,
};
static SLIDER_NAME: NameSlot = NameSlot {
    table: "anaNames",
    first: NUM_STICKS + NUM_POTS,
    len: LEN_ANA_NAME,
};
static SWITCH_NAME: NameSlot = NameSlot {
    table: "switchNames",
    first: 0,
    len: LEN_SWITCH_NAME,
};

/// Keys array slots by the name of the matching mix source (`SA`, `P1`, `Rud`).
pub struct SourceIndex {
    first: i64,
    count: usize,
}

impl IndexCodec for SourceIndex {
    fn parse(&self, key: &str) -> Option<usize> {
        let slot = MIX_SOURCES.value_of(key)? - self.first;
        usize::try_from(slot).ok().filter(|&slot| slot < self.count)
    }

    fn format(&self, index: usize) -> Option<String> {
        (index < self.count)
            .then(|| MIX_SOURCES.name_of(self.first + index as i64))
            .flatten()
            .map(str::to_string)
    }
}

static STICK_KEYS: SourceIndex = SourceIndex {
    first: MIXSRC_FIRST_STICK,
    count: NUM_STICKS,
};
static POT_KEYS: SourceIndex = SourceIndex {
    first: MIXSRC_FIRST_POT,
    count: NUM_POTS,
};
static SLIDER_KEYS: SourceIndex = SourceIndex {
    first: MIXSRC_FIRST_SLIDER,
    count: NUM_SLIDERS,
};
static SWITCH_KEYS: SourceIndex = SourceIndex {
    first: MIXSRC_FIRST_SWITCH,
    count: NUM_SWITCHES,
};

static SWITCH_FIELDS: [Node; 2] = [
    Node::enumerated("type", 2, &SWITCH_CONFIG),
    Node::custom("name", 0, &SWITCH_NAME),
];
static SWITCH_ELEM: Node = Node::group("", &SWITCH_FIELDS);

static POT_FIELDS: [Node; 2] = [Node::enumerated("type", 2, &POT_CONFIG), Node::custom("name", 0, &POT_NAME)];
static POT_ELEM: Node = Node::group("", &POT_FIELDS);

static SLIDER_FIELDS: [Node; 2] = [
    Node::enumerated("type", 1, &SLIDER_CONFIG),
    Node::custom("name", 0, &SLIDER_NAME),
];
static SLIDER_ELEM: Node = Node::group("", &SLIDER_FIELDS);

static STICK_FIELDS: [Node; 1] = [Node::custom("name", 0, &STICK_NAME)];
static STICK_ELEM: Node = Node::group("", &STICK_FIELDS);

pub static RADIO_NODES: [Node; 24] = [
    Node::uint("version", 8),
    Node::uint("vBatWarn", 8),
    Node::transformed("vBatMin", 8, Transform::signed().with_offset(90)),
    Node::transformed("vBatMax", 8, Transform::signed().with_offset(120)),
    Node::transformed("beepMode", 3, Transform::signed().with_enum(&BEEPER_MODE)),
    Node::transformed("beepVolume", 3, Transform::signed().with_offset(2)),
    Node::padding(2),
    Node::transformed("speakerVolume", 5, Transform::signed().with_offset(VOLUME_LEVEL_DEF)),
    Node::transformed("hapticMode", 3, Transform::signed().with_enum(&BEEPER_MODE)),
    Node::transformed("varioPitch", 8, Transform::signed().with_scale(10)),
    Node::transformed("varioRange", 8, Transform::signed().with_scale(10)),
    Node::transformed("speakerPitch", 8, Transform::unsigned().with_scale(15)),
    Node::enumerated("trainerMode", 4, &TRAINER_MODE),
    Node::padding(4),
    Node::uint("inactivityTimer", 8),
    Node::array("switchConfig", NUM_SWITCHES, &SWITCH_ELEM).keyed(&SWITCH_KEYS),
    Node::array("potsConfig", NUM_POTS, &POT_ELEM).keyed(&POT_KEYS),
    Node::array("slidersConfig", NUM_SLIDERS, &SLIDER_ELEM).keyed(&SLIDER_KEYS),
    Node::padding(4),
    Node::array("sticksConfig", NUM_STICKS, &STICK_ELEM).keyed(&STICK_KEYS),
    Node::reserved("switchNames", NUM_SWITCHES * LEN_SWITCH_NAME * 8),
    Node::reserved("anaNames", (NUM_STICKS + NUM_POTS + NUM_SLIDERS) * LEN_ANA_NAME * 8),
    Node::text("ttsLanguage", 2),
    Node::text("currModelFilename", LEN_MODEL_FILENAME),
];

static RADIO: LazyLock<Result<Layout, SchemaError>> =
    LazyLock::new(|| Layout::compile("radio", &RADIO_NODES, RADIO_SIZE));

/// The compiled current radio layout.
pub fn radio_layout() -> Result<&'static Layout, SchemaError> {
    RADIO.as_ref().map_err(Clone::clone)
}
