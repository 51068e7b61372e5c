use std::fmt;

use super::{call_args, parse_index};
use crate::{
    bits::truncate,
    errors::DecodeError,
    radio::{
        MAX_GVARS, MAX_INPUTS, MAX_LOGICAL_SWITCHES, MAX_OUTPUT_CHANNELS, MAX_SCRIPT_OUTPUTS, MAX_SCRIPTS,
        MAX_TELEMETRY_SENSORS, MAX_TRAINER_CHANNELS,
        sources::{
            MIX_SOURCES, MIXSRC_FIRST_CH, MIXSRC_FIRST_GVAR, MIXSRC_FIRST_INPUT, MIXSRC_FIRST_LOGICAL_SWITCH,
            MIXSRC_FIRST_LUA, MIXSRC_FIRST_TELEM, MIXSRC_FIRST_TRAINER, MIXSRC_LAST_CH, MIXSRC_LAST_GVAR,
            MIXSRC_LAST_INPUT, MIXSRC_LAST_LOGICAL_SWITCH, MIXSRC_LAST_LUA, MIXSRC_LAST_TELEM, MIXSRC_LAST_TRAINER,
        },
    },
    schema::FieldContext,
    transform::Transcoder,
};

/// Which telemetry value a `tele(...)` source reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleSign {
    Value,
    /// `-`: the recorded minimum.
    Min,
    /// `+`: the recorded maximum.
    Max,
}

/// A mix source id, split into its family.
///
/// Indices of parameterized families are zero-based in both the id space and
/// the text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRef {
    Input(u16),
    Lua { script: u16, output: u16 },
    LogicalSwitch(u16),
    Trainer(u16),
    Channel(u16),
    Gvar(u16),
    Telemetry { sensor: u16, sign: TeleSign },
    /// Any other id; formatted through the named source table.
    Other(i64),
}

impl SourceRef {
    pub fn from_raw(raw: i64) -> Self {
        let offset = |first: i64| (raw - first) as u16;
        match raw {
            MIXSRC_FIRST_INPUT..=MIXSRC_LAST_INPUT => SourceRef::Input(offset(MIXSRC_FIRST_INPUT)),
            MIXSRC_FIRST_LUA..=MIXSRC_LAST_LUA => {
                let n = offset(MIXSRC_FIRST_LUA);
                SourceRef::Lua {
                    script: n / MAX_SCRIPT_OUTPUTS as u16,
                    output: n % MAX_SCRIPT_OUTPUTS as u16,
                }
            }
            MIXSRC_FIRST_LOGICAL_SWITCH..=MIXSRC_LAST_LOGICAL_SWITCH => {
                SourceRef::LogicalSwitch(offset(MIXSRC_FIRST_LOGICAL_SWITCH))
            }
            MIXSRC_FIRST_TRAINER..=MIXSRC_LAST_TRAINER => SourceRef::Trainer(offset(MIXSRC_FIRST_TRAINER)),
            MIXSRC_FIRST_CH..=MIXSRC_LAST_CH => SourceRef::Channel(offset(MIXSRC_FIRST_CH)),
            MIXSRC_FIRST_GVAR..=MIXSRC_LAST_GVAR => SourceRef::Gvar(offset(MIXSRC_FIRST_GVAR)),
            MIXSRC_FIRST_TELEM..=MIXSRC_LAST_TELEM => {
                let n = offset(MIXSRC_FIRST_TELEM);
                let sign = match n % 3 {
                    0 => TeleSign::Value,
                    1 => TeleSign::Min,
                    _ => TeleSign::Max,
                };
                SourceRef::Telemetry { sensor: n / 3, sign }
            }
            _ => SourceRef::Other(raw),
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            SourceRef::Input(n) => MIXSRC_FIRST_INPUT + i64::from(n),
            SourceRef::Lua { script, output } => {
                MIXSRC_FIRST_LUA + i64::from(script) * MAX_SCRIPT_OUTPUTS as i64 + i64::from(output)
            }
            SourceRef::LogicalSwitch(n) => MIXSRC_FIRST_LOGICAL_SWITCH + i64::from(n),
            SourceRef::Trainer(n) => MIXSRC_FIRST_TRAINER + i64::from(n),
            SourceRef::Channel(n) => MIXSRC_FIRST_CH + i64::from(n),
            SourceRef::Gvar(n) => MIXSRC_FIRST_GVAR + i64::from(n),
            SourceRef::Telemetry { sensor, sign } => {
                let sign = match sign {
                    TeleSign::Value => 0,
                    TeleSign::Min => 1,
                    TeleSign::Max => 2,
                };
                MIXSRC_FIRST_TELEM + i64::from(sensor) * 3 + sign
            }
            SourceRef::Other(raw) => raw,
        }
    }

    /// Parses a source token. Prefixed forms are tried before the named table.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let text = text.trim();
        let invalid = || DecodeError::InvalidReference(text.to_string());

        if let Some(n) = text.strip_prefix('I').filter(|n| n.starts_with(|c: char| c.is_ascii_digit())) {
            return parse_index(n, MAX_INPUTS).map(SourceRef::Input).ok_or_else(invalid);
        }
        if let Some(args) = call_args(text, "lua") {
            let (script, output) = args.split_once(',').ok_or_else(invalid)?;
            return match (parse_index(script, MAX_SCRIPTS), parse_index(output, MAX_SCRIPT_OUTPUTS)) {
                (Some(script), Some(output)) => Ok(SourceRef::Lua { script, output }),
                _ => Err(invalid()),
            };
        }

        let families: [(&str, usize, fn(u16) -> SourceRef); 4] = [
            ("ls", MAX_LOGICAL_SWITCHES, SourceRef::LogicalSwitch),
            ("tr", MAX_TRAINER_CHANNELS, SourceRef::Trainer),
            ("ch", MAX_OUTPUT_CHANNELS, SourceRef::Channel),
            ("gv", MAX_GVARS, SourceRef::Gvar),
        ];
        for (prefix, count, build) in families {
            if let Some(args) = call_args(text, prefix) {
                return parse_index(args, count).map(build).ok_or_else(invalid);
            }
        }

        if let Some(args) = call_args(text, "tele") {
            let (sign, n) = match args.as_bytes().first() {
                Some(b'-') => (TeleSign::Min, &args[1..]),
                Some(b'+') => (TeleSign::Max, &args[1..]),
                _ => (TeleSign::Value, args),
            };
            return parse_index(n, MAX_TELEMETRY_SENSORS)
                .map(|sensor| SourceRef::Telemetry { sensor, sign })
                .ok_or_else(invalid);
        }

        MIX_SOURCES
            .value_of(text)
            .map(SourceRef::Other)
            .ok_or_else(|| DecodeError::UnknownName {
                table: MIX_SOURCES.name,
                name: text.to_string(),
            })
    }

    /// Text form, or `None` for an unnamed id.
    pub fn to_text(self) -> Option<String> {
        match self {
            SourceRef::Other(raw) => MIX_SOURCES.name_of(raw).map(str::to_string),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SourceRef::Input(n) => write!(f, "I{n}"),
            SourceRef::Lua { script, output } => write!(f, "lua({script},{output})"),
            SourceRef::LogicalSwitch(n) => write!(f, "ls({n})"),
            SourceRef::Trainer(n) => write!(f, "tr({n})"),
            SourceRef::Channel(n) => write!(f, "ch({n})"),
            SourceRef::Gvar(n) => write!(f, "gv({n})"),
            SourceRef::Telemetry { sensor, sign } => {
                let sign = match sign {
                    TeleSign::Value => "",
                    TeleSign::Min => "-",
                    TeleSign::Max => "+",
                };
                write!(f, "tele({sign}{sensor})")
            }
            SourceRef::Other(raw) => match MIX_SOURCES.name_of(raw) {
                Some(name) => f.write_str(name),
                None => write!(f, "{raw}"),
            },
        }
    }
}

/// Unsigned source id field.
pub struct SourceTranscoder;

pub static SOURCE: SourceTranscoder = SourceTranscoder;

impl Transcoder for SourceTranscoder {
    fn decode(&self, ctx: &FieldContext<'_>, text: &str) -> Result<u64, DecodeError> {
        Ok(truncate(SourceRef::parse(text)?.raw(), ctx.bits()))
    }

    fn encode(&self, _ctx: &FieldContext<'_>, raw: u64) -> Option<String> {
        SourceRef::from_raw(raw as i64).to_text()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::radio::sources::{MIXSRC_FIRST_STICK, MIXSRC_NONE};

    #[test]
    fn test_parse_families() {
        assert_eq!(SourceRef::parse("I0").unwrap().raw(), 1);
        assert_eq!(SourceRef::parse("lua(1,2)").unwrap().raw(), 33 + 6 + 2);
        assert_eq!(SourceRef::parse("ls(0)").unwrap().raw(), 114);
        assert_eq!(SourceRef::parse("tr(15)").unwrap().raw(), 193);
        assert_eq!(SourceRef::parse("ch(3)").unwrap().raw(), 197);
        assert_eq!(SourceRef::parse("gv(8)").unwrap().raw(), 234);
        assert_eq!(SourceRef::parse("tele(-2)").unwrap().raw(), 241 + 7);
        assert_eq!(SourceRef::parse("tele(+2)").unwrap().raw(), 241 + 8);
        assert_eq!(SourceRef::parse("Thr").unwrap().raw(), MIXSRC_FIRST_STICK + 2);
        assert_eq!(SourceRef::parse("NONE").unwrap().raw(), MIXSRC_NONE);
    }

    #[test]
    fn test_parse_rejects() {
        assert!(matches!(SourceRef::parse("I32"), Err(DecodeError::InvalidReference(_))));
        assert!(matches!(SourceRef::parse("lua(9,0)"), Err(DecodeError::InvalidReference(_))));
        assert!(matches!(SourceRef::parse("lua(1)"), Err(DecodeError::InvalidReference(_))));
        assert!(matches!(SourceRef::parse("ls(x)"), Err(DecodeError::InvalidReference(_))));
        assert!(matches!(SourceRef::parse("Input1"), Err(DecodeError::UnknownName { .. })));
    }

    #[test]
    fn test_format() {
        assert_eq!(SourceRef::from_raw(39).to_text().as_deref(), Some("lua(1,0)"));
        assert_eq!(SourceRef::from_raw(246).to_text().as_deref(), Some("tele(+1)"));
        assert_eq!(SourceRef::from_raw(104).to_text().as_deref(), Some("SA"));
        assert_eq!(SourceRef::from_raw(1000).to_text(), None);
    }

    #[test]
    fn test_transcoder_width() {
        let ctx = FieldContext::detached(10);
        assert_eq!(SOURCE.decode(&ctx, "tele(59)").unwrap(), 418);
        assert_eq!(SOURCE.encode(&ctx, 418).as_deref(), Some("tele(59)"));
    }

    proptest! {
        #[test]
        fn prop_every_known_id_round_trips(raw in 0i64..=MIXSRC_LAST_TELEM) {
            let source = SourceRef::from_raw(raw);
            if let Some(text) = source.to_text() {
                prop_assert_eq!(SourceRef::parse(&text).unwrap().raw(), raw);
            }
        }
    }
}
