use super::parse_index;
use crate::{
    bits::{sign_extend, truncate},
    errors::DecodeError,
    radio::{
        MAX_FLIGHT_MODES, MAX_LOGICAL_SWITCHES, MAX_TELEMETRY_SENSORS, NUM_POTS, XPOTS_MULTIPOS_COUNT,
        sources::{
            SWITCH_SOURCES, SWSRC_FIRST_FLIGHT_MODE, SWSRC_FIRST_LOGICAL_SWITCH, SWSRC_FIRST_MULTIPOS_SWITCH,
            SWSRC_FIRST_SENSOR, SWSRC_LAST, SWSRC_LAST_FLIGHT_MODE, SWSRC_LAST_LOGICAL_SWITCH,
            SWSRC_LAST_MULTIPOS_SWITCH, SWSRC_LAST_SENSOR,
        },
    },
    schema::FieldContext,
    transform::Transcoder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchTarget {
    /// Zero-based; written `L<n+1>`.
    LogicalSwitch(u16),
    /// Written `6P<pot><pos>`, both zero-based digits.
    Multipos { pot: u8, pos: u8 },
    /// Zero-based; written `FM<n>`.
    FlightMode(u8),
    /// Zero-based; written `T<n+1>`.
    Sensor(u16),
    /// Any other id; formatted through the named switch table.
    Other(i64),
}

/// A signed switch id. Negative ids are the inverted switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchRef {
    pub inverted: bool,
    pub target: SwitchTarget,
}

impl SwitchRef {
    pub fn from_raw(raw: i64) -> Self {
        let id = raw.abs();
        let target = match id {
            SWSRC_FIRST_LOGICAL_SWITCH..=SWSRC_LAST_LOGICAL_SWITCH => {
                SwitchTarget::LogicalSwitch((id - SWSRC_FIRST_LOGICAL_SWITCH) as u16)
            }
            SWSRC_FIRST_MULTIPOS_SWITCH..=SWSRC_LAST_MULTIPOS_SWITCH => {
                let n = (id - SWSRC_FIRST_MULTIPOS_SWITCH) as usize;
                SwitchTarget::Multipos {
                    pot: (n / XPOTS_MULTIPOS_COUNT) as u8,
                    pos: (n % XPOTS_MULTIPOS_COUNT) as u8,
                }
            }
            SWSRC_FIRST_FLIGHT_MODE..=SWSRC_LAST_FLIGHT_MODE => {
                SwitchTarget::FlightMode((id - SWSRC_FIRST_FLIGHT_MODE) as u8)
            }
            SWSRC_FIRST_SENSOR..=SWSRC_LAST_SENSOR => SwitchTarget::Sensor((id - SWSRC_FIRST_SENSOR) as u16),
            _ => SwitchTarget::Other(id),
        };
        Self {
            inverted: raw < 0,
            target,
        }
    }

    pub fn raw(self) -> i64 {
        let id = match self.target {
            SwitchTarget::LogicalSwitch(n) => SWSRC_FIRST_LOGICAL_SWITCH + i64::from(n),
            SwitchTarget::Multipos { pot, pos } => {
                SWSRC_FIRST_MULTIPOS_SWITCH + (usize::from(pot) * XPOTS_MULTIPOS_COUNT + usize::from(pos)) as i64
            }
            SwitchTarget::FlightMode(n) => SWSRC_FIRST_FLIGHT_MODE + i64::from(n),
            SwitchTarget::Sensor(n) => SWSRC_FIRST_SENSOR + i64::from(n),
            SwitchTarget::Other(id) => id,
        };
        if self.inverted { -id } else { id }
    }

    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let text = text.trim();
        let (inverted, body) = match text.strip_prefix('!') {
            Some(body) => (true, body),
            None => (false, text),
        };
        let invalid = || DecodeError::InvalidReference(text.to_string());
        let digits = |s: &str| s.starts_with(|c: char| c.is_ascii_digit());

        let target = if let Some(n) = body.strip_prefix('L').filter(|n| digits(n)) {
            let n = parse_index(n, MAX_LOGICAL_SWITCHES + 1).filter(|&n| n > 0).ok_or_else(invalid)?;
            SwitchTarget::LogicalSwitch(n - 1)
        } else if let Some(rest) = body.strip_prefix("6P") {
            match rest.as_bytes() {
                &[pot @ b'0'..=b'9', pos @ b'0'..=b'9']
                    if usize::from(pot - b'0') < NUM_POTS && usize::from(pos - b'0') < XPOTS_MULTIPOS_COUNT =>
                {
                    SwitchTarget::Multipos {
                        pot: pot - b'0',
                        pos: pos - b'0',
                    }
                }
                _ => return Err(invalid()),
            }
        } else if let Some(n) = body.strip_prefix("FM").filter(|n| digits(n)) {
            let n = parse_index(n, MAX_FLIGHT_MODES).ok_or_else(invalid)?;
            SwitchTarget::FlightMode(n as u8)
        } else if let Some(n) = body.strip_prefix('T').filter(|n| digits(n)) {
            let n = parse_index(n, MAX_TELEMETRY_SENSORS + 1).filter(|&n| n > 0).ok_or_else(invalid)?;
            SwitchTarget::Sensor(n - 1)
        } else {
            let id = SWITCH_SOURCES.value_of(body).ok_or_else(|| DecodeError::UnknownName {
                table: SWITCH_SOURCES.name,
                name: body.to_string(),
            })?;
            SwitchTarget::Other(id)
        };

        Ok(Self { inverted, target })
    }

    /// Text form, or `None` for an unnamed id.
    pub fn to_text(self) -> Option<String> {
        let body = match self.target {
            SwitchTarget::LogicalSwitch(n) => format!("L{}", n + 1),
            SwitchTarget::Multipos { pot, pos } => format!("6P{pot}{pos}"),
            SwitchTarget::FlightMode(n) => format!("FM{n}"),
            SwitchTarget::Sensor(n) => format!("T{}", n + 1),
            SwitchTarget::Other(id) => SWITCH_SOURCES.name_of(id)?.to_string(),
        };
        Some(if self.inverted { format!("!{body}") } else { body })
    }
}

/// Signed switch id field.
pub struct SwitchTranscoder;

pub static SWITCH: SwitchTranscoder = SwitchTranscoder;

impl Transcoder for SwitchTranscoder {
    fn decode(&self, ctx: &FieldContext<'_>, text: &str) -> Result<u64, DecodeError> {
        let raw = SwitchRef::parse(text)?.raw();
        if raw.abs() > SWSRC_LAST {
            return Err(DecodeError::InvalidReference(text.to_string()));
        }
        Ok(truncate(raw, ctx.bits()))
    }

    fn encode(&self, ctx: &FieldContext<'_>, raw: u64) -> Option<String> {
        SwitchRef::from_raw(sign_extend(raw, ctx.bits())).to_text()
    }

    fn signed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::sources::{SWSRC_ON, SWSRC_RADIO_ACTIVITY};

    fn raw(text: &str) -> i64 {
        SwitchRef::parse(text).unwrap().raw()
    }

    #[test]
    fn test_parse_families() {
        assert_eq!(raw("L1"), 57);
        assert_eq!(raw("!L64"), -120);
        assert_eq!(raw("6P00"), 31);
        assert_eq!(raw("6P25"), 48);
        assert_eq!(raw("FM0"), 123);
        assert_eq!(raw("T1"), 133);
        assert_eq!(raw("T60"), 192);
        assert_eq!(raw("SC2"), 9);
        assert_eq!(raw("!SA0"), -1);
        assert_eq!(raw("ON"), SWSRC_ON);
        assert_eq!(raw("RADIO_ACT"), SWSRC_RADIO_ACTIVITY);
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["L0", "L65", "6P30", "6P06", "6P1", "FM9", "T0", "T61"] {
            assert!(
                matches!(SwitchRef::parse(bad), Err(DecodeError::InvalidReference(_))),
                "{bad}"
            );
        }
        assert!(matches!(SwitchRef::parse("SK0"), Err(DecodeError::UnknownName { .. })));
    }

    #[test]
    fn test_canonical_text() {
        for id in -SWSRC_LAST..=SWSRC_LAST {
            let text = SwitchRef::from_raw(id).to_text().unwrap();
            assert_eq!(raw(&text), id, "{text}");
        }
    }

    #[test]
    fn test_transcoder_sign() {
        let ctx = FieldContext::detached(10);
        let stored = SWITCH.decode(&ctx, "!L2").unwrap();
        assert_eq!(stored, truncate(-58, 10));
        assert_eq!(SWITCH.encode(&ctx, stored).as_deref(), Some("!L2"));
    }
}
