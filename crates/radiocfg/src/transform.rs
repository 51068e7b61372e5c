//! Primitive value transcoders.
//!
//! A [`Transform`] converts between a raw bit-field and its text token:
//! - **Base**: the raw value is unsigned, or a two's-complement signed value at
//!   the field's width.
//! - **Numeric modifiers**: displayed = (value + `offset`) * `scale`.
//! - **Enum mapping**: the resulting integer is looked up in an [`EnumTable`].
//!
//! ## Transform order
//!
//! Raw → text applies base reinterpretation, then numeric modifiers, then the
//! enum mapping. Text → raw runs the exact inverse: enum lookup (or integer
//! parse), then `/ scale - offset`, then truncation to the field width.
//!
//! With `scale > 1` the text → raw direction truncates toward zero, so the
//! transform quantizes: "137" with scale 10 stores 13 and reads back as "130".

use crate::{
    bits::{sign_extend, truncate},
    enums::EnumTable,
    errors::DecodeError,
    schema::FieldContext,
};

/// Value-level custom transcoder for fields whose text form is a compact
/// grammar rather than a plain number.
pub trait Transcoder: Sync {
    /// Parses a text token into the raw field value.
    fn decode(&self, ctx: &FieldContext<'_>, text: &str) -> Result<u64, DecodeError>;

    /// Formats a raw field value. `None` when the value has no textual form.
    fn encode(&self, ctx: &FieldContext<'_>, raw: u64) -> Option<String>;

    /// Whether the raw value is two's-complement at the field width.
    fn signed(&self) -> bool {
        false
    }
}

/// Offset/scale/enum transform for plain numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    /// Interpret the raw value as two's-complement at the field width.
    pub signed: bool,
    /// Added to the raw value when displaying.
    pub offset: i64,
    /// Multiplies the offset value when displaying. Must be non-zero.
    pub scale: i64,
    /// If set, map the displayed integer to a name.
    pub enum_map: Option<&'static EnumTable>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::unsigned()
    }
}

impl Transform {
    pub const fn unsigned() -> Self {
        Self {
            signed: false,
            offset: 0,
            scale: 1,
            enum_map: None,
        }
    }

    pub const fn signed() -> Self {
        Self {
            signed: true,
            ..Self::unsigned()
        }
    }

    /// Sets the offset: displayed = (raw + offset) * scale.
    pub const fn with_offset(self, offset: i64) -> Self {
        Self { offset, ..self }
    }

    /// Sets the scale: displayed = (raw + offset) * scale.
    pub const fn with_scale(self, scale: i64) -> Self {
        Self { scale, ..self }
    }

    /// Maps displayed integers to names.
    pub const fn with_enum(self, table: &'static EnumTable) -> Self {
        Self {
            enum_map: Some(table),
            ..self
        }
    }

    /// Text → raw. Unknown enum names, malformed integers and integers that
    /// overflow the transform are errors.
    pub fn decode(&self, text: &str, bits: usize) -> Result<u64, DecodeError> {
        let text = text.trim();
        let value = match self.enum_map {
            Some(table) => table
                .value_of(text)
                .ok_or_else(|| DecodeError::UnknownName {
                    table: table.name,
                    name: text.to_string(),
                })?,
            None => parse_int(text)?,
        };

        let scale = if self.scale == 0 { 1 } else { self.scale };
        let stored = value
            .checked_div(scale)
            .and_then(|v| v.checked_sub(self.offset))
            .ok_or_else(|| DecodeError::InvalidNumber(text.to_string()))?;
        Ok(truncate(stored, bits))
    }

    /// Raw → text. A value missing from the enum table, or one that overflows
    /// the display range, yields `None`.
    pub fn encode(&self, raw: u64, bits: usize) -> Option<String> {
        let value = if self.signed {
            sign_extend(raw, bits)
        } else {
            raw as i64
        };
        let value = value.checked_add(self.offset)?.checked_mul(self.scale)?;

        match self.enum_map {
            Some(table) => table.name_of(value).map(str::to_string),
            None => Some(value.to_string()),
        }
    }
}

/// How a scalar node converts its raw bits.
#[derive(Clone, Copy)]
pub enum Transcode {
    Int(Transform),
    Ref(&'static dyn Transcoder),
}

impl Transcode {
    pub fn decode(&self, ctx: &FieldContext<'_>, text: &str) -> Result<u64, DecodeError> {
        match self {
            Transcode::Int(transform) => transform.decode(text, ctx.bits()),
            Transcode::Ref(transcoder) => transcoder.decode(ctx, text),
        }
    }

    pub fn encode(&self, ctx: &FieldContext<'_>, raw: u64) -> Option<String> {
        match self {
            Transcode::Int(transform) => transform.encode(raw, ctx.bits()),
            Transcode::Ref(transcoder) => transcoder.encode(ctx, raw),
        }
    }

    pub fn is_signed(&self) -> bool {
        match self {
            Transcode::Int(transform) => transform.signed,
            Transcode::Ref(transcoder) => transcoder.signed(),
        }
    }
}

/// Parses a decimal integer with an optional leading sign.
pub fn parse_int(text: &str) -> Result<i64, DecodeError> {
    let text = text.trim();
    let digits = text.strip_prefix('+').unwrap_or(text);
    digits
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidNumber(text.to_string()))
}

/// Parses the leading run of decimal digits, ignoring whatever follows.
pub fn leading_uint(text: &str) -> Option<u64> {
    let end = text
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    static BEEPER: EnumTable =
        EnumTable::new("beeper", &[(-2, "mode_quiet"), (-1, "mode_alarms"), (0, "mode_nokeys"), (1, "mode_all")]);

    #[test]
    fn test_offset_signed() {
        let vbat_min = Transform::signed().with_offset(90);
        assert_eq!(vbat_min.decode("90", 8).unwrap(), 0);
        assert_eq!(vbat_min.decode("80", 8).unwrap(), truncate(-10, 8));
        assert_eq!(vbat_min.encode(truncate(-10, 8), 8).as_deref(), Some("80"));
        assert_eq!(vbat_min.encode(0, 8).as_deref(), Some("90"));
    }

    #[test]
    fn test_scale_quantizes() {
        let pitch = Transform::signed().with_scale(10);
        assert_eq!(pitch.decode("137", 8).unwrap(), 13);
        assert_eq!(pitch.encode(13, 8).as_deref(), Some("130"));
        assert_eq!(pitch.decode("-40", 8).unwrap(), truncate(-4, 8));
        assert_eq!(pitch.encode(truncate(-4, 8), 8).as_deref(), Some("-40"));
    }

    #[test]
    fn test_signed_enum() {
        let beep = Transform::signed().with_enum(&BEEPER);
        assert_eq!(beep.decode("mode_quiet", 3).unwrap(), 0b110);
        assert_eq!(beep.encode(0b110, 3).as_deref(), Some("mode_quiet"));
        assert_eq!(beep.encode(0b001, 3).as_deref(), Some("mode_all"));
    }

    #[test]
    fn test_enum_unknown() {
        let beep = Transform::signed().with_enum(&BEEPER);
        assert_eq!(
            beep.decode("mode_loud", 3).unwrap_err(),
            DecodeError::UnknownName {
                table: "beeper",
                name: "mode_loud".to_string()
            }
        );
        assert_eq!(beep.encode(0b010, 3), None);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let vbat_min = Transform::signed().with_offset(90);
        assert_eq!(
            vbat_min.decode("-9223372036854775807", 8).unwrap_err(),
            DecodeError::InvalidNumber("-9223372036854775807".to_string())
        );
        assert!(vbat_min.decode("9223372036854775807", 8).is_ok());

        let wide = Transform::unsigned().with_offset(1);
        assert_eq!(wide.encode(i64::MAX as u64, 64), None);
        let scaled = Transform::unsigned().with_scale(15);
        assert_eq!(scaled.encode(i64::MAX as u64, 64), None);
        assert_eq!(scaled.encode(2, 64).as_deref(), Some("30"));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(" -12 ").unwrap(), -12);
        assert_eq!(parse_int("+7").unwrap(), 7);
        assert!(parse_int("7x").is_err());
        assert!(parse_int("").is_err());
    }

    #[test]
    fn test_leading_uint() {
        assert_eq!(leading_uint("12)"), Some(12));
        assert_eq!(leading_uint("3"), Some(3));
        assert_eq!(leading_uint(")"), None);
    }

    proptest! {
        #[test]
        fn prop_offset_round_trip(raw in -128i64..128, offset in -120i64..120) {
            let transform = Transform::signed().with_offset(offset);
            let stored = truncate(raw, 8);
            let text = transform.encode(stored, 8).unwrap();
            prop_assert_eq!(transform.decode(&text, 8).unwrap(), stored);
            prop_assert_eq!(transform.encode(transform.decode(&text, 8).unwrap(), 8).unwrap(), text);
        }

        #[test]
        fn prop_unsigned_round_trip(raw in 0u64..(1 << 12)) {
            let transform = Transform::unsigned();
            let text = transform.encode(raw, 12).unwrap();
            prop_assert_eq!(transform.decode(&text, 12).unwrap(), raw);
        }

        #[test]
        fn prop_scale_truncates(displayed in 0i64..2000) {
            let transform = Transform::unsigned().with_scale(15);
            let raw = transform.decode(&displayed.to_string(), 8).unwrap();
            let shown: i64 = transform.encode(raw, 8).unwrap().parse().unwrap();
            prop_assert_eq!(shown, (displayed / 15 % 256) * 15);
        }
    }
}
