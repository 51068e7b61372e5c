use crate::{
    bits::{sign_extend, truncate},
    errors::DecodeError,
    schema::FieldContext,
    transform::{Transcoder, parse_int},
};

/// Threshold of the small gvar encoding.
const GVAR_SMALL: i64 = 128;

/// Weight or offset that may reference a global variable.
///
/// `GVn` (n in 1..=9) stores `-128 + (n - 1)` and `-GVn` stores `128 - n`.
/// Plain integers must lie in `-119..=118` so they never alias a gvar.
pub struct GvarWeight;

pub static GVAR_WEIGHT: GvarWeight = GvarWeight;

impl GvarWeight {
    pub const MIN: i64 = -GVAR_SMALL + 9;
    pub const MAX: i64 = GVAR_SMALL - 10;

    pub fn parse(text: &str) -> Result<i64, DecodeError> {
        let text = text.trim();
        let gvar = |digits: &str| match digits.as_bytes() {
            &[d @ b'1'..=b'9'] => Some(i64::from(d - b'0')),
            _ => None,
        };

        if let Some(n) = text.strip_prefix("-GV").and_then(gvar) {
            return Ok(GVAR_SMALL - n);
        }
        if let Some(n) = text.strip_prefix("GV").and_then(gvar) {
            return Ok(-GVAR_SMALL + n - 1);
        }

        let value = parse_int(text)?;
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DecodeError::InvalidReference(text.to_string()));
        }
        Ok(value)
    }

    pub fn format(value: i64) -> String {
        match value {
            119..=127 => format!("-GV{}", GVAR_SMALL - value),
            -128..=-120 => format!("GV{}", value + GVAR_SMALL + 1),
            _ => value.to_string(),
        }
    }
}

impl Transcoder for GvarWeight {
    fn decode(&self, ctx: &FieldContext<'_>, text: &str) -> Result<u64, DecodeError> {
        Ok(truncate(Self::parse(text)?, ctx.bits()))
    }

    fn encode(&self, ctx: &FieldContext<'_>, raw: u64) -> Option<String> {
        Some(Self::format(sign_extend(raw, ctx.bits())))
    }

    fn signed(&self) -> bool {
        true
    }
}
