use crate::{errors::DecodeError, radio::NUM_SWITCHES, schema::FieldContext, transform::Transcoder};

/// Required position of a switch at model load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnState {
    Unchecked = 0,
    Up = 1,
    Middle = 2,
    Down = 3,
    /// States 4..7 are never stored by a reader. Written as `x`, which reads
    /// back as unchecked.
    Invalid = 4,
}

impl WarnState {
    fn from_char(c: Option<u8>) -> Self {
        match c {
            Some(b'u') => WarnState::Up,
            Some(b'-') => WarnState::Middle,
            Some(b'd') => WarnState::Down,
            _ => WarnState::Unchecked,
        }
    }

    fn as_char(self) -> Option<char> {
        match self {
            WarnState::Unchecked => None,
            WarnState::Up => Some('u'),
            WarnState::Middle => Some('-'),
            WarnState::Down => Some('d'),
            WarnState::Invalid => Some('x'),
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits {
            1 => WarnState::Up,
            2 => WarnState::Middle,
            3 => WarnState::Down,
            0 => WarnState::Unchecked,
            _ => WarnState::Invalid,
        }
    }
}

/// Switch-warning mask: 3 bits per switch, written as `<letter><state>`
/// pairs such as `AdBuC-`.
pub struct SwitchWarning {
    pub switches: usize,
}

pub static SWITCH_WARNING: SwitchWarning = SwitchWarning { switches: NUM_SWITCHES };

impl SwitchWarning {
    /// Scans pairs left to right. A letter beyond the switch count ends the
    /// scan; an unknown or missing state clears that switch.
    pub fn parse(&self, text: &str) -> u64 {
        let mut mask = 0u64;
        let mut bytes = text.trim().bytes();

        while let Some(letter) = bytes.next() {
            let Some(switch) = letter.checked_sub(b'A').map(usize::from).filter(|&s| s < self.switches) else {
                break;
            };
            let state = WarnState::from_char(bytes.next());
            let shift = 3 * switch;
            mask = (mask & !(0b111 << shift)) | ((state as u64) << shift);
        }

        mask
    }

    pub fn format(&self, mask: u64) -> String {
        (0..self.switches)
            .filter_map(|i| {
                let state = WarnState::from_bits((mask >> (3 * i)) & 0b111);
                state.as_char().map(|c| format!("{}{c}", char::from(b'A' + i as u8)))
            })
            .collect()
    }
}

impl Transcoder for SwitchWarning {
    fn decode(&self, _ctx: &FieldContext<'_>, text: &str) -> Result<u64, DecodeError> {
        Ok(self.parse(text))
    }

    fn encode(&self, _ctx: &FieldContext<'_>, raw: u64) -> Option<String> {
        Some(self.format(raw))
    }
}
