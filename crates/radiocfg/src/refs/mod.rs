//! Compact text grammars for reference-valued fields.
//!
//! Each grammar is a typed value ([`SourceRef`], [`SwitchRef`]) with `parse`
//! and `Display`-like formatting, plus a static [`Transcoder`] that schema
//! nodes point at.
//!
//! [`Transcoder`]: crate::transform::Transcoder

mod source;
mod switch;
mod warning;
mod weight;

pub use source::{SOURCE, SourceRef, SourceTranscoder, TeleSign};
pub use switch::{SWITCH, SwitchRef, SwitchTarget, SwitchTranscoder};
pub use warning::{SWITCH_WARNING, SwitchWarning, WarnState};
pub use weight::{GVAR_WEIGHT, GvarWeight};

/// Parses the argument list of `<prefix>(<args>)`. The closing parenthesis is
/// optional.
fn call_args<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(prefix)?.strip_prefix('(')?;
    Some(rest.strip_suffix(')').unwrap_or(rest).trim())
}

fn parse_index(text: &str, count: usize) -> Option<u16> {
    text.trim().parse::<u16>().ok().filter(|&n| usize::from(n) < count)
}
