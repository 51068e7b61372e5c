//! Version migration chain.
//!
//! Each [`Migration`] upgrades a binary blob by exactly one version. A
//! [`MigrationChain`] applies them in increasing version order until the blob
//! reaches [`CURRENT_VERSION`]. Blobs are migrated before any walker or
//! application code reads them.

use radiocfg::{
    bits,
    compiled::{Layout, LeafKind},
    errors::{FieldError, SchemaError},
    radio::{
        CURRENT_VERSION, MAX_CUSTOM_FUNCTIONS, MAX_FLIGHT_MODES, MAX_LOGICAL_SWITCHES, MAX_MIXERS, MAX_SCRIPTS,
        MAX_SCRIPT_OUTPUTS, NUM_SWITCHES, general::radio_layout, model::model_layout, tables::LsFamily,
    },
};
use tracing::debug;

use crate::{
    errors::MigrationError,
    legacy::{self, LEGACY_NUM_SWITCHES},
};

pub type LayoutFn = fn() -> Result<&'static Layout, SchemaError>;

/// Adjusts a blob already copied field-by-field into the target layout.
pub type Fixup = fn(&Layout, &mut [u8]) -> Result<(), FieldError>;

/// Upgrades a blob from one version to the next.
pub trait Migration: Sync {
    /// The version this step accepts; it produces the next one.
    fn source_version(&self) -> u8;

    fn migrate(&self, data: &[u8]) -> Result<Vec<u8>, MigrationError>;
}

/// A migration between two compiled layouts: shared fields are copied by
/// path, then `fixup` renumbers or defaults what changed meaning.
pub struct LayoutStep {
    pub from: u8,
    pub source: LayoutFn,
    pub target: LayoutFn,
    pub fixup: Fixup,
}

impl Migration for LayoutStep {
    fn source_version(&self) -> u8 {
        self.from
    }

    fn migrate(&self, data: &[u8]) -> Result<Vec<u8>, MigrationError> {
        let source = (self.source)()?;
        let target = (self.target)()?;
        if data.len() != source.size_bytes() {
            return Err(MigrationError::SizeMismatch {
                version: self.from,
                expected: source.size_bytes(),
                found: data.len(),
            });
        }

        let mut out = target.zeroed();
        source.copy_common(data, target, &mut out)?;
        (self.fixup)(target, &mut out)?;
        debug!(from = source.name(), to = target.name(), "migrated");
        Ok(out)
    }
}

/// Ordered transformers for one kind of blob.
pub struct MigrationChain {
    name: &'static str,
    steps: &'static [&'static dyn Migration],
    current: LayoutFn,
    oldest: u8,
}

impl MigrationChain {
    pub fn new(name: &'static str, steps: &'static [&'static dyn Migration], current: LayoutFn, oldest: u8) -> Self {
        Self {
            name,
            steps,
            current,
            oldest,
        }
    }

    /// Radio settings chain accepting versions from `oldest` on.
    pub fn radio(oldest: u8) -> Self {
        Self::new("radio", &RADIO_STEPS, radio_layout, oldest)
    }

    /// Model chain accepting versions from `oldest` on.
    pub fn model(oldest: u8) -> Self {
        Self::new("model", &MODEL_STEPS, model_layout, oldest)
    }

    /// Brings `data`, stored at `version`, to the current layout. A blob
    /// already at the current version is returned unchanged.
    pub fn migrate(&self, data: &[u8], version: u8) -> Result<Vec<u8>, MigrationError> {
        if version > CURRENT_VERSION {
            return Err(MigrationError::VersionTooNew {
                version,
                current: CURRENT_VERSION,
            });
        }
        if version < self.oldest {
            return Err(MigrationError::NotCompiledIn {
                version,
                oldest: self.oldest,
            });
        }

        let mut version = version;
        let mut data = data.to_vec();
        while version < CURRENT_VERSION {
            let step = self
                .steps
                .iter()
                .find(|s| s.source_version() == version)
                .ok_or(MigrationError::MissingStep { version })?;
            debug!(chain = self.name, version, "applying migration");
            data = step.migrate(&data)?;
            version += 1;
        }

        let current = (self.current)()?;
        if data.len() != current.size_bytes() {
            return Err(MigrationError::SizeMismatch {
                version,
                expected: current.size_bytes(),
                found: data.len(),
            });
        }
        Ok(data)
    }
}

pub static RADIO_219_TO_220: LayoutStep = LayoutStep {
    from: 219,
    source: legacy::radio_219,
    target: legacy::radio_220,
    fixup: radio_219_to_220,
};

pub static RADIO_220_TO_221: LayoutStep = LayoutStep {
    from: 220,
    source: legacy::radio_220,
    target: radio_layout,
    fixup: radio_220_to_221,
};

pub static MODEL_219_TO_220: LayoutStep = LayoutStep {
    from: 219,
    source: legacy::model_219,
    target: legacy::model_220,
    fixup: model_219_to_220,
};

pub static MODEL_220_TO_221: LayoutStep = LayoutStep {
    from: 220,
    source: legacy::model_220,
    target: model_layout,
    fixup: model_220_to_221,
};

static RADIO_STEPS: [&dyn Migration; 2] = [&RADIO_219_TO_220, &RADIO_220_TO_221];
static MODEL_STEPS: [&dyn Migration; 2] = [&MODEL_219_TO_220, &MODEL_220_TO_221];

/// Default of the inactivity timer introduced in 220, in minutes.
const INACTIVITY_TIMER_DEFAULT: i64 = 10;

/// First source id after the inputs in 219; the lua range is inserted there.
const SOURCE_FIRST_LUA: i64 = 33;
/// First logical switch source in 220, which follows the 8 switches.
const SOURCE_FIRST_LS_220: i64 = 112;
/// First switch id after the 8 × 3 switch positions in 220.
const SWITCH_FIRST_MULTIPOS_220: i64 = 1 + 3 * LEGACY_NUM_SWITCHES as i64;

const ADDED_SWITCHES: i64 = (NUM_SWITCHES - LEGACY_NUM_SWITCHES) as i64;

fn radio_219_to_220(layout: &Layout, data: &mut [u8]) -> Result<(), FieldError> {
    // 219 had no OFF entry at 0.
    let mode = layout.get_int(data, "trainerMode")?;
    layout.set_int(data, "trainerMode", mode + 1)?;
    layout.set_int(data, "inactivityTimer", INACTIVITY_TIMER_DEFAULT)?;
    layout.set_int(data, "version", 220)
}

fn radio_220_to_221(layout: &Layout, data: &mut [u8]) -> Result<(), FieldError> {
    layout.set_int(data, "version", 221)
}

fn model_219_to_220(layout: &Layout, data: &mut [u8]) -> Result<(), FieldError> {
    let lua = (MAX_SCRIPTS * MAX_SCRIPT_OUTPUTS) as i64;
    remap_sources(layout, data, |src| if src >= SOURCE_FIRST_LUA { src + lua } else { src })
}

fn model_220_to_221(layout: &Layout, data: &mut [u8]) -> Result<(), FieldError> {
    remap_sources(layout, data, |src| {
        if src >= SOURCE_FIRST_LS_220 { src + ADDED_SWITCHES } else { src }
    })?;
    remap_switches(layout, data, |sw| {
        if sw.abs() >= SWITCH_FIRST_MULTIPOS_220 {
            sw.signum() * (sw.abs() + 3 * ADDED_SWITCHES)
        } else {
            sw
        }
    })
}

/// Reads a reference, sign-extending custom operands when `signed`.
fn read_ref(layout: &Layout, data: &[u8], path: &str, signed: bool) -> Result<i64, FieldError> {
    let raw = layout.get_int(data, path)?;
    Ok(match layout.field(path) {
        Some(field) if signed && field.kind == LeafKind::Opaque => bits::sign_extend(raw as u64, field.span.bits),
        _ => raw,
    })
}

fn remap(
    layout: &Layout,
    data: &mut [u8],
    path: &str,
    signed: bool,
    f: &impl Fn(i64) -> i64,
) -> Result<(), FieldError> {
    let value = read_ref(layout, data, path, signed)?;
    let mapped = f(value);
    if mapped != value {
        layout.set_int(data, path, mapped)?;
    }
    Ok(())
}

fn ls_family(layout: &Layout, data: &[u8], i: usize) -> Result<LsFamily, FieldError> {
    Ok(LsFamily::of(layout.get_int(data, &format!("logicalSw.{i}.func"))?))
}

/// Renumbers every mix source reference.
fn remap_sources(layout: &Layout, data: &mut [u8], f: impl Fn(i64) -> i64) -> Result<(), FieldError> {
    for i in 0..MAX_MIXERS {
        remap(layout, data, &format!("mixData.{i}.srcRaw"), false, &f)?;
    }
    for i in 0..MAX_LOGICAL_SWITCHES {
        match ls_family(layout, data, i)? {
            LsFamily::Value => remap(layout, data, &format!("logicalSw.{i}.v1"), false, &f)?,
            LsFamily::Compare => {
                remap(layout, data, &format!("logicalSw.{i}.v1"), false, &f)?;
                remap(layout, data, &format!("logicalSw.{i}.v2"), false, &f)?;
            }
            LsFamily::Bool | LsFamily::Timer => {}
        }
    }
    Ok(())
}

/// Renumbers every signed switch reference.
fn remap_switches(layout: &Layout, data: &mut [u8], f: impl Fn(i64) -> i64) -> Result<(), FieldError> {
    for i in 0..MAX_MIXERS {
        remap(layout, data, &format!("mixData.{i}.swtch"), true, &f)?;
    }
    for i in 0..MAX_LOGICAL_SWITCHES {
        remap(layout, data, &format!("logicalSw.{i}.andsw"), true, &f)?;
        if ls_family(layout, data, i)? == LsFamily::Bool {
            remap(layout, data, &format!("logicalSw.{i}.v1"), true, &f)?;
            remap(layout, data, &format!("logicalSw.{i}.v2"), true, &f)?;
        }
    }
    for i in 0..MAX_CUSTOM_FUNCTIONS {
        remap(layout, data, &format!("customFn.{i}.swtch"), true, &f)?;
    }
    for i in 0..MAX_FLIGHT_MODES {
        remap(layout, data, &format!("flightModeData.{i}.swtch"), true, &f)?;
    }
    Ok(())
}
