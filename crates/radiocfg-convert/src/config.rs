//! Runtime conversion settings.

use radiocfg::radio::CURRENT_VERSION;

/// Output format of converted files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Versioned binary blobs.
    Raw,
    /// Indentation text; `.bin` model files are renamed to `.yml`.
    #[default]
    Text,
}

impl Backend {
    pub fn model_extension(self) -> &'static str {
        match self {
            Backend::Raw => "bin",
            Backend::Text => "yml",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    pub backend: Backend,
    /// Versions below this have no transformers compiled in.
    pub oldest_convertible: u8,
    /// Capacity of the model header table.
    pub max_models: usize,
    pub radio_filename: String,
    pub models_dir: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            oldest_convertible: 219,
            max_models: 60,
            radio_filename: "RADIO/radio.bin".to_string(),
            models_dir: "MODELS".to_string(),
        }
    }
}

impl ConversionConfig {
    /// Whether `version` can be read at all, directly or by migration.
    pub fn accepts(&self, version: u8) -> bool {
        (self.oldest_convertible..=CURRENT_VERSION).contains(&version)
    }

    pub fn model_path(&self, filename: &str) -> String {
        format!("{}/{filename}", self.models_dir.trim_end_matches('/'))
    }

    /// Where the radio settings are written by the configured backend.
    pub fn radio_output(&self) -> String {
        match self.backend {
            Backend::Raw => self.radio_filename.clone(),
            Backend::Text => with_extension(&self.radio_filename, "yml"),
        }
    }
}

/// Replaces the extension of the last path component, or appends one.
pub fn with_extension(filename: &str, ext: &str) -> String {
    let stem_end = filename
        .rfind('.')
        .filter(|&dot| !filename[dot..].contains('/'))
        .unwrap_or(filename.len());
    format!("{}.{ext}", &filename[..stem_end])
}
