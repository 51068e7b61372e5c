//! JSON-deserializable conversion settings.
//!
//! Every field is optional; missing ones take the [`ConversionConfig`]
//! defaults.

use serde::{Deserialize, Serialize};

use crate::config::{Backend, ConversionConfig};

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum BackendDef {
    Raw,
    Text,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ConfigDef {
    pub backend: Option<BackendDef>,
    pub oldest_convertible: Option<u8>,
    pub max_models: Option<usize>,
    pub radio_filename: Option<String>,
    pub models_dir: Option<String>,
}

impl From<BackendDef> for Backend {
    fn from(value: BackendDef) -> Self {
        match value {
            BackendDef::Raw => Backend::Raw,
            BackendDef::Text => Backend::Text,
        }
    }
}

impl From<ConfigDef> for ConversionConfig {
    fn from(value: ConfigDef) -> Self {
        let defaults = ConversionConfig::default();
        ConversionConfig {
            backend: value.backend.map_or(defaults.backend, Into::into),
            oldest_convertible: value.oldest_convertible.unwrap_or(defaults.oldest_convertible),
            max_models: value.max_models.unwrap_or(defaults.max_models),
            radio_filename: value.radio_filename.unwrap_or(defaults.radio_filename),
            models_dir: value.models_dir.unwrap_or(defaults.models_dir),
        }
    }
}

impl ConversionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<ConfigDef>(json).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config = ConversionConfig::from_json(r#"{ "backend": "Raw", "max_models": 8 }"#).unwrap();
        assert_eq!(config.backend, Backend::Raw);
        assert_eq!(config.max_models, 8);
        assert_eq!(config.oldest_convertible, 219);
        assert_eq!(config.models_dir, "MODELS");
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(ConversionConfig::from_json(r#"{ "backend": "Flash" }"#).is_err());
    }
}
