//! Conversion orchestrator.
//!
//! [`Converter::convert_radio_data`] migrates the radio settings, then every
//! stored model, re-emitting each in the configured backend. A model that
//! fails is reported and skipped; the pass continues with the next one.

use radiocfg::{
    compiled::Layout,
    radio::{CURRENT_VERSION, LEN_MODEL_NAME, general::radio_layout, model::model_layout},
    walker,
};
use tracing::{debug, info, warn};

use crate::{
    config::{Backend, ConversionConfig, with_extension},
    errors::ConvertError,
    host::Host,
    migrate::MigrationChain,
    storage::{Blob, Storage},
};

/// One entry of the model list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHeader {
    pub filename: String,
    pub name: String,
}

/// Fixed-capacity table of model names, owned by one conversion pass.
#[derive(Debug, Clone)]
pub struct ModelHeaders {
    capacity: usize,
    entries: Vec<ModelHeader>,
}

impl ModelHeaders {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Updates or inserts the header for `filename`. Returns `false` when a new
    /// entry would exceed the capacity.
    pub fn refresh(&mut self, filename: &str, name: &str) -> bool {
        let name: String = name.chars().take(LEN_MODEL_NAME).collect();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.filename == filename) {
            entry.name = name;
            return true;
        }
        if self.entries.len() == self.capacity {
            return false;
        }
        self.entries.push(ModelHeader {
            filename: filename.to_string(),
            name,
        });
        true
    }

    pub fn get(&self, filename: &str) -> Option<&ModelHeader> {
        self.entries.iter().find(|e| e.filename == filename)
    }

    pub fn entries(&self) -> &[ModelHeader] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug)]
pub struct ModelFailure {
    pub filename: String,
    pub error: ConvertError,
}

/// Outcome of a bulk conversion.
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Files written, the radio settings included.
    pub converted: usize,
    pub failures: Vec<ModelFailure>,
}

/// A model read for use. On failure `data` is a zeroed model.
#[derive(Debug)]
pub struct LoadedModel {
    pub data: Vec<u8>,
    pub error: Option<ConvertError>,
}

pub struct Converter<'a, S: Storage + ?Sized, H: Host + ?Sized> {
    storage: &'a mut S,
    host: &'a mut H,
    config: ConversionConfig,
    radio_chain: MigrationChain,
    model_chain: MigrationChain,
    headers: ModelHeaders,
}

impl<'a, S: Storage + ?Sized, H: Host + ?Sized> Converter<'a, S, H> {
    pub fn new(storage: &'a mut S, host: &'a mut H, config: ConversionConfig) -> Self {
        Self {
            radio_chain: MigrationChain::radio(config.oldest_convertible),
            model_chain: MigrationChain::model(config.oldest_convertible),
            headers: ModelHeaders::new(config.max_models),
            storage,
            host,
            config,
        }
    }

    pub fn headers(&self) -> &ModelHeaders {
        &self.headers
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Converts the radio settings and every stored model. Only a radio that
    /// cannot be converted fails the pass.
    pub fn convert_radio_data(&mut self) -> Result<ConversionReport, ConvertError> {
        let radio_name = self.config.radio_filename.clone();
        let stored = self.storage.read_blob(&radio_name)?;
        info!(version = stored.version, "converting radio data");

        let models: Vec<String> = self
            .storage
            .list(&self.config.models_dir)?
            .into_iter()
            .filter(|name| name.ends_with(".bin"))
            .collect();
        let total = models.len() + 1;
        let mut report = ConversionReport::default();

        self.host.progress(&radio_name, report.converted, total);
        self.host.watchdog();
        debug!(file = %radio_name, done = report.converted, total, "converting");
        let mut radio = self.radio_chain.migrate(&stored.data, stored.version)?;
        self.write_radio(&radio)?;
        report.converted += 1;
        self.host.yield_now();

        for filename in &models {
            self.host.progress(filename, report.converted, total);
            self.host.watchdog();
            debug!(file = %filename, done = report.converted, total, "converting");

            match self.convert_model(filename, &mut radio) {
                Ok(()) => report.converted += 1,
                Err(error) => {
                    warn!(file = %filename, %error, "model conversion failed");
                    report.failures.push(ModelFailure {
                        filename: filename.clone(),
                        error,
                    });
                }
            }
            self.host.yield_now();
        }

        // The current model filename may have followed a rename.
        if self.config.backend == Backend::Text {
            self.write_radio(&radio)?;
        }

        info!(converted = report.converted, failed = report.failures.len(), "conversion done");
        Ok(report)
    }

    fn convert_model(&mut self, filename: &str, radio: &mut [u8]) -> Result<(), ConvertError> {
        let stored = self.storage.read_blob(&self.config.model_path(filename))?;
        let model = self.model_chain.migrate(&stored.data, stored.version)?;
        let layout = model_layout()?;

        let output = match self.config.backend {
            Backend::Raw => filename.to_string(),
            Backend::Text => with_extension(filename, self.config.backend.model_extension()),
        };
        let path = self.config.model_path(&output);
        self.write(layout, &path, &model)?;

        if output != filename {
            let settings = radio_layout()?;
            if settings.get_text(radio, "currModelFilename")? == filename {
                settings.set_text(radio, "currModelFilename", &output)?;
            }
        }

        let name = layout.get_text(&model, "header.name")?;
        if !self.headers.refresh(&output, &name) {
            warn!(file = %output, capacity = self.headers.capacity(), "model header table full");
        }
        Ok(())
    }

    fn write_radio(&mut self, radio: &[u8]) -> Result<(), ConvertError> {
        let output = self.config.radio_output();
        self.write(radio_layout()?, &output, radio)
    }

    fn write(&mut self, layout: &Layout, name: &str, data: &[u8]) -> Result<(), ConvertError> {
        match self.config.backend {
            Backend::Raw => self.storage.write_blob(
                name,
                &Blob {
                    version: CURRENT_VERSION,
                    data: data.to_vec(),
                },
            )?,
            Backend::Text => {
                let mut text = String::new();
                walker::write_text(layout, data, &mut text)?;
                self.storage.write_text(name, &text)?;
            }
        }
        debug!(file = %name, layout = layout.name(), "written");
        Ok(())
    }

    /// Reads one model for use, migrating it if it is older than current.
    /// Text files are read leniently.
    pub fn load_model(&mut self, filename: &str) -> LoadedModel {
        match self.try_load_model(filename) {
            Ok(data) => LoadedModel { data, error: None },
            Err(error) => {
                warn!(file = %filename, %error, "model load failed");
                let data = model_layout().map(Layout::zeroed).unwrap_or_default();
                LoadedModel {
                    data,
                    error: Some(error),
                }
            }
        }
    }

    fn try_load_model(&mut self, filename: &str) -> Result<Vec<u8>, ConvertError> {
        let path = self.config.model_path(filename);
        let layout = model_layout()?;

        if filename.ends_with(".yml") {
            let encoded = walker::read_text(layout, &self.storage.read_text(&path)?)?;
            for issue in &encoded.issues {
                debug!(file = %filename, path = %issue.path, error = %issue.error, "field reset");
            }
            return Ok(encoded.bytes);
        }

        let stored = self.storage.read_blob(&path)?;
        Ok(self.model_chain.migrate(&stored.data, stored.version)?)
    }
}
