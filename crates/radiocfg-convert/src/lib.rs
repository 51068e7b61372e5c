//! # radiocfg-convert
//!
//! Brings stored radio settings and models written by older firmware to the
//! current layout, and re-emits them in the configured backend.
//!
//! - [`migrate`]: per-version binary transformers and the chain applying them.
//! - [`legacy`]: layouts of the versions the chain accepts.
//! - [`convert`]: the bulk conversion pass and single model loading.
//! - [`storage`] / [`host`]: collaborators supplied by the platform.
//!
//! ## Example
//!
//! ```
//! use radiocfg::radio::general::radio_layout;
//! use radiocfg_convert::migrate::MigrationChain;
//!
//! let settings = radio_layout().unwrap();
//! let data = settings.zeroed();
//! let same = MigrationChain::radio(219).migrate(&data, 221).unwrap();
//! assert_eq!(same, data);
//! ```

pub mod config;
pub mod convert;
pub mod errors;
pub mod host;
pub mod legacy;
pub mod migrate;
#[cfg(feature = "serde")]
pub mod serde;
pub mod storage;

pub use config::{Backend, ConversionConfig};
pub use convert::{ConversionReport, Converter, LoadedModel, ModelHeaders};
