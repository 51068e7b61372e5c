//! Error types for migration, storage and conversion.

use radiocfg::errors::{FieldError, SchemaError, WalkError};
use thiserror::Error;

/// A stored structure could not be brought to the current version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// Downgrades are not supported.
    #[error("version {version} is newer than the current version {current}")]
    VersionTooNew { version: u8, current: u8 },
    /// Versions below the oldest convertible one have no transformers built in.
    #[error("conversion from version {version} is not compiled in (oldest is {oldest})")]
    NotCompiledIn { version: u8, oldest: u8 },
    #[error("no transformer upgrades version {version}")]
    MissingStep { version: u8 },
    #[error("version {version} blob holds {found} bytes, layout expects {expected}")]
    SizeMismatch { version: u8, expected: usize, found: usize },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Field(#[from] FieldError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("`{0}` does not exist")]
    NotFound(String),
    #[error("`{0}` has no valid blob header")]
    BadHeader(String),
    /// A blob was read as text, or text as a blob.
    #[error("`{0}` holds the wrong kind of content")]
    WrongKind(String),
}

/// Failure converting or loading one file.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
