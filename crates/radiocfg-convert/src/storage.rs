//! Storage collaborators: where blobs and text files live.
//!
//! Names are `/`-separated paths relative to the storage root
//! (`MODELS/model1.bin`).

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::errors::StorageError;

/// Magic prefix of a binary blob file, followed by the version byte.
pub const BLOB_MAGIC: &[u8; 3] = b"o9x";

/// A versioned binary structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub version: u8,
    pub data: Vec<u8>,
}

pub trait Storage {
    fn read_blob(&self, name: &str) -> Result<Blob, StorageError>;

    fn write_blob(&mut self, name: &str, blob: &Blob) -> Result<(), StorageError>;

    fn read_text(&self, name: &str) -> Result<String, StorageError>;

    fn write_text(&mut self, name: &str, text: &str) -> Result<(), StorageError>;

    /// File names directly inside `dir`, sorted.
    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stored {
    Blob(Blob),
    Text(String),
}

/// Storage kept in memory, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    files: BTreeMap<String, Stored>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.files.remove(name).is_some()
    }
}

impl Storage for MemoryStorage {
    fn read_blob(&self, name: &str) -> Result<Blob, StorageError> {
        match self.files.get(name) {
            Some(Stored::Blob(blob)) => Ok(blob.clone()),
            Some(Stored::Text(_)) => Err(StorageError::WrongKind(name.to_string())),
            None => Err(StorageError::NotFound(name.to_string())),
        }
    }

    fn write_blob(&mut self, name: &str, blob: &Blob) -> Result<(), StorageError> {
        self.files.insert(name.to_string(), Stored::Blob(blob.clone()));
        Ok(())
    }

    fn read_text(&self, name: &str) -> Result<String, StorageError> {
        match self.files.get(name) {
            Some(Stored::Text(text)) => Ok(text.clone()),
            Some(Stored::Blob(_)) => Err(StorageError::WrongKind(name.to_string())),
            None => Err(StorageError::NotFound(name.to_string())),
        }
    }

    fn write_text(&mut self, name: &str, text: &str) -> Result<(), StorageError> {
        self.files.insert(name.to_string(), Stored::Text(text.to_string()));
        Ok(())
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        Ok(self
            .files
            .keys()
            .filter_map(|name| name.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect())
    }
}

/// Storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        name.split('/').fold(self.root.clone(), |path, part| path.join(part))
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(self.path(name)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::Io(err),
        })
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<(), StorageError> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Storage for FsStorage {
    fn read_blob(&self, name: &str) -> Result<Blob, StorageError> {
        let bytes = self.read(name)?;
        match bytes.split_at_checked(BLOB_MAGIC.len() + 1) {
            Some((header, data)) if header.starts_with(BLOB_MAGIC) => Ok(Blob {
                version: header[BLOB_MAGIC.len()],
                data: data.to_vec(),
            }),
            _ => Err(StorageError::BadHeader(name.to_string())),
        }
    }

    fn write_blob(&mut self, name: &str, blob: &Blob) -> Result<(), StorageError> {
        let mut bytes = Vec::with_capacity(BLOB_MAGIC.len() + 1 + blob.data.len());
        bytes.extend_from_slice(BLOB_MAGIC);
        bytes.push(blob.version);
        bytes.extend_from_slice(&blob.data);
        self.write(name, &bytes)
    }

    fn read_text(&self, name: &str) -> Result<String, StorageError> {
        String::from_utf8(self.read(name)?).map_err(|_| StorageError::WrongKind(name.to_string()))
    }

    fn write_text(&mut self, name: &str, text: &str) -> Result<(), StorageError> {
        self.write(name, text.as_bytes())
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(self.path(dir)) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
