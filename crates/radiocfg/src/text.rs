//! Text entry model and its YAML form.
//!
//! The walker produces and consumes ordered [`Entry`] trees. On disk they are
//! YAML mappings rendered and parsed by `serde_yaml`; quoting and escaping of
//! unusual scalars is left to it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use serde_yaml::{Mapping, Value};

use crate::errors::TextError;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry {
    pub key: String,
    pub value: EntryValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryValue {
    Scalar(String),
    Block(Vec<Entry>),
}

impl Entry {
    pub fn scalar(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: EntryValue::Scalar(value.into()),
        }
    }

    pub fn block(key: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            key: key.into(),
            value: EntryValue::Block(entries),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match &self.value {
            EntryValue::Scalar(s) => Some(s),
            EntryValue::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&[Entry]> {
        match &self.value {
            EntryValue::Block(entries) => Some(entries),
            EntryValue::Scalar(_) => None,
        }
    }
}

/// First entry with `key`.
pub fn find<'a>(entries: &'a [Entry], key: &str) -> Option<&'a Entry> {
    entries.iter().find(|e| e.key == key)
}

/// Follows a dotted key path through nested blocks.
pub fn find_path<'a>(entries: &'a [Entry], path: &str) -> Option<&'a Entry> {
    let mut parts = path.split('.');
    let mut entry = find(entries, parts.next()?)?;
    for part in parts {
        entry = find(entry.as_block()?, part)?;
    }
    Some(entry)
}

/// Output sink. Returns `false` to abort the write.
pub trait TextWriter {
    fn write(&mut self, chunk: &[u8]) -> bool;
}

impl TextWriter for Vec<u8> {
    fn write(&mut self, chunk: &[u8]) -> bool {
        self.extend_from_slice(chunk);
        true
    }
}

impl TextWriter for String {
    fn write(&mut self, chunk: &[u8]) -> bool {
        match std::str::from_utf8(chunk) {
            Ok(s) => {
                self.push_str(s);
                true
            }
            Err(_) => false,
        }
    }
}

/// Adapts a `write(buffer) -> success` callback.
pub struct Sink<F>(pub F);

impl<F: FnMut(&[u8]) -> bool> TextWriter for Sink<F> {
    fn write(&mut self, chunk: &[u8]) -> bool {
        (self.0)(chunk)
    }
}

/// Renders each top-level entry as its own YAML chunk, so the sink sees
/// one `write` per entry.
pub fn write_entries<W: TextWriter + ?Sized>(entries: &[Entry], out: &mut W) -> Result<(), TextError> {
    for entry in entries {
        let mut chunk = Mapping::new();
        chunk.insert(scalar_value(&entry.key), entry_value(&entry.value));
        let text = serde_yaml::to_string(&chunk).map_err(|err| TextError::Render(err.to_string()))?;
        if !out.write(text.as_bytes()) {
            return Err(TextError::WriterFailed);
        }
    }
    Ok(())
}

pub fn render(entries: &[Entry]) -> Result<String, TextError> {
    let mut out = String::new();
    write_entries(entries, &mut out)?;
    Ok(out)
}

/// Canonical integers become YAML numbers so keys and counters render bare.
fn scalar_value(text: &str) -> Value {
    match text.parse::<i64>() {
        Ok(n) if n.to_string() == text => Value::Number(n.into()),
        _ => Value::String(text.to_string()),
    }
}

fn entry_value(value: &EntryValue) -> Value {
    match value {
        EntryValue::Scalar(text) => scalar_value(text),
        EntryValue::Block(entries) => Value::Mapping(
            entries
                .iter()
                .map(|e| (scalar_value(&e.key), entry_value(&e.value)))
                .collect(),
        ),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Parses a YAML document into entries. An empty document has no entries; a
/// key with no value is an empty scalar. Sequences become blocks keyed by
/// position.
pub fn parse(text: &str) -> Result<Vec<Entry>, TextError> {
    let document: Value = serde_yaml::from_str(text).map_err(|err| TextError::Syntax {
        line: err.location().map_or(0, |at| at.line()),
        message: err.to_string(),
    })?;
    match document {
        Value::Null => Ok(Vec::new()),
        Value::Mapping(map) => from_mapping(&map, ""),
        _ => Err(TextError::ExpectedMapping(String::new())),
    }
}

fn from_mapping(map: &Mapping, path: &str) -> Result<Vec<Entry>, TextError> {
    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let key = scalar_text(key).ok_or_else(|| TextError::InvalidKey(path.to_string()))?;
        let child = join(path, &key);
        entries.push(from_value(key, value, &child)?);
    }
    Ok(entries)
}

fn from_value(key: String, value: &Value, path: &str) -> Result<Entry, TextError> {
    match value {
        Value::Mapping(map) => Ok(Entry::block(key, from_mapping(map, path)?)),
        Value::Sequence(items) => {
            let children = items
                .iter()
                .enumerate()
                .map(|(i, item)| from_value(i.to_string(), item, &join(path, &i.to_string())))
                .collect::<Result<_, _>>()?;
            Ok(Entry::block(key, children))
        }
        Value::Tagged(_) => Err(TextError::Unsupported(path.to_string())),
        scalar => Ok(Entry::scalar(key, scalar_text(scalar).unwrap_or_default())),
    }
}
