//! Schema-driven traversal between a packed structure and text entries.
//!
//! Both directions walk the node tree depth-first with a forward-only
//! [`BitCursor`]. Every node advances the cursor by exactly its width, whether
//! or not it produced (or consumed) an entry, so sibling positions never
//! depend on which fields were active.
//!
//! - [`decode`]: structure → entries. Inactive fields, padding, empty texts
//!   and empty blocks are omitted. A value with no textual form is emitted as
//!   an empty scalar.
//! - [`encode`] / [`encode_into`]: entries → structure. Absent keys leave
//!   their bits untouched. A token that fails to parse is recorded as a
//!   [`FieldIssue`] and its field zero-filled; the rest of the structure is
//!   still read. [`encode_strict`] rejects the structure instead.

use tracing::debug;

use crate::{
    bits,
    compiled::Layout,
    cursor::BitCursor,
    errors::{DecodeError, WalkError},
    schema::{FieldContext, Frame, IndexKey, Node, NodeKind},
    text::{self, Entry, EntryValue, TextWriter},
};

/// A field whose token was rejected while reading text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path using text keys (`switchConfig.SC.type`).
    pub path: String,
    pub error: DecodeError,
}

/// Result of reading entries into a fresh structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub issues: Vec<FieldIssue>,
}

/// Structure → text entries.
pub fn decode(layout: &Layout, data: &[u8]) -> Result<Vec<Entry>, WalkError> {
    check_size(layout, data.len())?;
    let mut walk = Walk::new(layout, false);
    walk.decode_struct(layout.nodes(), data)
}

/// Text entries → zero-initialized structure.
pub fn encode(layout: &Layout, entries: &[Entry]) -> Result<Encoded, WalkError> {
    let mut bytes = layout.zeroed();
    let issues = encode_into(layout, entries, &mut bytes)?;
    Ok(Encoded { bytes, issues })
}

/// Text entries → an existing structure. Fields without an entry keep their
/// current bits.
pub fn encode_into(layout: &Layout, entries: &[Entry], data: &mut [u8]) -> Result<Vec<FieldIssue>, WalkError> {
    check_size(layout, data.len())?;
    let mut walk = Walk::new(layout, false);
    walk.encode_struct(layout.nodes(), entries, data)?;
    Ok(walk.issues)
}

/// Like [`encode`], but any rejected token fails the whole structure.
pub fn encode_strict(layout: &Layout, entries: &[Entry]) -> Result<Vec<u8>, WalkError> {
    let mut bytes = layout.zeroed();
    let mut walk = Walk::new(layout, true);
    walk.encode_struct(layout.nodes(), entries, &mut bytes)?;
    Ok(bytes)
}

/// Decodes `data` and streams it through `out`.
pub fn write_text<W: TextWriter + ?Sized>(layout: &Layout, data: &[u8], out: &mut W) -> Result<(), WalkError> {
    let entries = decode(layout, data)?;
    text::write_entries(&entries, out)?;
    Ok(())
}

/// Parses YAML text and reads it into a fresh structure.
pub fn read_text(layout: &Layout, input: &str) -> Result<Encoded, WalkError> {
    encode(layout, &text::parse(input)?)
}

fn check_size(layout: &Layout, found: usize) -> Result<(), WalkError> {
    if found != layout.size_bytes() {
        return Err(WalkError::BufferSize {
            expected: layout.size_bytes(),
            found,
        });
    }
    Ok(())
}

struct Walk<'l> {
    layout: &'l Layout,
    cursor: BitCursor,
    frames: Vec<Frame>,
    indices: Vec<usize>,
    path: Vec<String>,
    strict: bool,
    issues: Vec<FieldIssue>,
}

impl<'l> Walk<'l> {
    fn new(layout: &'l Layout, strict: bool) -> Self {
        Self {
            layout,
            cursor: BitCursor::new(layout.bit_len()),
            frames: Vec::new(),
            indices: Vec::new(),
            path: Vec::new(),
            strict,
            issues: Vec::new(),
        }
    }

    fn ctx(&self, bits: usize) -> FieldContext<'_> {
        FieldContext {
            layout: Some(self.layout),
            frames: &self.frames,
            indices: &self.indices,
            bit_pos: self.cursor.position(),
            bits,
        }
    }

    fn decode_struct(&mut self, nodes: &'static [Node], data: &[u8]) -> Result<Vec<Entry>, WalkError> {
        self.frames.push(Frame {
            nodes,
            start: self.cursor.position(),
        });

        let mut entries = Vec::new();
        for node in nodes {
            if let Some(value) = self.decode_node(node, data)? {
                entries.push(Entry {
                    key: node.name.to_string(),
                    value,
                });
            }
        }

        self.frames.pop();
        Ok(entries)
    }

    fn decode_node(&mut self, node: &'static Node, data: &[u8]) -> Result<Option<EntryValue>, WalkError> {
        let start = self.cursor.position();
        let width = node.bit_len();

        // Array predicates apply per element.
        let is_array = matches!(node.kind, NodeKind::Array { .. });
        if let Some(active) = node.active.filter(|_| !is_array) {
            if !active(&self.ctx(width), data) {
                self.cursor.advance(width)?;
                return Ok(None);
            }
        }

        let value = match node.kind {
            NodeKind::Scalar { bits, transcode } => {
                let raw = self.cursor.read_raw(data, bits)?;
                let token = transcode.encode(&self.ctx(bits), raw);
                Some(EntryValue::Scalar(token.unwrap_or_default()))
            }
            NodeKind::Text { len } => {
                let value = bits::read_text_at(data, start, len)?;
                (!value.is_empty()).then_some(EntryValue::Scalar(value))
            }
            NodeKind::Struct(children) => {
                let entries = self.decode_struct(children, data)?;
                (!entries.is_empty()).then_some(EntryValue::Block(entries))
            }
            NodeKind::Array { count, elem, index } => {
                let entries = self.decode_array(node, count, elem, index, data)?;
                (!entries.is_empty()).then_some(EntryValue::Block(entries))
            }
            NodeKind::Union { select, branches } => {
                let choice = select(&self.ctx(width), data);
                match branches.get(choice) {
                    Some(branch) => self
                        .decode_node(branch, data)?
                        .map(|value| EntryValue::Block(vec![Entry { key: branch.name.to_string(), value }])),
                    None => None,
                }
            }
            NodeKind::Custom { bits, codec } => codec.write(&self.ctx(bits), data).map(EntryValue::Scalar),
            NodeKind::Padding { .. } => None,
        };

        self.cursor.seek(start + width)?;
        Ok(value)
    }

    fn decode_array(
        &mut self,
        node: &'static Node,
        count: usize,
        elem: &'static Node,
        index: IndexKey,
        data: &[u8],
    ) -> Result<Vec<Entry>, WalkError> {
        let stride = elem.bit_len();
        let mut entries = Vec::new();

        for i in 0..count {
            self.indices.push(i);
            let active = node.active.is_none_or(|active| active(&self.ctx(stride), data));
            let value = if active {
                self.decode_node(elem, data)?
            } else {
                self.cursor.advance(stride)?;
                None
            };
            self.indices.pop();

            if let (Some(value), Some(key)) = (value, index.format(i)) {
                entries.push(Entry { key, value });
            }
        }

        Ok(entries)
    }

    fn encode_struct(&mut self, nodes: &'static [Node], entries: &[Entry], data: &mut [u8]) -> Result<(), WalkError> {
        for entry in entries {
            if !nodes.iter().any(|n| !n.name.is_empty() && n.name == entry.key) {
                debug!(key = %entry.key, path = %self.path.join("."), "ignoring unknown key");
            }
        }

        self.frames.push(Frame {
            nodes,
            start: self.cursor.position(),
        });

        for node in nodes {
            let value = match node.name {
                "" => None,
                name => text::find(entries, name).map(|e| &e.value),
            };
            self.path.push(node.name.to_string());
            self.encode_node(node, value, data)?;
            self.path.pop();
        }

        self.frames.pop();
        Ok(())
    }

    fn encode_node(&mut self, node: &'static Node, value: Option<&EntryValue>, data: &mut [u8]) -> Result<(), WalkError> {
        let start = self.cursor.position();
        let width = node.bit_len();

        match (node.kind, value) {
            (_, None) | (NodeKind::Padding { .. }, _) => {}
            // A bare `key:` means "no value" for any kind.
            (_, Some(EntryValue::Scalar(token))) if token.is_empty() => {}

            (NodeKind::Scalar { bits, transcode }, Some(EntryValue::Scalar(token))) => {
                let decoded = transcode.decode(&self.ctx(bits), token);
                match decoded {
                    Ok(raw) => self.cursor.write_raw(data, bits, raw)?,
                    Err(error) => self.reject(error, start, width, data)?,
                }
            }
            (NodeKind::Text { len }, Some(EntryValue::Scalar(token))) => {
                if bits::is_latin1(token) {
                    bits::write_text_at(data, start, len, token)?;
                } else {
                    self.reject(DecodeError::InvalidText(token.clone()), start, width, data)?;
                }
            }
            (NodeKind::Custom { bits, codec }, Some(EntryValue::Scalar(token))) => {
                let result = codec.read(&self.ctx(bits), data, token);
                if let Err(error) = result {
                    self.reject(error, start, width, data)?;
                }
            }
            (NodeKind::Struct(children), Some(EntryValue::Block(entries))) => {
                self.encode_struct(children, entries, data)?;
            }
            (NodeKind::Array { count, elem, index }, Some(EntryValue::Block(entries))) => {
                self.encode_array(count, elem, index, entries, data)?;
            }
            (NodeKind::Union { select, branches }, Some(EntryValue::Block(entries))) => {
                let choice = select(&self.ctx(width), data);
                if let Some(branch) = branches.get(choice) {
                    let value = text::find(entries, branch.name).map(|e| &e.value);
                    self.path.push(branch.name.to_string());
                    self.encode_node(branch, value, data)?;
                    self.path.pop();
                }
            }

            (NodeKind::Struct(_) | NodeKind::Array { .. } | NodeKind::Union { .. }, Some(EntryValue::Scalar(_))) => {
                self.reject(DecodeError::ExpectedBlock, start, width, data)?;
            }
            (_, Some(EntryValue::Block(_))) => {
                self.reject(DecodeError::ExpectedScalar, start, width, data)?;
            }
        }

        self.cursor.seek(start + width)?;
        Ok(())
    }

    fn encode_array(
        &mut self,
        count: usize,
        elem: &'static Node,
        index: IndexKey,
        entries: &[Entry],
        data: &mut [u8],
    ) -> Result<(), WalkError> {
        // Keys may arrive in any order; the cursor only moves forward.
        let mut slots: Vec<Option<&Entry>> = vec![None; count];
        for entry in entries {
            match index.parse(&entry.key) {
                Some(i) if i < count => slots[i] = Some(entry),
                _ => debug!(key = %entry.key, path = %self.path.join("."), "ignoring unknown array key"),
            }
        }

        for (i, slot) in slots.into_iter().enumerate() {
            self.indices.push(i);
            self.path.push(slot.map_or_else(|| i.to_string(), |e| e.key.clone()));
            self.encode_node(elem, slot.map(|e| &e.value), data)?;
            self.path.pop();
            self.indices.pop();
        }

        Ok(())
    }

    fn reject(&mut self, error: DecodeError, start: usize, width: usize, data: &mut [u8]) -> Result<(), WalkError> {
        let path = self.path.iter().filter(|p| !p.is_empty()).cloned().collect::<Vec<_>>().join(".");
        if self.strict {
            return Err(WalkError::Rejected { path, source: error });
        }

        debug!(%path, %error, "field zero-filled");
        bits::clear_bits(data, start, width)?;
        self.issues.push(FieldIssue { path, error });
        Ok(())
    }
}
