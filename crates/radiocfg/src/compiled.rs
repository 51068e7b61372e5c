//! Compiled layouts: a validated schema tree bound to a structure size, with
//! every field flattened to a dotted path (`mixData.3.srcRaw`).

use std::collections::BTreeMap;

use crate::{
    bits,
    errors::{FieldError, SchemaError, WalkError},
    schema::{Node, NodeKind, struct_bit_len},
    text::Entry,
    walker::{self, Encoded},
};

/// A bit range inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub bits: usize,
}

impl Span {
    pub fn shifted(self, by: usize) -> Self {
        Self {
            offset: self.offset + by,
            ..self
        }
    }

    /// Span of slot `index` when this span holds `count` equal slots.
    pub fn element(self, index: usize, count: usize) -> Option<Self> {
        if count == 0 || index >= count {
            return None;
        }
        let bits = self.bits / count;
        Some(Self {
            offset: self.offset + index * bits,
            bits,
        })
    }
}

/// How a flattened leaf is interpreted when accessed by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Int { signed: bool },
    Text,
    /// Custom codecs, union bodies and named padding: raw bits only.
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledField {
    pub path: String,
    pub span: Span,
    pub kind: LeafKind,
    /// Set for fields inside a union branch, which overlap their siblings.
    pub overlay: bool,
}

/// A raw field value read by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    I64(i64),
    U64(u64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            Value::U64(v) => i64::try_from(*v).ok(),
            Value::Text(_) => None,
        }
    }
}

/// A compiled schema: its node tree, declared size and flattened fields.
#[derive(Debug)]
pub struct Layout {
    name: &'static str,
    nodes: &'static [Node],
    size_bytes: usize,
    /// Leaves in definition order.
    fields: Vec<CompiledField>,
    /// Every node, leaf or container, by path.
    spans: BTreeMap<String, usize>,
    all_spans: Vec<Span>,
}

impl Layout {
    /// Validates `nodes` and checks they span exactly `size_bytes`.
    pub fn compile(
        name: &'static str,
        nodes: &'static [Node],
        size_bytes: usize,
    ) -> Result<Self, SchemaError> {
        let mut compiler = Compiler::default();
        compiler.add_struct(nodes, "", 0, false)?;

        let schema_bits = struct_bit_len(nodes);
        if schema_bits != size_bytes * 8 {
            return Err(SchemaError::SizeMismatch {
                name,
                declared_bits: size_bytes * 8,
                schema_bits,
            });
        }

        Ok(Self {
            name,
            nodes,
            size_bytes,
            fields: compiler.fields,
            spans: compiler.spans,
            all_spans: compiler.all_spans,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn nodes(&self) -> &'static [Node] {
        self.nodes
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn bit_len(&self) -> usize {
        self.size_bytes * 8
    }

    pub fn zeroed(&self) -> Vec<u8> {
        vec![0; self.size_bytes]
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn field(&self, path: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Absolute span of any node, leaf or container.
    pub fn locate(&self, path: &str) -> Option<Span> {
        self.spans.get(path).map(|&i| self.all_spans[i])
    }

    fn leaf(&self, path: &str) -> Result<&CompiledField, FieldError> {
        self.field(path).ok_or_else(|| FieldError::Unknown {
            path: path.to_string(),
            layout: self.name,
        })
    }

    pub fn get(&self, data: &[u8], path: &str) -> Result<Value, FieldError> {
        let field = self.leaf(path)?;
        let span = field.span;
        Ok(match field.kind {
            LeafKind::Text => Value::Text(bits::read_text_at(data, span.offset, span.bits / 8)?),
            LeafKind::Int { signed: true } => {
                Value::I64(bits::sign_extend(bits::read_bits_at(data, span.offset, span.bits)?, span.bits))
            }
            LeafKind::Int { signed: false } | LeafKind::Opaque => {
                Value::U64(bits::read_bits_at(data, span.offset, span.bits)?)
            }
        })
    }

    /// Reads an integer leaf, sign-extended when the field is signed.
    pub fn get_int(&self, data: &[u8], path: &str) -> Result<i64, FieldError> {
        let field = self.leaf(path)?;
        let raw = bits::read_bits_at(data, field.span.offset, field.span.bits)?;
        Ok(match field.kind {
            LeafKind::Int { signed: true } => bits::sign_extend(raw, field.span.bits),
            _ => raw as i64,
        })
    }

    /// Writes an integer leaf, truncated to the field width.
    pub fn set_int(&self, data: &mut [u8], path: &str, value: i64) -> Result<(), FieldError> {
        let span = self.leaf(path)?.span;
        bits::write_bits_at(data, span.offset, span.bits, bits::truncate(value, span.bits))?;
        Ok(())
    }

    pub fn get_text(&self, data: &[u8], path: &str) -> Result<String, FieldError> {
        let span = self.leaf(path)?.span;
        Ok(bits::read_text_at(data, span.offset, span.bits / 8)?)
    }

    pub fn set_text(&self, data: &mut [u8], path: &str, text: &str) -> Result<(), FieldError> {
        let span = self.leaf(path)?.span;
        bits::write_text_at(data, span.offset, span.bits / 8, text)?;
        Ok(())
    }

    /// Copies every leaf `self` shares with `target` by path. Integers are
    /// re-truncated when widths differ; text and opaque fields copy their common
    /// prefix. Union overlays are skipped, the union body itself is copied.
    pub fn copy_common(&self, src: &[u8], target: &Layout, dst: &mut [u8]) -> Result<(), FieldError> {
        for field in self.fields.iter().filter(|f| !f.overlay) {
            let Some(to) = target.field(&field.path).filter(|f| !f.overlay) else {
                continue;
            };

            match (field.kind, to.kind) {
                (LeafKind::Int { .. }, LeafKind::Int { .. }) if field.span.bits != to.span.bits => {
                    let value = self.get_int(src, &field.path)?;
                    target.set_int(dst, &to.path, value)?;
                }
                _ => {
                    let len = field.span.bits.min(to.span.bits);
                    bits::copy_bits(src, field.span.offset, dst, to.span.offset, len)?;
                }
            }
        }

        Ok(())
    }

    /// Structure → text entries. See [`walker::decode`].
    pub fn decode(&self, data: &[u8]) -> Result<Vec<Entry>, WalkError> {
        walker::decode(self, data)
    }

    /// Text entries → zeroed structure. See [`walker::encode`].
    pub fn encode(&self, entries: &[Entry]) -> Result<Encoded, WalkError> {
        walker::encode(self, entries)
    }
}

#[derive(Default)]
struct Compiler {
    fields: Vec<CompiledField>,
    spans: BTreeMap<String, usize>,
    all_spans: Vec<Span>,
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

impl Compiler {
    fn record(&mut self, path: &str, span: Span) {
        if path.is_empty() {
            return;
        }
        self.all_spans.push(span);
        self.spans.insert(path.to_string(), self.all_spans.len() - 1);
    }

    fn leaf(&mut self, path: String, span: Span, kind: LeafKind, overlay: bool) {
        self.record(&path, span);
        self.fields.push(CompiledField {
            path,
            span,
            kind,
            overlay,
        });
    }

    fn add_struct(
        &mut self,
        nodes: &'static [Node],
        prefix: &str,
        start: usize,
        overlay: bool,
    ) -> Result<(), SchemaError> {
        let mut offset = start;
        for (i, node) in nodes.iter().enumerate() {
            if !node.name.is_empty() && nodes[..i].iter().any(|n| n.name == node.name) {
                return Err(SchemaError::DuplicateFieldName(node.name));
            }
            offset += self.add_node(node, &join(prefix, node.name), offset, overlay)?;
        }
        Ok(())
    }

    /// Returns the node's width.
    fn add_node(
        &mut self,
        node: &'static Node,
        path: &str,
        offset: usize,
        overlay: bool,
    ) -> Result<usize, SchemaError> {
        let bits = node.bit_len();
        let span = Span { offset, bits };

        match node.kind {
            NodeKind::Scalar { bits, transcode } => {
                if bits == 0 || bits > 64 {
                    return Err(SchemaError::InvalidFieldSize(node.name));
                }
                let kind = LeafKind::Int {
                    signed: transcode.is_signed(),
                };
                self.leaf(path.to_string(), span, kind, overlay);
            }
            NodeKind::Text { len } => {
                if len == 0 {
                    return Err(SchemaError::InvalidFieldSize(node.name));
                }
                self.leaf(path.to_string(), span, LeafKind::Text, overlay);
            }
            NodeKind::Struct(children) => {
                self.record(path, span);
                self.add_struct(children, path, offset, overlay)?;
            }
            NodeKind::Array { count, elem, .. } => {
                if count == 0 {
                    return Err(SchemaError::InvalidRepeatCount(node.name));
                }
                self.record(path, span);
                let stride = elem.bit_len();
                for i in 0..count {
                    let elem_path = join(path, &i.to_string());
                    let elem_path = if elem.name.is_empty() {
                        elem_path
                    } else {
                        join(&elem_path, elem.name)
                    };
                    self.add_node(elem, &elem_path, offset + i * stride, overlay)?;
                }
            }
            NodeKind::Union { branches, .. } => {
                if branches.is_empty()
                    || branches
                        .iter()
                        .any(|b| !matches!(b.kind, NodeKind::Struct(_)))
                {
                    return Err(SchemaError::InvalidUnion(node.name));
                }
                self.leaf(path.to_string(), span, LeafKind::Opaque, overlay);
                for branch in branches {
                    if let NodeKind::Struct(children) = branch.kind {
                        let branch_path = join(path, branch.name);
                        self.record(&branch_path, Span { offset, bits: branch.bit_len() });
                        self.add_struct(children, &branch_path, offset, true)?;
                    }
                }
            }
            NodeKind::Custom { .. } | NodeKind::Padding { .. } => {
                if !node.name.is_empty() && bits > 0 {
                    self.leaf(path.to_string(), span, LeafKind::Opaque, overlay);
                } else {
                    self.record(path, span);
                }
            }
        }

        Ok(bits)
    }
}
