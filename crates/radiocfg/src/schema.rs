//! Schema trees: ordered field descriptors mirroring a packed structure.
//!
//! A schema is a `static` slice of [`Node`]s. Node widths, including nested
//! groups, arrays and unions, concatenate to exactly the structure's layout;
//! nothing else records where a field lives.

use std::fmt;

use crate::{
    bits,
    compiled::{Layout, Span},
    enums::EnumTable,
    errors::{BitError, DecodeError},
    transform::{Transcode, Transcoder, Transform},
};

/// Decides whether a field (or array element) is present in the text form.
pub type Predicate = fn(&FieldContext<'_>, &[u8]) -> bool;

/// Picks the valid branch of a union from already-traversed bits.
pub type Selector = fn(&FieldContext<'_>, &[u8]) -> usize;

/// Cross-field custom codec. Unlike a [`Transcoder`] it sees the whole buffer,
/// so it can store its text somewhere other than its own bits.
pub trait FieldCodec: Sync {
    fn read(&self, ctx: &FieldContext<'_>, data: &mut [u8], text: &str) -> Result<(), DecodeError>;

    /// `None` omits the key.
    fn write(&self, ctx: &FieldContext<'_>, data: &[u8]) -> Option<String>;
}

/// Maps array slots to custom text keys.
pub trait IndexCodec: Sync {
    fn parse(&self, key: &str) -> Option<usize>;
    fn format(&self, index: usize) -> Option<String>;
}

/// How array elements are keyed in the text form.
#[derive(Clone, Copy)]
pub enum IndexKey {
    /// Zero-based slot number.
    Position,
    Custom(&'static dyn IndexCodec),
}

impl IndexKey {
    pub fn parse(&self, key: &str) -> Option<usize> {
        match self {
            IndexKey::Position => key.trim().parse().ok(),
            IndexKey::Custom(codec) => codec.parse(key.trim()),
        }
    }

    pub fn format(&self, index: usize) -> Option<String> {
        match self {
            IndexKey::Position => Some(index.to_string()),
            IndexKey::Custom(codec) => codec.format(index),
        }
    }
}

#[derive(Clone, Copy)]
pub enum NodeKind {
    Scalar { bits: usize, transcode: Transcode },
    /// NUL-padded characters, 8 bits each.
    Text { len: usize },
    Struct(&'static [Node]),
    Array {
        count: usize,
        elem: &'static Node,
        index: IndexKey,
    },
    /// Branches are struct nodes sharing the same bits; the union is as wide as
    /// its widest branch.
    Union {
        select: Selector,
        branches: &'static [Node],
    },
    Custom {
        bits: usize,
        codec: &'static dyn FieldCodec,
    },
    /// Never emitted or read. Named padding still addresses data (see
    /// [`Layout::locate`]).
    Padding { bits: usize },
}

/// One field descriptor.
#[derive(Clone, Copy)]
pub struct Node {
    pub name: &'static str,
    pub kind: NodeKind,
    /// For arrays the predicate is evaluated per element.
    pub active: Option<Predicate>,
}

impl Node {
    pub const fn scalar(name: &'static str, bits: usize, transcode: Transcode) -> Self {
        Self {
            name,
            kind: NodeKind::Scalar { bits, transcode },
            active: None,
        }
    }

    pub const fn uint(name: &'static str, bits: usize) -> Self {
        Self::scalar(name, bits, Transcode::Int(Transform::unsigned()))
    }

    pub const fn int(name: &'static str, bits: usize) -> Self {
        Self::scalar(name, bits, Transcode::Int(Transform::signed()))
    }

    pub const fn transformed(name: &'static str, bits: usize, transform: Transform) -> Self {
        Self::scalar(name, bits, Transcode::Int(transform))
    }

    pub const fn enumerated(name: &'static str, bits: usize, table: &'static EnumTable) -> Self {
        Self::transformed(name, bits, Transform::unsigned().with_enum(table))
    }

    pub const fn reference(name: &'static str, bits: usize, transcoder: &'static dyn Transcoder) -> Self {
        Self::scalar(name, bits, Transcode::Ref(transcoder))
    }

    pub const fn text(name: &'static str, len: usize) -> Self {
        Self {
            name,
            kind: NodeKind::Text { len },
            active: None,
        }
    }

    pub const fn group(name: &'static str, children: &'static [Node]) -> Self {
        Self {
            name,
            kind: NodeKind::Struct(children),
            active: None,
        }
    }

    pub const fn array(name: &'static str, count: usize, elem: &'static Node) -> Self {
        Self {
            name,
            kind: NodeKind::Array {
                count,
                elem,
                index: IndexKey::Position,
            },
            active: None,
        }
    }

    pub const fn union(name: &'static str, select: Selector, branches: &'static [Node]) -> Self {
        Self {
            name,
            kind: NodeKind::Union { select, branches },
            active: None,
        }
    }

    pub const fn custom(name: &'static str, bits: usize, codec: &'static dyn FieldCodec) -> Self {
        Self {
            name,
            kind: NodeKind::Custom { bits, codec },
            active: None,
        }
    }

    pub const fn padding(bits: usize) -> Self {
        Self::reserved("", bits)
    }

    /// Padding that still owns data other fields refer to.
    pub const fn reserved(name: &'static str, bits: usize) -> Self {
        Self {
            name,
            kind: NodeKind::Padding { bits },
            active: None,
        }
    }

    pub const fn when(self, predicate: Predicate) -> Self {
        Self {
            active: Some(predicate),
            ..self
        }
    }

    /// Keys array elements with a custom index codec. No effect on other kinds.
    pub const fn keyed(self, codec: &'static dyn IndexCodec) -> Self {
        match self.kind {
            NodeKind::Array { count, elem, .. } => Self {
                kind: NodeKind::Array {
                    count,
                    elem,
                    index: IndexKey::Custom(codec),
                },
                ..self
            },
            _ => self,
        }
    }

    /// Width of this node, summed over children.
    pub fn bit_len(&self) -> usize {
        match self.kind {
            NodeKind::Scalar { bits, .. }
            | NodeKind::Custom { bits, .. }
            | NodeKind::Padding { bits } => bits,
            NodeKind::Text { len } => len * 8,
            NodeKind::Struct(children) => struct_bit_len(children),
            NodeKind::Array { count, elem, .. } => count * elem.bit_len(),
            NodeKind::Union { branches, .. } => {
                branches.iter().map(Node::bit_len).max().unwrap_or(0)
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("bits", &self.bit_len())
            .finish()
    }
}

pub fn struct_bit_len(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::bit_len).sum()
}

/// Offset of the child `name` relative to the start of the struct `nodes`.
pub fn member_span(nodes: &[Node], name: &str) -> Option<Span> {
    let mut offset = 0;
    for node in nodes {
        let bits = node.bit_len();
        if node.name == name {
            return Some(Span { offset, bits });
        }
        offset += bits;
    }
    None
}

/// A struct being traversed, and where it starts.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub nodes: &'static [Node],
    pub start: usize,
}

/// Typed traversal context handed to predicates, selectors and custom codecs:
/// the current field position, the enclosing structs, and the repetition
/// index stack.
#[derive(Clone, Copy)]
pub struct FieldContext<'a> {
    pub(crate) layout: Option<&'a Layout>,
    pub(crate) frames: &'a [Frame],
    pub(crate) indices: &'a [usize],
    pub(crate) bit_pos: usize,
    pub(crate) bits: usize,
}

impl FieldContext<'static> {
    /// A context for a field of `bits` outside any traversal.
    pub fn detached(bits: usize) -> Self {
        Self {
            layout: None,
            frames: &[],
            indices: &[],
            bit_pos: 0,
            bits,
        }
    }
}

impl<'a> FieldContext<'a> {
    /// Same position, different width.
    pub fn with_width(&self, bits: usize) -> Self {
        Self { bits, ..*self }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Absolute bit offset of the current field.
    pub fn bit_offset(&self) -> usize {
        self.bit_pos
    }

    pub fn byte_offset(&self) -> usize {
        self.bit_pos / 8
    }

    pub fn layout(&self) -> Option<&'a Layout> {
        self.layout
    }

    /// Repetition indices, outermost first.
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    /// Repetition index `level` steps out from the innermost array.
    pub fn index(&self, level: usize) -> Option<usize> {
        self.indices
            .len()
            .checked_sub(level + 1)
            .map(|i| self.indices[i])
    }

    /// Absolute span of a sibling in the innermost enclosing struct.
    pub fn sibling(&self, name: &str) -> Option<Span> {
        let frame = self.frames.last()?;
        member_span(frame.nodes, name).map(|span| span.shifted(frame.start))
    }

    pub fn sibling_value(&self, data: &[u8], name: &str) -> Option<u64> {
        let span = self.sibling(name)?;
        bits::read_bits_at(data, span.offset, span.bits).ok()
    }

    /// Reads member `name` of a struct `nodes` that starts at the current field.
    pub fn member_value(&self, data: &[u8], nodes: &[Node], name: &str) -> Option<u64> {
        let span = member_span(nodes, name)?.shifted(self.bit_pos);
        bits::read_bits_at(data, span.offset, span.bits).ok()
    }

    /// Absolute span of a field addressed by its dotted path from the root.
    pub fn locate(&self, path: &str) -> Option<Span> {
        self.layout?.locate(path)
    }

    /// Whether the current field's bits are all clear.
    pub fn is_zero(&self, data: &[u8]) -> Result<bool, BitError> {
        bits::is_zero(data, self.bit_pos, self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PAIR: [Node; 3] = [Node::uint("a", 3), Node::padding(5), Node::int("b", 8)];
    static ELEM: Node = Node::group("", &PAIR);
    static ROOT: [Node; 2] = [Node::text("name", 2), Node::array("pairs", 4, &ELEM)];

    fn pick(_: &FieldContext<'_>, _: &[u8]) -> usize {
        0
    }

    static WIDE: [Node; 1] = [Node::uint("x", 12)];
    static NARROW: [Node; 1] = [Node::uint("y", 4)];
    static BRANCHES: [Node; 2] = [Node::group("wide", &WIDE), Node::group("narrow", &NARROW)];

    #[test]
    fn test_bit_len() {
        assert_eq!(ELEM.bit_len(), 16);
        assert_eq!(struct_bit_len(&ROOT), 16 + 64);
        assert_eq!(Node::union("u", pick, &BRANCHES).bit_len(), 12);
    }

    #[test]
    fn test_member_span() {
        assert_eq!(member_span(&PAIR, "b"), Some(Span { offset: 8, bits: 8 }));
        assert_eq!(member_span(&PAIR, "c"), None);
    }

    #[test]
    fn test_context_indices() {
        let indices = [2, 5];
        let ctx = FieldContext {
            layout: None,
            frames: &[],
            indices: &indices,
            bit_pos: 16,
            bits: 8,
        };
        assert_eq!(ctx.index(0), Some(5));
        assert_eq!(ctx.index(1), Some(2));
        assert_eq!(ctx.index(2), None);
        assert_eq!(ctx.byte_offset(), 2);
    }

    #[test]
    fn test_context_sibling_value() {
        let frames = [Frame {
            nodes: &PAIR,
            start: 8,
        }];
        let ctx = FieldContext {
            layout: None,
            frames: &frames,
            indices: &[],
            bit_pos: 16,
            bits: 8,
        };
        let data = [0x00, 0b0000_0101, 0x7F, 0x00];
        assert_eq!(ctx.sibling_value(&data, "a"), Some(5));
        assert_eq!(ctx.sibling_value(&data, "b"), Some(0x7F));
        assert_eq!(ctx.member_value(&data, &WIDE, "x"), Some(0x7F));
    }
}
