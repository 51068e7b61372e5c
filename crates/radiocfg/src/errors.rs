//! Error types for schema compilation, bit access, token decoding and traversal.

use thiserror::Error;

/// Errors produced when compiling a schema tree into a [crate::compiled::Layout].
///
/// Every variant is a schema/structure drift bug, never a data problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Scalar width is 0 or greater than 64 bits, or a text field has no characters.
    #[error("field `{0}` has an invalid bit width")]
    InvalidFieldSize(&'static str),
    /// Array repeat count is zero.
    #[error("array `{0}` has a zero repeat count")]
    InvalidRepeatCount(&'static str),
    /// Union has no branches, or a branch is not a struct.
    #[error("union `{0}` has an invalid branch list")]
    InvalidUnion(&'static str),
    /// Two siblings share a name.
    #[error("field name `{0}` appears twice in one struct")]
    DuplicateFieldName(&'static str),
    /// Summed node widths differ from the declared structure size.
    #[error("layout `{name}` declares {declared_bits} bits but its schema spans {schema_bits}")]
    SizeMismatch {
        name: &'static str,
        declared_bits: usize,
        schema_bits: usize,
    },
}

/// Errors produced when reading or writing bits in a byte slice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    /// Requested bit range is beyond the end of the data.
    #[error("bit range {bit_pos}+{len} exceeds {available} available bits")]
    OutOfBounds {
        bit_pos: usize,
        len: usize,
        available: usize,
    },
    /// More than 64 bits were requested in a single access.
    #[error("cannot access {0} bits at once")]
    TooManyBits(usize),
    /// A cursor was asked to move backwards.
    #[error("cursor cannot rewind from bit {from} to bit {to}")]
    Rewind { from: usize, to: usize },
}

/// A single text token could not be turned into a raw field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("`{0}` is not an integer")]
    InvalidNumber(String),
    #[error("`{name}` is not a member of {table}")]
    UnknownName { table: &'static str, name: String },
    #[error("`{0}` is not a valid reference")]
    InvalidReference(String),
    /// A text field holds one byte per character.
    #[error("`{0}` has characters outside Latin-1")]
    InvalidText(String),
    #[error("expected a plain value")]
    ExpectedScalar,
    #[error("expected a nested block")]
    ExpectedBlock,
    #[error(transparent)]
    Bits(#[from] BitError),
}

/// Fatal traversal errors. A walk that fails is abandoned as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("cursor overrun: {0}")]
    Overrun(#[from] BitError),
    #[error("buffer holds {found} bytes, layout expects {expected}")]
    BufferSize { expected: usize, found: usize },
    #[error("rejected `{path}`: {source}")]
    Rejected { path: String, source: DecodeError },
    #[error(transparent)]
    Text(#[from] TextError),
}

/// Raw field access by path failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("no field `{path}` in layout `{layout}`")]
    Unknown { path: String, layout: &'static str },
    #[error(transparent)]
    Bits(#[from] BitError),
}

/// Malformed YAML, a document of the wrong shape, or the text sink refused
/// a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    /// The document, or the block at this path, is not a mapping.
    #[error("expected a mapping at `{0}`")]
    ExpectedMapping(String),
    #[error("a key under `{0}` is not a scalar")]
    InvalidKey(String),
    /// Tagged values have no entry form.
    #[error("unsupported value at `{0}`")]
    Unsupported(String),
    #[error("cannot render entries: {0}")]
    Render(String),
    #[error("text sink refused output")]
    WriterFailed,
}
