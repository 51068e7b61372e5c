//! Forward-only position tracker used by the tree walker.

use crate::{bits, errors::BitError};

/// Bit position into a fixed-size buffer. Moves forward only; a new top-level
/// traversal starts from a fresh cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitCursor {
    pos: usize,
    limit: usize,
}

impl BitCursor {
    /// Creates a cursor at bit 0 of a buffer holding `limit` bits.
    pub fn new(limit: usize) -> Self {
        Self { pos: 0, limit }
    }

    /// Current absolute bit offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Byte offset containing the current bit.
    pub fn absolute_byte_offset(&self) -> usize {
        self.pos / 8
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    /// Moves forward by exactly `bits`.
    pub fn advance(&mut self, bits: usize) -> Result<(), BitError> {
        if bits > self.remaining() {
            return Err(BitError::OutOfBounds {
                bit_pos: self.pos,
                len: bits,
                available: self.limit,
            });
        }
        self.pos += bits;
        Ok(())
    }

    /// Moves forward to the absolute bit offset `to`.
    pub fn seek(&mut self, to: usize) -> Result<(), BitError> {
        if to < self.pos {
            return Err(BitError::Rewind { from: self.pos, to });
        }
        self.advance(to - self.pos)
    }

    /// Reads `bits` at the current position without advancing.
    pub fn read_raw(&self, data: &[u8], bits: usize) -> Result<u64, BitError> {
        self.check(bits)?;
        bits::read_bits_at(data, self.pos, bits)
    }

    /// Writes `bits` at the current position without advancing.
    pub fn write_raw(&self, data: &mut [u8], bits: usize, value: u64) -> Result<(), BitError> {
        self.check(bits)?;
        bits::write_bits_at(data, self.pos, bits, value)
    }

    fn check(&self, bits: usize) -> Result<(), BitError> {
        if bits > self.remaining() {
            return Err(BitError::OutOfBounds {
                bit_pos: self.pos,
                len: bits,
                available: self.limit,
            });
        }
        Ok(())
    }
}
