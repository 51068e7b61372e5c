//! Low-level bit read and write utilities for byte slices.
//!
//! Bits are addressed LSB-first: bit 0 is the low bit of the first byte, and a
//! field spanning several bytes is little-endian. This is the layout a
//! little-endian compiler gives packed bit-fields.

use crate::errors::BitError;

fn check_range(data_len: usize, bit_pos: usize, n: usize) -> Result<(), BitError> {
    let available = data_len * 8;
    if bit_pos.checked_add(n).is_none_or(|end| end > available) {
        return Err(BitError::OutOfBounds {
            bit_pos,
            len: n,
            available,
        });
    }

    Ok(())
}

/// Reads a single bit at `bit_pos`. Returns 0 or 1.
pub fn read_bit_at(data: &[u8], bit_pos: usize) -> Result<u8, BitError> {
    check_range(data.len(), bit_pos, 1)?;

    Ok((data[bit_pos / 8] >> (bit_pos % 8)) & 1)
}

/// Reads `n` bits starting at `bit_pos` as an unsigned value (max 64 bits).
pub fn read_bits_at(data: &[u8], bit_pos: usize, n: usize) -> Result<u64, BitError> {
    if n > 64 {
        return Err(BitError::TooManyBits(n));
    }
    check_range(data.len(), bit_pos, n)?;

    let mut value = 0u64;
    for i in 0..n {
        let pos = bit_pos + i;
        let bit = (data[pos / 8] >> (pos % 8)) & 1;
        value |= u64::from(bit) << i;
    }

    Ok(value)
}

/// Writes the low `n` bits of `value` starting at `bit_pos` (max 64 bits).
pub fn write_bits_at(data: &mut [u8], bit_pos: usize, n: usize, value: u64) -> Result<(), BitError> {
    if n > 64 {
        return Err(BitError::TooManyBits(n));
    }
    check_range(data.len(), bit_pos, n)?;

    for i in 0..n {
        let pos = bit_pos + i;
        let mask = 1u8 << (pos % 8);
        if (value >> i) & 1 == 1 {
            data[pos / 8] |= mask;
        } else {
            data[pos / 8] &= !mask;
        }
    }

    Ok(())
}

/// Copies `len` bits from `src` at `src_pos` into `dst` at `dst_pos`.
pub fn copy_bits(
    src: &[u8],
    src_pos: usize,
    dst: &mut [u8],
    dst_pos: usize,
    len: usize,
) -> Result<(), BitError> {
    check_range(src.len(), src_pos, len)?;
    check_range(dst.len(), dst_pos, len)?;

    let mut done = 0;
    while done < len {
        let chunk = (len - done).min(64);
        let value = read_bits_at(src, src_pos + done, chunk)?;
        write_bits_at(dst, dst_pos + done, chunk, value)?;
        done += chunk;
    }

    Ok(())
}

/// Clears `len` bits starting at `bit_pos`.
pub fn clear_bits(data: &mut [u8], bit_pos: usize, len: usize) -> Result<(), BitError> {
    check_range(data.len(), bit_pos, len)?;

    let mut done = 0;
    while done < len {
        let chunk = (len - done).min(64);
        write_bits_at(data, bit_pos + done, chunk, 0)?;
        done += chunk;
    }

    Ok(())
}

/// True when every bit in the range is clear.
pub fn is_zero(data: &[u8], bit_pos: usize, len: usize) -> Result<bool, BitError> {
    check_range(data.len(), bit_pos, len)?;

    let mut done = 0;
    while done < len {
        let chunk = (len - done).min(64);
        if read_bits_at(data, bit_pos + done, chunk)? != 0 {
            return Ok(false);
        }
        done += chunk;
    }

    Ok(true)
}

/// Reads a NUL-padded text field of `len` characters. Each byte is one
/// Latin-1 character; trailing spaces are dropped.
pub fn read_text_at(data: &[u8], bit_pos: usize, len: usize) -> Result<String, BitError> {
    let mut out = String::with_capacity(len);
    for i in 0..len {
        let byte = read_bits_at(data, bit_pos + i * 8, 8)? as u8;
        if byte == 0 {
            break;
        }
        out.push(char::from(byte));
    }

    Ok(out.trim_end_matches(' ').to_string())
}

/// Whether every character of `text` fits a text field byte.
pub fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| u8::try_from(c).is_ok())
}

/// Writes `text` into a text field of `len` characters, truncating and NUL
/// padding. The inverse of [`read_text_at`]; characters beyond Latin-1 are
/// stored as `?`.
pub fn write_text_at(data: &mut [u8], bit_pos: usize, len: usize, text: &str) -> Result<(), BitError> {
    let mut bytes = text.chars().map(|c| u8::try_from(c).unwrap_or(b'?'));
    for i in 0..len {
        let byte = bytes.next().unwrap_or(0);
        write_bits_at(data, bit_pos + i * 8, 8, u64::from(byte))?;
    }

    Ok(())
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    if bits == 0 {
        return 0;
    }
    let shift = 64 - bits.min(64);
    ((value << shift) as i64) >> shift
}

/// Keeps the low `bits` of a two's-complement value.
pub fn truncate(value: i64, bits: usize) -> u64 {
    if bits >= 64 {
        value as u64
    } else {
        (value as u64) & ((1u64 << bits) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bit_at() {
        let data = [0b0000_0001];
        assert_eq!(read_bit_at(&data, 0).unwrap(), 1);
        assert_eq!(read_bit_at(&data, 7).unwrap(), 0);
    }

    #[test]
    fn test_read_bits_at() {
        let data = [0b1010_1100, 0b0000_0011];
        assert_eq!(read_bits_at(&data, 2, 2).unwrap(), 0b11);
        assert_eq!(read_bits_at(&data, 4, 6).unwrap(), 0b11_1010);
        assert_eq!(read_bits_at(&data, 0, 16).unwrap(), 0x03AC);
    }

    #[test]
    fn test_read_bits_out_of_bounds() {
        let data = [0xFF];
        assert_eq!(
            read_bits_at(&data, 0, 9).unwrap_err(),
            BitError::OutOfBounds {
                bit_pos: 0,
                len: 9,
                available: 8
            }
        );
    }

    #[test]
    fn test_read_bits_more_than_64() {
        let data = [0u8; 16];
        assert_eq!(
            read_bits_at(&data, 0, 65).unwrap_err(),
            BitError::TooManyBits(65)
        );
    }

    #[test]
    fn test_write_bits_preserves_neighbours() {
        let mut data = [0xFF, 0xFF];
        write_bits_at(&mut data, 3, 7, 0).unwrap();
        assert_eq!(data, [0b0000_0111, 0b1111_1100]);

        write_bits_at(&mut data, 3, 7, 0b101_0101).unwrap();
        assert_eq!(read_bits_at(&data, 3, 7).unwrap(), 0b101_0101);
        assert_eq!(read_bits_at(&data, 0, 3).unwrap(), 0b111);
        assert_eq!(read_bits_at(&data, 10, 6).unwrap(), 0b11_1111);
    }

    #[test]
    fn test_copy_bits_longer_than_word() {
        let src: Vec<u8> = (0..20u8).collect();
        let mut dst = vec![0u8; 24];
        copy_bits(&src, 8, &mut dst, 12, 150).unwrap();
        for i in 0..150 {
            assert_eq!(
                read_bit_at(&src, 8 + i).unwrap(),
                read_bit_at(&dst, 12 + i).unwrap()
            );
        }
    }

    #[test]
    fn test_clear_bits() {
        let mut data = [0xFF; 10];
        clear_bits(&mut data, 4, 70).unwrap();
        assert_eq!(data[0], 0x0F);
        assert!(data[1..9].iter().all(|&b| b == 0));
        assert_eq!(data[9], 0xFC);
    }

    #[test]
    fn test_is_zero() {
        let data = [0x00, 0x10, 0x00];
        assert!(is_zero(&data, 0, 12).unwrap());
        assert!(!is_zero(&data, 0, 13).unwrap());
    }

    #[test]
    fn test_text_round_trip() {
        let mut data = [0xAAu8; 6];
        write_text_at(&mut data, 8, 4, "Rudder").unwrap();
        assert_eq!(&data, &[0xAA, b'R', b'u', b'd', b'd', 0xAA]);
        assert_eq!(read_text_at(&data, 8, 4).unwrap(), "Rudd");

        write_text_at(&mut data, 8, 4, "Ai").unwrap();
        assert_eq!(read_text_at(&data, 8, 4).unwrap(), "Ai");
        assert_eq!(data[4], 0);
    }

    #[test]
    fn test_text_keeps_every_byte() {
        for byte in 1..=255u8 {
            let stored = [b'a', byte, b'z'];
            let text = read_text_at(&stored, 0, 3).unwrap();
            assert!(is_latin1(&text));
            let mut data = [0u8; 3];
            write_text_at(&mut data, 0, 3, &text).unwrap();
            assert_eq!(data, stored, "byte {byte:#04x}");
        }
    }

    #[test]
    fn test_text_outside_latin1() {
        assert!(!is_latin1("\u{20ac}5"));
        let mut data = [0u8; 2];
        write_text_at(&mut data, 0, 2, "\u{20ac}5").unwrap();
        assert_eq!(data, [b'?', b'5']);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0b1111_1111, 8), -1);
        assert_eq!(sign_extend(0b011, 3), 3);
        assert_eq!(sign_extend(0b100, 3), -4);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(-1, 3), 0b111);
        assert_eq!(truncate(-90, 8), 166);
        assert_eq!(sign_extend(truncate(-90, 8), 8), -90);
    }
}
