//! Unsigned LEB128 varints as used for RowBinary string lengths.

use crate::render::error::{DecodeError, DecodeResult};

/// Longest valid encoding of a u64
pub const MAX_VARINT_LEN: usize = 10;

/// Decode one unsigned varint from the start of `buf`.
///
/// Returns the value and the number of bytes consumed. On truncation the
/// error carries the minimum number of bytes a complete encoding would
/// have needed.
pub fn read_uvarint(buf: &[u8]) -> DecodeResult<(u64, usize)> {
    let mut x: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(DecodeError::VarintOverflow { consumed: i + 1 });
        }
        if byte < 0x80 {
            // 10th byte may only carry the final bit of a u64
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(DecodeError::VarintOverflow { consumed: i + 1 });
            }
            return Ok((x | (byte as u64) << shift, i + 1));
        }
        x |= ((byte & 0x7f) as u64) << shift;
        shift += 7;
    }

    Err(DecodeError::VarintTruncated {
        consumed: buf.len() + 1,
    })
}

/// Append `value` to `buf` as an unsigned varint.
pub fn put_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Number of bytes `put_uvarint` would write for `value`.
pub fn uvarint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}
