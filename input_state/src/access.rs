//! Reading and writing values at a state block.
//!
//! Every access is explicit offset arithmetic over a byte slice with a known
//! length. Multi-byte values are little-endian. Sub-byte fields go through
//! the pure mask/shift helpers in [`input::bits`], so writing one field
//! preserves its siblings in the shared byte.
//!
//! Two entry points:
//!
//! - [`try_read_value`] / [`try_write_value`] check the block against the
//!   slice and the format on every call.
//! - The crate-internal [`read_value`] / [`write_value`] back [`Control`]
//!   accessors, whose block was validated when the layout was built and
//!   whose buffer length was checked when the view was bound. Slice
//!   indexing still guards them; a violated layout invariant panics instead
//!   of touching memory it does not own.
//!
//! [`Control`]: crate::device::Control

use crate::block::StateBlock;
use crate::error::{StateError, StateResult};
use crate::format::FormatKind;
use crate::value::StateValue;
use input::bits;
use input::consts::MAX_VALUE_BITS;

/// Read the raw, right-aligned bits of `block`.
#[inline]
fn read_raw(bytes: &[u8], block: &StateBlock) -> u64 {
    let offset = block.byte_offset() as usize;
    if block.is_bit_packed() {
        u64::from(bits::read_bits(
            bytes,
            offset,
            block.bit_offset(),
            block.size_in_bits(),
        ))
    } else {
        let span = block.byte_span() as usize;
        let mut word = [0u8; (MAX_VALUE_BITS / 8) as usize];
        word[..span].copy_from_slice(&bytes[offset..offset + span]);
        u64::from_le_bytes(word)
    }
}

/// Store raw bits into `block`, read-modify-write for packed fields.
#[inline]
fn write_raw(bytes: &mut [u8], block: &StateBlock, raw: u64) {
    let offset = block.byte_offset() as usize;
    if block.is_bit_packed() {
        bits::write_bits(
            bytes,
            offset,
            block.bit_offset(),
            block.size_in_bits(),
            raw as u8,
        );
    } else {
        let span = block.byte_span() as usize;
        bytes[offset..offset + span].copy_from_slice(&raw.to_le_bytes()[..span]);
    }
}

#[inline]
pub(crate) fn read_value<T: StateValue>(bytes: &[u8], block: &StateBlock, kind: FormatKind) -> T {
    T::decode(kind, read_raw(bytes, block), block.size_in_bits())
}

#[inline]
pub(crate) fn write_value<T: StateValue>(
    bytes: &mut [u8],
    block: &StateBlock,
    kind: FormatKind,
    value: T,
) {
    write_raw(bytes, block, value.encode(kind, block.size_in_bits()));
}

/// Validate `block` for a buffer of `len` bytes and return its decode rule.
///
/// # Errors
/// - `StateError::UnknownFormat` if the format has no decode rule
/// - `StateError::MalformedBlock` if the width does not suit the format or a
///   packed field crosses a byte boundary
/// - `StateError::OutOfBounds` if the block ends past `len`
pub fn check_block(len: usize, block: &StateBlock) -> StateResult<FormatKind> {
    let kind = block.kind().ok_or(StateError::UnknownFormat {
        format: block.format(),
    })?;

    let packed_ok =
        !block.is_bit_packed() || bits::fits_in_byte(block.bit_offset(), block.size_in_bits());
    if !kind.accepts_size(block.size_in_bits()) || !packed_ok {
        return Err(StateError::MalformedBlock { block: *block });
    }

    let end = block.end_byte() as usize;
    if end > len {
        return Err(StateError::OutOfBounds { end, len });
    }
    Ok(kind)
}

/// Decode the value at `block` from `bytes`.
///
/// # Errors
/// See [`check_block`].
pub fn try_read_value<T: StateValue>(bytes: &[u8], block: &StateBlock) -> StateResult<T> {
    let kind = check_block(bytes.len(), block)?;
    Ok(read_value(bytes, block, kind))
}

/// Encode `value` into `bytes` at `block`.
///
/// Bytes outside the block, including sibling bits of a packed field, are
/// left unchanged.
///
/// # Errors
/// See [`check_block`]. Nothing is written on error.
pub fn try_write_value<T: StateValue>(
    bytes: &mut [u8],
    block: &StateBlock,
    value: T,
) -> StateResult<()> {
    let kind = check_block(bytes.len(), block)?;
    write_value(bytes, block, kind, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::StateFormat;

    #[test]
    fn int_is_little_endian() {
        let mut bytes = [0u8; 8];
        let block = StateBlock::new(StateFormat::INT, 2, 0, 32);
        try_write_value(&mut bytes, &block, 0x0102_0304i32).unwrap();
        assert_eq!(bytes, [0, 0, 0x04, 0x03, 0x02, 0x01, 0, 0]);
        assert_eq!(try_read_value::<i32>(&bytes, &block).unwrap(), 0x0102_0304);
    }

    #[test]
    fn packed_write_keeps_neighbours() {
        let mut bytes = [0b1000_0000u8; 1];
        let block = StateBlock::new(StateFormat::BIT, 0, 2, 3);
        try_write_value(&mut bytes, &block, 0b101u8).unwrap();
        assert_eq!(bytes[0], 0b1001_0100);
        assert_eq!(try_read_value::<u8>(&bytes, &block).unwrap(), 0b101);
    }

    #[test]
    fn out_of_bounds_is_reported_not_written() {
        let mut bytes = [0u8; 4];
        let block = StateBlock::new(StateFormat::INT, 2, 0, 32);
        assert_eq!(
            try_write_value(&mut bytes, &block, 7i32),
            Err(StateError::OutOfBounds { end: 6, len: 4 })
        );
        assert_eq!(bytes, [0; 4]);
    }

    #[test]
    fn malformed_blocks_are_rejected() {
        let bytes = [0u8; 8];
        let crossing = StateBlock::new(StateFormat::BIT, 0, 6, 4);
        assert!(matches!(
            try_read_value::<u8>(&bytes, &crossing),
            Err(StateError::MalformedBlock { .. })
        ));

        let wrong_width = StateBlock::new(StateFormat::INT, 0, 0, 16);
        assert!(matches!(
            try_read_value::<i32>(&bytes, &wrong_width),
            Err(StateError::MalformedBlock { .. })
        ));
    }

    #[test]
    fn unknown_format_has_no_decode_rule() {
        let bytes = [0u8; 8];
        let block = StateBlock::new(
            StateFormat::new(input::fourcc::FourCC::from_bytes(*b"VEC2")),
            0,
            0,
            64,
        );
        assert!(matches!(
            try_read_value::<f32>(&bytes, &block),
            Err(StateError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn double_round_trip() {
        let mut bytes = [0u8; 16];
        let block = StateBlock::new(StateFormat::DOUBLE, 8, 0, 64);
        try_write_value(&mut bytes, &block, -0.125f64).unwrap();
        assert_eq!(try_read_value::<f64>(&bytes, &block).unwrap(), -0.125);
    }
}
