//! Bit-packing helpers for sub-byte state fields.
//!
//! Packed controls (buttons, hat switches, small enums) share bytes with
//! their siblings. These helpers extract and insert a field of `size_in_bits`
//! bits starting at `bit_offset` within a single byte.
//!
//! ## Layout
//!
//! Bit 0 is the least significant bit of the byte. A field at
//! `bit_offset = 2, size_in_bits = 3` occupies mask `0b0001_1100`.
//!
//! A field must fit inside one byte: `bit_offset + size_in_bits <= 8`.
//! Cross-byte fields are rejected when the layout is built, so these
//! helpers only `debug_assert!` the precondition.
//!
//! All operations are pure mask/shift over values or byte slices.

use crate::consts::MAX_BIT_FIELD_BITS;

/// Right-aligned mask of `size_in_bits` ones (`1..=8`).
#[inline]
pub const fn mask(size_in_bits: u32) -> u8 {
    if size_in_bits >= MAX_BIT_FIELD_BITS {
        u8::MAX
    } else {
        ((1u16 << size_in_bits) - 1) as u8
    }
}

/// Whether a field at `bit_offset` of `size_in_bits` bits stays inside one byte.
#[inline]
pub const fn fits_in_byte(bit_offset: u32, size_in_bits: u32) -> bool {
    size_in_bits > 0 && bit_offset + size_in_bits <= MAX_BIT_FIELD_BITS
}

/// Extract a field from `byte`, right-aligned.
#[inline]
pub fn extract_bits(byte: u8, bit_offset: u32, size_in_bits: u32) -> u8 {
    debug_assert!(
        fits_in_byte(bit_offset, size_in_bits),
        "bit field {bit_offset}+{size_in_bits} crosses a byte boundary"
    );
    (byte >> bit_offset) & mask(size_in_bits)
}

/// Return `byte` with the field replaced by the low bits of `value`.
///
/// Bits outside the field are preserved. Excess high bits of `value`
/// are discarded.
#[inline]
pub fn insert_bits(byte: u8, bit_offset: u32, size_in_bits: u32, value: u8) -> u8 {
    debug_assert!(
        fits_in_byte(bit_offset, size_in_bits),
        "bit field {bit_offset}+{size_in_bits} crosses a byte boundary"
    );
    let field = mask(size_in_bits) << bit_offset;
    (byte & !field) | ((value << bit_offset) & field)
}

/// Read a bit field from `bytes[byte_offset]`.
///
/// # Panics
/// Panics if `byte_offset` is outside `bytes`.
#[inline]
pub fn read_bits(bytes: &[u8], byte_offset: usize, bit_offset: u32, size_in_bits: u32) -> u8 {
    extract_bits(bytes[byte_offset], bit_offset, size_in_bits)
}

/// Read-modify-write a bit field at `bytes[byte_offset]`, leaving sibling
/// bits of the same byte untouched.
///
/// # Panics
/// Panics if `byte_offset` is outside `bytes`.
#[inline]
pub fn write_bits(
    bytes: &mut [u8],
    byte_offset: usize,
    bit_offset: u32,
    size_in_bits: u32,
    value: u8,
) {
    let slot = &mut bytes[byte_offset];
    *slot = insert_bits(*slot, bit_offset, size_in_bits, value);
}

// ─── Tests ──────────────────────────────────────────────────────────
