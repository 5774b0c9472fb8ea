//! State block descriptors.
//!
//! A [`StateBlock`] says where one control's value lives inside its device's
//! state region and how it is encoded. Blocks are produced by the layout
//! builder and never change afterwards.

use crate::format::{FormatKind, StateFormat};
use serde::Serialize;
use std::fmt;

/// Location and encoding of one control's value.
///
/// Offsets are relative to the start of the device's state region. A bit
/// offset is always normalized below 8; `byte_offset` absorbs the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StateBlock {
    format: StateFormat,
    byte_offset: u32,
    bit_offset: u32,
    size_in_bits: u32,
}

impl StateBlock {
    /// Build a block, folding whole bytes of `bit_offset` into `byte_offset`.
    pub const fn new(format: StateFormat, byte_offset: u32, bit_offset: u32, size_in_bits: u32) -> Self {
        Self {
            format,
            byte_offset: byte_offset + bit_offset / 8,
            bit_offset: bit_offset % 8,
            size_in_bits,
        }
    }

    /// Like [`StateBlock::new`], but `None` when the block would end past
    /// `u32::MAX` bytes.
    pub fn checked(format: StateFormat, byte_offset: u32, bit_offset: u32, size_in_bits: u32) -> Option<Self> {
        let block = Self {
            format,
            byte_offset: byte_offset.checked_add(bit_offset / 8)?,
            bit_offset: bit_offset % 8,
            size_in_bits,
        };
        let span = block.bit_offset.checked_add(size_in_bits)?.div_ceil(8);
        block.byte_offset.checked_add(span)?;
        Some(block)
    }

    /// Value encoding tag.
    #[inline]
    pub const fn format(&self) -> StateFormat {
        self.format
    }

    /// Decode rule, if the format has one.
    #[inline]
    pub fn kind(&self) -> Option<FormatKind> {
        self.format.kind()
    }

    /// Byte offset from the start of the device state.
    #[inline]
    pub const fn byte_offset(&self) -> u32 {
        self.byte_offset
    }

    /// Bit offset within the first byte (`0..8`).
    #[inline]
    pub const fn bit_offset(&self) -> u32 {
        self.bit_offset
    }

    /// Width of the value in bits.
    #[inline]
    pub const fn size_in_bits(&self) -> u32 {
        self.size_in_bits
    }

    /// Number of bytes touched: `ceil((bit_offset + size_in_bits) / 8)`.
    #[inline]
    pub const fn byte_span(&self) -> u32 {
        self.bit_offset.saturating_add(self.size_in_bits).div_ceil(8)
    }

    /// First byte after the block.
    #[inline]
    pub const fn end_byte(&self) -> u32 {
        self.byte_offset.saturating_add(self.byte_span())
    }

    /// Whether the block is a sub-byte field sharing its byte with siblings.
    #[inline]
    pub const fn is_bit_packed(&self) -> bool {
        self.bit_offset != 0 || self.size_in_bits % 8 != 0
    }

    /// Whether the block stays within a state region of `state_size` bytes.
    #[inline]
    pub const fn fits_within(&self, state_size: u32) -> bool {
        self.end_byte() <= state_size
    }

    #[inline]
    const fn start_bit(&self) -> u64 {
        self.byte_offset as u64 * 8 + self.bit_offset as u64
    }

    /// Absolute bit position just past the block.
    #[inline]
    pub(crate) const fn end_bit(&self) -> u64 {
        self.start_bit() + self.size_in_bits as u64
    }

    /// Whether the two blocks share at least one bit.
    pub const fn overlaps(&self, other: &StateBlock) -> bool {
        self.start_bit() < other.end_bit() && other.start_bit() < self.end_bit()
    }

    /// Whether `other` lies entirely inside this block.
    pub const fn contains(&self, other: &StateBlock) -> bool {
        self.start_bit() <= other.start_bit() && other.end_bit() <= self.end_bit()
    }
}

impl fmt::Display for StateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}.{} [{} bits]",
            self.format, self.byte_offset, self.bit_offset, self.size_in_bits
        )
    }
}
