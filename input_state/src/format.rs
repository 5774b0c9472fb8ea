//! Value formats for state blocks.
//!
//! A [`StateFormat`] is a FourCC tag naming how the bits of a state block
//! are encoded. The set of tags with decode rules is closed ([`FormatKind`]);
//! other tags are legal on group controls (`VEC2`, `STCK`, device formats)
//! but cannot back a typed value.
//!
//! ## Decode rules
//!
//! | Tag    | Width  | Integer read           | Float read                    |
//! |--------|--------|------------------------|-------------------------------|
//! | `BIT ` | 1..=8  | raw                    | raw / (2^n - 1)               |
//! | `SBIT` | 1..=8  | n=1: ±1, else raw - 2^(n-1) | n=1: ±1, else excess-K normalized |
//! | `BYTE` | 8      | raw                    | raw / 255                     |
//! | `SBYT` | 8      | sign-extended          | v / 127, clamped              |
//! | `USHT` | 16     | raw                    | raw / 65535                   |
//! | `SHRT` | 16     | sign-extended          | v / 32767, clamped            |
//! | `UINT` | 32     | raw                    | raw / u32::MAX                |
//! | `INT ` | 32     | sign-extended          | v / i32::MAX, clamped         |
//! | `ULNG` | 64     | raw                    | raw / u64::MAX                |
//! | `LONG` | 64     | raw as i64             | v / i64::MAX, clamped         |
//! | `FLT ` | 32     | truncated, saturating  | IEEE-754 binary32             |
//! | `DBL ` | 64     | truncated, saturating  | IEEE-754 binary64             |
//!
//! Encoding is the inverse: integers saturate to the field's range, floats
//! written to integer fields are clamped to the normalized range and rounded.

use input::bits;
use input::consts::MAX_BIT_FIELD_BITS;
use input::fourcc::FourCC;
use serde::{Deserialize, Serialize};
use std::fmt;

/// FourCC tag identifying how a state block's bits encode a value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateFormat(FourCC);

impl StateFormat {
    /// Unsigned bit field, 1..=8 bits.
    pub const BIT: Self = Self(FourCC::from_bytes(*b"BIT "));
    /// Signed bit field, 1..=8 bits.
    pub const SBIT: Self = Self(FourCC::from_bytes(*b"SBIT"));
    /// Unsigned 8-bit integer.
    pub const BYTE: Self = Self(FourCC::from_bytes(*b"BYTE"));
    /// Signed 8-bit integer.
    pub const SBYTE: Self = Self(FourCC::from_bytes(*b"SBYT"));
    /// Signed 16-bit integer.
    pub const SHORT: Self = Self(FourCC::from_bytes(*b"SHRT"));
    /// Unsigned 16-bit integer.
    pub const USHORT: Self = Self(FourCC::from_bytes(*b"USHT"));
    /// Signed 32-bit integer.
    pub const INT: Self = Self(FourCC::from_bytes(*b"INT "));
    /// Unsigned 32-bit integer.
    pub const UINT: Self = Self(FourCC::from_bytes(*b"UINT"));
    /// Signed 64-bit integer.
    pub const LONG: Self = Self(FourCC::from_bytes(*b"LONG"));
    /// Unsigned 64-bit integer.
    pub const ULONG: Self = Self(FourCC::from_bytes(*b"ULNG"));
    /// IEEE-754 binary32.
    pub const FLOAT: Self = Self(FourCC::from_bytes(*b"FLT "));
    /// IEEE-754 binary64.
    pub const DOUBLE: Self = Self(FourCC::from_bytes(*b"DBL "));

    /// Wrap an arbitrary tag.
    #[inline]
    pub const fn new(tag: FourCC) -> Self {
        Self(tag)
    }

    /// The underlying tag.
    #[inline]
    pub const fn tag(self) -> FourCC {
        self.0
    }

    /// Decode rule for this tag, if it has one.
    pub fn kind(self) -> Option<FormatKind> {
        FormatKind::ALL.iter().copied().find(|kind| kind.format() == self)
    }
}

impl From<FourCC> for StateFormat {
    fn from(tag: FourCC) -> Self {
        Self(tag)
    }
}

impl fmt::Display for StateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for StateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateFormat('{}')", self.0)
    }
}

/// Formats with a decode rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Bit,
    SignedBit,
    Byte,
    SByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
}

impl FormatKind {
    /// Every kind, in tag-table order.
    pub const ALL: [FormatKind; 12] = [
        Self::Bit,
        Self::SignedBit,
        Self::Byte,
        Self::SByte,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Float,
        Self::Double,
    ];

    /// Tag for this kind.
    pub const fn format(self) -> StateFormat {
        match self {
            Self::Bit => StateFormat::BIT,
            Self::SignedBit => StateFormat::SBIT,
            Self::Byte => StateFormat::BYTE,
            Self::SByte => StateFormat::SBYTE,
            Self::Short => StateFormat::SHORT,
            Self::UShort => StateFormat::USHORT,
            Self::Int => StateFormat::INT,
            Self::UInt => StateFormat::UINT,
            Self::Long => StateFormat::LONG,
            Self::ULong => StateFormat::ULONG,
            Self::Float => StateFormat::FLOAT,
            Self::Double => StateFormat::DOUBLE,
        }
    }

    /// Width used when a declaration does not give one.
    pub const fn natural_size_in_bits(self) -> u32 {
        match self {
            Self::Bit | Self::SignedBit => 1,
            Self::Byte | Self::SByte => 8,
            Self::Short | Self::UShort => 16,
            Self::Int | Self::UInt | Self::Float => 32,
            Self::Long | Self::ULong | Self::Double => 64,
        }
    }

    /// Bit fields are packed into a shared byte; everything else is byte-aligned.
    pub const fn is_bit_field(self) -> bool {
        matches!(self, Self::Bit | Self::SignedBit)
    }

    /// IEEE floating point storage.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Two's complement storage.
    const fn is_twos_complement(self) -> bool {
        matches!(self, Self::SByte | Self::Short | Self::Int | Self::Long)
    }

    /// Whether a block of this kind may be `size_in_bits` wide.
    pub const fn accepts_size(self, size_in_bits: u32) -> bool {
        if self.is_bit_field() {
            size_in_bits >= 1 && size_in_bits <= MAX_BIT_FIELD_BITS
        } else {
            size_in_bits == self.natural_size_in_bits()
        }
    }

    /// Decode raw field bits to an integer.
    pub fn decode_int(self, raw: u64, size_in_bits: u32) -> i128 {
        match self {
            Self::SignedBit if size_in_bits == 1 => {
                if raw & 1 != 0 {
                    1
                } else {
                    -1
                }
            }
            Self::SignedBit => raw as i128 - half_range(size_in_bits),
            Self::Float => f32::from_bits(raw as u32) as i128,
            Self::Double => f64::from_bits(raw) as i128,
            kind if kind.is_twos_complement() => sign_extend(raw, size_in_bits) as i128,
            _ => raw as i128,
        }
    }

    /// Decode raw field bits to a float. Integer formats normalize.
    pub fn decode_float(self, raw: u64, size_in_bits: u32) -> f64 {
        match self {
            Self::Float => f32::from_bits(raw as u32) as f64,
            Self::Double => f64::from_bits(raw),
            Self::SignedBit if size_in_bits == 1 => self.decode_int(raw, size_in_bits) as f64,
            Self::SignedBit => {
                let value = self.decode_int(raw, size_in_bits) as f64;
                (value / (half_range(size_in_bits) - 1).max(1) as f64).clamp(-1.0, 1.0)
            }
            kind if kind.is_twos_complement() => {
                let value = sign_extend(raw, size_in_bits) as f64;
                (value / signed_max(size_in_bits) as f64).clamp(-1.0, 1.0)
            }
            _ => raw as f64 / unsigned_max(size_in_bits) as f64,
        }
    }

    /// Encode an integer into raw field bits, saturating to the field's range.
    pub fn encode_int(self, value: i128, size_in_bits: u32) -> u64 {
        match self {
            Self::SignedBit if size_in_bits == 1 => u64::from(value > 0),
            Self::SignedBit => {
                let max = unsigned_max(size_in_bits) as i128;
                (value + half_range(size_in_bits)).clamp(0, max) as u64
            }
            Self::Float => u64::from((value as f32).to_bits()),
            Self::Double => (value as f64).to_bits(),
            kind if kind.is_twos_complement() => {
                let clamped = value.clamp(signed_min(size_in_bits), signed_max(size_in_bits));
                (clamped as i64 as u64) & unsigned_max(size_in_bits)
            }
            _ => value.clamp(0, unsigned_max(size_in_bits) as i128) as u64,
        }
    }

    /// Encode a float into raw field bits. Integer formats take a normalized
    /// value, clamped and rounded.
    pub fn encode_float(self, value: f64, size_in_bits: u32) -> u64 {
        match self {
            Self::Float => u64::from((value as f32).to_bits()),
            Self::Double => value.to_bits(),
            Self::SignedBit if size_in_bits == 1 => u64::from(value > 0.0),
            Self::SignedBit => {
                let scale = (half_range(size_in_bits) - 1).max(1) as f64;
                let steps = (value.clamp(-1.0, 1.0) * scale).round() as i128;
                self.encode_int(steps, size_in_bits)
            }
            kind if kind.is_twos_complement() => {
                let steps = (value.clamp(-1.0, 1.0) * signed_max(size_in_bits) as f64).round();
                self.encode_int(steps as i128, size_in_bits)
            }
            _ => {
                let max = unsigned_max(size_in_bits);
                ((value.clamp(0.0, 1.0) * max as f64).round() as u64).min(max)
            }
        }
    }
}

/// Largest unsigned value in `size_in_bits` bits.
#[inline]
fn unsigned_max(size_in_bits: u32) -> u64 {
    if size_in_bits >= u64::BITS {
        u64::MAX
    } else if size_in_bits <= MAX_BIT_FIELD_BITS {
        u64::from(bits::mask(size_in_bits))
    } else {
        (1u64 << size_in_bits) - 1
    }
}

#[inline]
fn signed_max(size_in_bits: u32) -> i128 {
    (1i128 << (size_in_bits - 1)) - 1
}

#[inline]
fn signed_min(size_in_bits: u32) -> i128 {
    -(1i128 << (size_in_bits - 1))
}

/// Excess-K bias for multi-bit `SBIT` fields.
#[inline]
fn half_range(size_in_bits: u32) -> i128 {
    1i128 << (size_in_bits - 1)
}

#[inline]
fn sign_extend(raw: u64, size_in_bits: u32) -> i64 {
    let shift = u64::BITS - size_in_bits;
    ((raw << shift) as i64) >> shift
}
