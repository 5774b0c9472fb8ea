//! Four-character codes.
//!
//! A `FourCC` packs four 8-bit character codes into one `u32`. It is the
//! discriminant for device command types and the tag for state block value
//! formats.
//!
//! ## Bit order
//!
//! The first character lands in the most significant byte, so a hex dump of
//! the packed value reads in the same order as the characters:
//!
//! ```text
//! 'S' 'S' 'F' 'Q'  ->  0x53_53_46_51
//! ```
//!
//! Equality and ordering are over the packed value.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a `FourCC` from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FourCCParseError {
    /// Input was empty or longer than four characters.
    #[error("FourCC must be 1-4 characters, got {len}")]
    InvalidLength {
        /// Character count of the rejected input
        len: usize,
    },

    /// Input contained a character outside printable ASCII.
    #[error("FourCC character {ch:?} is not printable ASCII")]
    InvalidCharacter {
        /// Offending character
        ch: char,
    },
}

/// Packed four-character identifier.
///
/// `#[repr(transparent)]` over `u32` so it can sit directly inside
/// fixed-layout command structs.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct FourCC(u32);

impl FourCC {
    /// Pack four character codes, first character in the most significant byte.
    #[inline]
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(((a as u32) << 24) | ((b as u32) << 16) | ((c as u32) << 8) | d as u32)
    }

    /// Pack a 4-byte array in reading order.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// Wrap an already packed value.
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    /// The packed value.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Unpack into the four character codes, in reading order.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Parse 1-4 printable ASCII characters. Short input is padded with
    /// spaces on the right (`"INT"` is `'INT '`).
    pub fn parse(text: &str) -> Result<Self, FourCCParseError> {
        let len = text.chars().count();
        if len == 0 || len > 4 {
            return Err(FourCCParseError::InvalidLength { len });
        }
        let mut bytes = [b' '; 4];
        for (slot, ch) in bytes.iter_mut().zip(text.chars()) {
            if !(ch.is_ascii_graphic() || ch == ' ') {
                return Err(FourCCParseError::InvalidCharacter { ch });
            }
            *slot = ch as u8;
        }
        Ok(Self::from_bytes(bytes))
    }

    /// Whether all four bytes are printable ASCII.
    pub fn is_printable(self) -> bool {
        self.to_bytes().iter().all(|b| b.is_ascii_graphic() || *b == b' ')
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC('{self}' {:#010x})", self.0)
    }
}

impl FromStr for FourCC {
    type Err = FourCCParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<FourCC> for u32 {
    fn from(code: FourCC) -> Self {
        code.0
    }
}

// Configuration files spell tags as strings ("BIT ", "SSFQ").
impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FourCC {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_character_is_most_significant() {
        let code = FourCC::new(b'S', b'S', b'F', b'Q');
        assert_eq!(code.as_u32(), 0x5353_4651);
        assert_eq!(code.to_bytes(), *b"SSFQ");
    }

    #[test]
    fn parse_pads_short_codes() {
        assert_eq!(FourCC::parse("INT").unwrap(), FourCC::from_bytes(*b"INT "));
        assert_eq!(FourCC::parse("FLT ").unwrap(), FourCC::from_bytes(*b"FLT "));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            FourCC::parse(""),
            Err(FourCCParseError::InvalidLength { len: 0 })
        );
        assert_eq!(
            FourCC::parse("TOOLONG"),
            Err(FourCCParseError::InvalidLength { len: 7 })
        );
        assert!(matches!(
            FourCC::parse("A\tB"),
            Err(FourCCParseError::InvalidCharacter { ch: '\t' })
        ));
    }

    #[test]
    fn ordering_follows_packed_value() {
        let a = FourCC::from_bytes(*b"AAAA");
        let b = FourCC::from_bytes(*b"AAAB");
        let z = FourCC::from_bytes(*b"Z   ");
        assert!(a < b);
        assert!(b < z);
    }

    #[test]
    fn display_escapes_non_printable_bytes() {
        let code = FourCC::from_u32(0x4142_0001);
        assert_eq!(code.to_string(), "AB\\x00\\x01");
        assert!(!code.is_printable());
    }

    #[test]
    fn debug_shows_text_and_hex() {
        let code = FourCC::from_bytes(*b"DIMS");
        assert_eq!(format!("{code:?}"), "FourCC('DIMS' 0x44494d53)");
    }

    #[test]
    fn serde_uses_text_form() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Wrapper {
            tag: FourCC,
        }

        let wrapper: Wrapper = toml::from_str("tag = \"BIT\"").unwrap();
        assert_eq!(wrapper.tag, FourCC::from_bytes(*b"BIT "));
        assert!(toml::to_string(&wrapper).unwrap().contains("\"BIT \""));
        assert!(toml::from_str::<Wrapper>("tag = \"\"").is_err());
    }
}
