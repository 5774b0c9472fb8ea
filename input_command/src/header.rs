//! Command header shared by every device command.
//!
//! ```text
//! offset  size  field
//! 0       4     type            FourCC, packed u32
//! 4       4     size_in_bytes   header + payload
//! 8       ..    payload
//! ```
//!
//! All command structs are `#[repr(C, packed)]` and exchanged as their exact
//! in-memory bytes. Multi-byte fields are little-endian; builds for
//! big-endian targets are refused at compile time.

use bytemuck::{Pod, Zeroable};
use input::consts::COMMAND_HEADER_SIZE;
use input::fourcc::FourCC;
use static_assertions::{const_assert, const_assert_eq};
use std::fmt;

/// Leading 8 bytes of every command and response.
#[repr(C, packed)]
#[derive(Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CommandHeader {
    type_tag: FourCC,
    size_in_bytes: u32,
}

const_assert_eq!(size_of::<CommandHeader>(), COMMAND_HEADER_SIZE);
const_assert!(cfg!(target_endian = "little"));

impl CommandHeader {
    /// Header for a command of type `type_tag` whose struct is `size_in_bytes` long.
    pub const fn new(type_tag: FourCC, size_in_bytes: u32) -> Self {
        Self {
            type_tag,
            size_in_bytes,
        }
    }

    /// Command type.
    #[inline]
    pub const fn tag(&self) -> FourCC {
        self.type_tag
    }

    /// Total command length, header included.
    #[inline]
    pub const fn size(&self) -> u32 {
        self.size_in_bytes
    }

    /// Payload length.
    #[inline]
    pub const fn payload_size(&self) -> u32 {
        self.size_in_bytes.saturating_sub(COMMAND_HEADER_SIZE as u32)
    }
}

impl fmt::Debug for CommandHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHeader")
            .field("type", &self.tag())
            .field("size_in_bytes", &self.size())
            .finish()
    }
}

impl fmt::Display for CommandHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.tag(), self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_layout() {
        let header = CommandHeader::new(FourCC::from_bytes(*b"SSFQ"), 12);
        let bytes = bytemuck::bytes_of(&header);
        assert_eq!(&bytes[..4], &0x5353_4651u32.to_le_bytes());
        assert_eq!(&bytes[4..], &12u32.to_le_bytes());
    }

    #[test]
    fn payload_size_excludes_header() {
        let header = CommandHeader::new(FourCC::from_bytes(*b"QRYE"), 9);
        assert_eq!(header.payload_size(), 1);
        assert_eq!(header.to_string(), "QRYE (9 bytes)");
    }
}
