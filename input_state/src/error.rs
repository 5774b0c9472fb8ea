//! Error types for layout building and state buffer binding

use crate::block::StateBlock;
use crate::format::StateFormat;
use input::device::DeviceId;
use thiserror::Error;

/// Errors raised while compiling a device's control tree into state blocks.
///
/// All of these are fatal at device-setup time: the device is refused
/// rather than registered with a truncated layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Control would end past the device's maximum state size
    #[error("Layout overflow: control '{control}' ends at byte {end}, device limit is {limit}")]
    LayoutOverflow {
        /// Control path
        control: String,
        /// First byte after the control, `u32::MAX` if not addressable
        end: u32,
        /// Maximum state size in bytes
        limit: u32,
    },

    /// Bit field would cross a byte boundary
    #[error(
        "Layout overflow: control '{control}' bit field {bit_offset}+{size_in_bits} spans more than one byte"
    )]
    BitFieldSpansBytes {
        /// Control path
        control: String,
        /// Bit offset within the first byte
        bit_offset: u32,
        /// Field width in bits
        size_in_bits: u32,
    },

    /// Declared width is not valid for the format
    #[error("Control '{control}' cannot be {size_in_bits} bits wide in format '{format}'")]
    UnsupportedSize {
        /// Control path
        control: String,
        /// Declared format
        format: StateFormat,
        /// Declared width in bits
        size_in_bits: u32,
    },

    /// Leaf control uses a format tag with no decode rule
    #[error("Control '{control}' uses unknown format '{format}'")]
    UnknownFormat {
        /// Control path
        control: String,
        /// Unrecognised format
        format: StateFormat,
    },

    /// Two leaf controls claim the same bits
    #[error("Control '{control}' overlaps control '{other}'")]
    Overlap {
        /// Control being placed
        control: String,
        /// Control already occupying the bits
        other: String,
    },

    /// Same path declared twice
    #[error("Duplicate control path: {path}")]
    DuplicateControl {
        /// Control path
        path: String,
    },

    /// Lookup of a path the layout does not contain
    #[error("Unknown control: {path}")]
    UnknownControl {
        /// Control path
        path: String,
    },

    /// Typed accessor requested for a control that has no value format
    #[error("Control '{path}' with format '{format}' cannot be read as a value")]
    TypeMismatch {
        /// Control path
        path: String,
        /// Control's format
        format: StateFormat,
    },

    /// Control name is empty or contains the path separator
    #[error("Invalid control name: {name:?}")]
    InvalidName {
        /// Rejected name
        name: String,
    },
}

impl LayoutError {
    /// Whether the error is a state-region overflow (including cross-byte bit fields).
    pub fn is_overflow(&self) -> bool {
        matches!(
            self,
            Self::LayoutOverflow { .. } | Self::BitFieldSpansBytes { .. }
        )
    }
}

/// Errors raised when binding raw bytes to a device or reading through the
/// checked free functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Buffer is shorter than the region it must cover
    #[error("State buffer for {device} too small: need {required} bytes, got {actual}")]
    BufferTooSmall {
        /// Device the buffer was bound to
        device: DeviceId,
        /// Bytes required
        required: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Block reaches past the end of a plain byte slice
    #[error("State block ends at byte {end}, buffer holds {len}")]
    OutOfBounds {
        /// First byte after the block
        end: usize,
        /// Buffer length
        len: usize,
    },

    /// Block width or bit offset is not valid for its format
    #[error("State block {block} is not valid for its format")]
    MalformedBlock {
        /// Offending block
        block: StateBlock,
    },

    /// Free read/write on a block whose format has no decode rule
    #[error("No decode rule for format '{format}'")]
    UnknownFormat {
        /// Unrecognised format
        format: StateFormat,
    },
}

/// Result type for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Result type for state buffer operations
pub type StateResult<T> = Result<T, StateError>;
