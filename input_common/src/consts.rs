//! Workspace-wide constants.
//!
//! Single source of truth for the numeric limits shared by the layout
//! engine and the command protocol.

/// Default upper bound for a device's state region, in bytes.
///
/// Used when a device declaration does not set `max_state_size`.
pub const DEFAULT_MAX_STATE_SIZE: u32 = 4096;

/// Widest value a single state block can carry, in bits (`LONG`, `ULNG`, `DBL `).
pub const MAX_VALUE_BITS: u32 = 64;

/// Widest bit field that can be packed into one byte.
pub const MAX_BIT_FIELD_BITS: u32 = 8;

/// Size of the common command header: FourCC type + `u32` size.
pub const COMMAND_HEADER_SIZE: usize = 8;

/// Largest command or response a channel exchanges, in bytes.
pub const MAX_COMMAND_SIZE: usize = 256;

/// Separator between parent and child names in a control path.
pub const PATH_SEPARATOR: char = '/';

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(DEFAULT_MAX_STATE_SIZE > 0);
        assert_eq!(MAX_BIT_FIELD_BITS, 8);
        assert!(COMMAND_HEADER_SIZE < MAX_COMMAND_SIZE);
    }

    #[test]
    fn widest_value_fits_in_raw_word() {
        // Raw values travel as u64 between the byte buffer and the decoders.
        assert!(MAX_VALUE_BITS <= u64::BITS);
    }
}
