//! Encoding and decoding command byte spans.
//!
//! Encoding is the identity on the struct's bytes. Decoding copies out of
//! the span (no alignment requirement) after checking the header against
//! the expected command kind.

use crate::commands::DeviceCommand;
use crate::error::{CommandError, CommandResult};
use crate::header::CommandHeader;
use input::consts::COMMAND_HEADER_SIZE;
use tracing::error;

/// Bytes to hand to a command channel.
#[inline]
pub fn encode<C: DeviceCommand>(command: &C) -> &[u8] {
    command.as_bytes()
}

/// Read the header at the start of `bytes`.
///
/// # Errors
/// `CommandError::Truncated` if fewer than 8 bytes are given.
pub fn peek_header(bytes: &[u8]) -> CommandResult<CommandHeader> {
    let raw = bytes
        .get(..COMMAND_HEADER_SIZE)
        .ok_or(CommandError::Truncated {
            expected: COMMAND_HEADER_SIZE,
            actual: bytes.len(),
        })?;
    Ok(bytemuck::pod_read_unaligned(raw))
}

/// Check that `header` describes a well-formed `C`.
///
/// A wrong tag is a protocol mismatch. A wrong size for the right tag means
/// one side was built against a different struct definition; that is a
/// programming error and is logged as such.
pub fn check_header<C: DeviceCommand>(header: &CommandHeader) -> CommandResult<()> {
    if header.tag() != C::TYPE {
        return Err(CommandError::ProtocolMismatch {
            expected: C::TYPE,
            actual: header.tag(),
        });
    }
    if header.size() != C::SIZE {
        error!(
            "Command '{}' size mismatch: header says {} bytes, struct is {}",
            C::TYPE,
            header.size(),
            C::SIZE
        );
        return Err(CommandError::SizeMismatch {
            command: C::TYPE,
            expected: C::SIZE,
            actual: header.size(),
        });
    }
    Ok(())
}

/// Decode a `C` from the start of `bytes`. Trailing bytes are ignored.
///
/// # Errors
/// - `CommandError::Truncated` if the span is shorter than the header or the struct
/// - `CommandError::ProtocolMismatch` if the tag is not `C::TYPE`
/// - `CommandError::SizeMismatch` if the header size is not `C::SIZE`
pub fn decode<C: DeviceCommand>(bytes: &[u8]) -> CommandResult<C> {
    let header = peek_header(bytes)?;
    check_header::<C>(&header)?;

    let size = C::SIZE as usize;
    let raw = bytes.get(..size).ok_or(CommandError::Truncated {
        expected: size,
        actual: bytes.len(),
    })?;
    Ok(bytemuck::pod_read_unaligned(raw))
}
