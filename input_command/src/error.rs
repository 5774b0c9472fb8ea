//! Command protocol error types.

use input::fourcc::FourCC;
use thiserror::Error;

/// Errors raised while encoding, dispatching or decoding device commands.
///
/// Only [`CommandError::UnsupportedCommand`] is an expected outcome: not
/// every backend implements every command, and callers are meant to fall
/// back. Everything else is a hard failure of the channel or the protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Backend does not implement this command
    #[error("Command '{command}' is not supported by the backend")]
    UnsupportedCommand {
        /// Command type tag
        command: FourCC,
    },

    /// Response carries a different type tag than the command sent
    #[error("Protocol mismatch: expected '{expected}', got '{actual}'")]
    ProtocolMismatch {
        /// Tag of the command sent
        expected: FourCC,
        /// Tag found in the response header
        actual: FourCC,
    },

    /// Header size disagrees with the command's struct definition
    #[error("Command '{command}' declares {actual} bytes, struct is {expected}")]
    SizeMismatch {
        /// Command type tag
        command: FourCC,
        /// Size of the command struct
        expected: u32,
        /// Size found in the header
        actual: u32,
    },

    /// Byte span shorter than the structure it should hold
    #[error("Truncated command: need {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Response does not fit the reply buffer
    #[error("Response of {size} bytes exceeds the reply buffer")]
    ResponseTooLarge {
        /// Response size in bytes
        size: usize,
    },

    /// Channel itself is unavailable
    #[error("Channel '{backend}' failed: {reason}")]
    ChannelFailure {
        /// Backend name
        backend: String,
        /// Failure description
        reason: String,
    },

    /// No backend registered under this name
    #[error("Backend not found: {name}")]
    BackendNotFound {
        /// Requested name
        name: String,
    },

    /// Backend name registered twice
    #[error("Backend '{name}' is already registered")]
    BackendAlreadyRegistered {
        /// Backend name
        name: String,
    },
}

impl CommandError {
    /// Whether the caller can carry on with a fallback.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnsupportedCommand { .. })
    }
}

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unsupported_is_recoverable() {
        let tag = FourCC::from_bytes(*b"RMBL");
        assert!(CommandError::UnsupportedCommand { command: tag }.is_recoverable());
        assert!(
            !CommandError::ChannelFailure {
                backend: "simulated".into(),
                reason: "offline".into()
            }
            .is_recoverable()
        );
        assert!(
            !CommandError::ProtocolMismatch {
                expected: tag,
                actual: FourCC::from_bytes(*b"SMPL")
            }
            .is_recoverable()
        );
    }

    #[test]
    fn messages_name_the_tags() {
        let err = CommandError::SizeMismatch {
            command: FourCC::from_bytes(*b"SSFQ"),
            expected: 12,
            actual: 16,
        };
        assert_eq!(err.to_string(), "Command 'SSFQ' declares 16 bytes, struct is 12");
    }
}
