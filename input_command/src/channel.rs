//! Command channels: the boundary to platform input backends.
//!
//! A backend implements [`CommandChannel`]: it takes the exact bytes of a
//! command and either answers with response bytes of the same header shape
//! or reports that it does not understand the command. [`dispatch`] wraps
//! that exchange for a typed command.

use crate::codec;
use crate::commands::DeviceCommand;
use crate::error::{CommandError, CommandResult};
use input::consts::MAX_COMMAND_SIZE;
use input::device::DeviceId;
use tracing::{debug, warn};

/// Fixed-capacity response buffer.
pub type ReplyBytes = heapless::Vec<u8, MAX_COMMAND_SIZE>;

/// Outcome of one `send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelReply {
    /// Backend handled the command; bytes start with a command header.
    Response(ReplyBytes),
    /// Backend does not implement the command.
    NotSupported,
}

impl ChannelReply {
    /// Copy `bytes` into a response.
    ///
    /// # Errors
    /// `CommandError::ResponseTooLarge` if `bytes` exceeds `MAX_COMMAND_SIZE`.
    pub fn response(bytes: &[u8]) -> CommandResult<Self> {
        ReplyBytes::from_slice(bytes)
            .map(Self::Response)
            .map_err(|_| CommandError::ResponseTooLarge { size: bytes.len() })
    }
}

/// A backend able to execute device commands.
pub trait CommandChannel: Send {
    /// Backend name, for logs and errors.
    fn name(&self) -> &str;

    /// Execute `command` against `device`.
    ///
    /// # Errors
    /// `CommandError::ChannelFailure` when the backend itself is unavailable.
    /// An unknown command is not an error: answer `ChannelReply::NotSupported`.
    fn send(&mut self, device: DeviceId, command: &[u8]) -> CommandResult<ChannelReply>;
}

/// Send `command` to `device` over `channel` and decode the response.
///
/// Each call is an independent request/response exchange. The outgoing
/// header is checked first, so a command built with a stale header never
/// reaches the backend.
///
/// # Errors
/// - `CommandError::UnsupportedCommand` if the backend answered `NotSupported`
/// - `CommandError::ProtocolMismatch` / `SizeMismatch` / `Truncated` for a
///   malformed response (or a malformed outgoing header)
/// - whatever the channel returns, typically `ChannelFailure`
pub fn dispatch<C, Ch>(channel: &mut Ch, device: DeviceId, command: &C) -> CommandResult<C>
where
    C: DeviceCommand,
    Ch: CommandChannel + ?Sized,
{
    codec::check_header::<C>(&command.header())?;

    debug!("Dispatching {} to {} via '{}'", command.header(), device, channel.name());
    match channel.send(device, codec::encode(command))? {
        ChannelReply::Response(bytes) => codec::decode::<C>(&bytes),
        ChannelReply::NotSupported => {
            warn!(
                "Backend '{}' does not support '{}' for {}",
                channel.name(),
                C::TYPE,
                device
            );
            Err(CommandError::UnsupportedCommand { command: C::TYPE })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{QuerySamplingFrequencyCommand, SetSamplingFrequencyCommand};
    use input::fourcc::FourCC;

    /// Answers every command with a fixed byte span.
    struct Canned(Option<Vec<u8>>);

    impl CommandChannel for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn send(&mut self, _device: DeviceId, _command: &[u8]) -> CommandResult<ChannelReply> {
            match &self.0 {
                Some(bytes) => ChannelReply::response(bytes),
                None => Ok(ChannelReply::NotSupported),
            }
        }
    }

    #[test]
    fn not_supported_is_recoverable() {
        let mut channel = Canned(None);
        let err = dispatch(&mut channel, DeviceId(1), &QuerySamplingFrequencyCommand::create())
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::UnsupportedCommand {
                command: FourCC::from_bytes(*b"SMPL")
            }
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn response_of_another_kind_is_mismatch() {
        let reply = SetSamplingFrequencyCommand::create(30.0).as_bytes().to_vec();
        let mut channel = Canned(Some(reply));
        assert!(matches!(
            dispatch(&mut channel, DeviceId(1), &QuerySamplingFrequencyCommand::create()),
            Err(CommandError::ProtocolMismatch { .. })
        ));
    }

    #[test]
    fn stale_outgoing_header_is_not_sent() {
        let mut command = SetSamplingFrequencyCommand::create(30.0);
        bytemuck::bytes_of_mut(&mut command)[4] = 99;
        let mut channel = Canned(None);
        assert!(matches!(
            dispatch(&mut channel, DeviceId(1), &command),
            Err(CommandError::SizeMismatch { actual: 99, .. })
        ));
    }

    #[test]
    fn oversized_response_is_refused() {
        assert_eq!(
            ChannelReply::response(&[0u8; MAX_COMMAND_SIZE + 1]),
            Err(CommandError::ResponseTooLarge {
                size: MAX_COMMAND_SIZE + 1
            })
        );
    }
}
