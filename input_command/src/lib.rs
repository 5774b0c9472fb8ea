//! # Input Device Command Protocol
//!
//! Fixed-layout binary commands exchanged with platform input backends.
//!
//! Each command is a packed struct: an 8-byte [`CommandHeader`] (FourCC
//! type tag + total size) followed by a typed payload. Callers build
//! commands with their `create` factories, [`dispatch`] them over a
//! [`CommandChannel`], and get the typed response back, or a
//! [`CommandError`] that tells an unsupported command apart from a failed
//! channel or a protocol violation.
//!
//! ## Module Structure
//!
//! - [`header`] - Command header layout
//! - [`commands`] - Concrete command kinds and the [`DeviceCommand`] trait
//! - [`codec`] - Byte-span encode/decode with header checks
//! - [`channel`] - Backend boundary and typed dispatch
//! - [`registry`] - Name-to-factory registry of backends
//! - [`simulated`] - In-process backend for development and tests
//!
//! ## Usage
//!
//! ```rust
//! use input::device::DeviceId;
//! use input_command::{SetSamplingFrequencyCommand, SimulatedBackend, dispatch};
//!
//! # fn main() -> Result<(), input_command::CommandError> {
//! let mut backend = SimulatedBackend::new();
//! let reply = dispatch(
//!     &mut backend,
//!     DeviceId(1),
//!     &SetSamplingFrequencyCommand::create(120.0),
//! )?;
//! assert_eq!(reply.frequency(), 120.0);
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod codec;
pub mod commands;
pub mod error;
pub mod header;
pub mod registry;
pub mod simulated;

pub use channel::{ChannelReply, CommandChannel, ReplyBytes, dispatch};
pub use commands::{
    DeviceCommand, DisableDeviceCommand, DualMotorRumbleCommand, EnableDeviceCommand,
    QueryCanRunInBackgroundCommand, QueryDimensionsCommand, QueryEnabledStateCommand,
    QuerySamplingFrequencyCommand, RequestResetCommand, RequestSyncCommand,
    SetSamplingFrequencyCommand, WarpMousePositionCommand,
};
pub use error::{CommandError, CommandResult};
pub use header::CommandHeader;
pub use registry::{BackendFactory, BackendRegistry};
pub use simulated::{BackendFeatures, SimulatedBackend, SimulatedDevice};
