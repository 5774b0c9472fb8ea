//! Concrete device commands.
//!
//! Every command is a packed struct starting with a [`CommandHeader`],
//! followed by its payload. The same struct serves as request and response:
//! query commands go out with a zeroed payload and come back with the
//! backend's answer filled in.
//!
//! | Command                          | Tag    | Payload             | Size |
//! |----------------------------------|--------|---------------------|------|
//! | [`SetSamplingFrequencyCommand`]  | `SSFQ` | `f32` frequency     | 12   |
//! | [`QuerySamplingFrequencyCommand`]| `SMPL` | `f32` frequency     | 12   |
//! | [`EnableDeviceCommand`]          | `ENBL` | none                | 8    |
//! | [`DisableDeviceCommand`]         | `DSBL` | none                | 8    |
//! | [`QueryEnabledStateCommand`]     | `QRYE` | `u8` enabled        | 9    |
//! | [`RequestSyncCommand`]           | `SYNC` | none                | 8    |
//! | [`RequestResetCommand`]          | `RSET` | none                | 8    |
//! | [`QueryCanRunInBackgroundCommand`]| `QRBG`| `u8` can run        | 9    |
//! | [`DualMotorRumbleCommand`]       | `RMBL` | `f32` low, `f32` high | 16 |
//! | [`QueryDimensionsCommand`]       | `DIMS` | `[f32; 2]`          | 16   |
//! | [`WarpMousePositionCommand`]     | `WPMS` | `[f32; 2]`          | 16   |

use crate::header::CommandHeader;
use bytemuck::{Pod, Zeroable};
use input::fourcc::FourCC;
use static_assertions::const_assert_eq;

/// A fixed-size device command.
pub trait DeviceCommand: Pod {
    /// Type tag carried in the header.
    const TYPE: FourCC;

    /// Total struct length, header included.
    const SIZE: u32 = size_of::<Self>() as u32;

    /// Header of this value.
    fn header(&self) -> CommandHeader;

    /// Type tag of the command kind.
    fn type_tag() -> FourCC {
        Self::TYPE
    }

    /// Header a well-formed command of this kind carries.
    fn expected_header() -> CommandHeader {
        CommandHeader::new(Self::TYPE, Self::SIZE)
    }

    /// Exact bytes exchanged with a backend.
    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Declare a packed command struct, check its size at compile time and
/// implement [`DeviceCommand`] for it.
macro_rules! device_command {
    (
        $(#[$meta:meta])*
        $name:ident = $tag:literal, $size:literal {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(C, packed)]
        #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
        pub struct $name {
            header: CommandHeader,
            $( $(#[$field_meta])* $field: $ty, )*
        }

        const_assert_eq!(size_of::<$name>(), $size);

        impl DeviceCommand for $name {
            const TYPE: FourCC = FourCC::from_bytes(*$tag);

            #[inline]
            fn header(&self) -> CommandHeader {
                self.header
            }
        }
    };
}

// ─── Sampling ───────────────────────────────────────────────────────

device_command! {
    /// Ask the backend to sample the device at `frequency` Hz.
    SetSamplingFrequencyCommand = b"SSFQ", 12 {
        frequency: f32,
    }
}

impl SetSamplingFrequencyCommand {
    /// Request `frequency` Hz.
    pub fn create(frequency: f32) -> Self {
        Self {
            header: Self::expected_header(),
            frequency,
        }
    }

    /// Requested (or, in a response, applied) frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

device_command! {
    /// Query the current sampling frequency.
    QuerySamplingFrequencyCommand = b"SMPL", 12 {
        frequency: f32,
    }
}

impl QuerySamplingFrequencyCommand {
    /// Query; the backend fills in the frequency.
    pub fn create() -> Self {
        Self {
            header: Self::expected_header(),
            frequency: 0.0,
        }
    }

    /// Response carrying `frequency`.
    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Current sampling frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

// ─── Device lifecycle ───────────────────────────────────────────────

device_command! {
    /// Resume event delivery from the device.
    EnableDeviceCommand = b"ENBL", 8 {}
}

impl EnableDeviceCommand {
    /// Enable event delivery.
    pub fn create() -> Self {
        Self {
            header: Self::expected_header(),
        }
    }
}

device_command! {
    /// Stop event delivery from the device.
    DisableDeviceCommand = b"DSBL", 8 {}
}

impl DisableDeviceCommand {
    /// Disable event delivery.
    pub fn create() -> Self {
        Self {
            header: Self::expected_header(),
        }
    }
}

device_command! {
    /// Query whether the backend currently delivers events for the device.
    QueryEnabledStateCommand = b"QRYE", 9 {
        is_enabled: u8,
    }
}

impl QueryEnabledStateCommand {
    /// Query; the backend fills in the state.
    pub fn create() -> Self {
        Self {
            header: Self::expected_header(),
            is_enabled: 0,
        }
    }

    /// Response carrying `enabled`.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.is_enabled = u8::from(enabled);
        self
    }

    /// Whether the device is enabled.
    pub fn is_enabled(&self) -> bool {
        self.is_enabled != 0
    }
}

device_command! {
    /// Ask the backend to resend the device's full current state.
    RequestSyncCommand = b"SYNC", 8 {}
}

impl RequestSyncCommand {
    /// Ask for a full state report.
    pub fn create() -> Self {
        Self {
            header: Self::expected_header(),
        }
    }
}

device_command! {
    /// Ask the backend to reset the device to its initial state.
    RequestResetCommand = b"RSET", 8 {}
}

impl RequestResetCommand {
    /// Ask the device to return to its default state.
    pub fn create() -> Self {
        Self {
            header: Self::expected_header(),
        }
    }
}

device_command! {
    /// Query whether the device keeps reporting while the application is
    /// in the background.
    QueryCanRunInBackgroundCommand = b"QRBG", 9 {
        can_run_in_background: u8,
    }
}

impl QueryCanRunInBackgroundCommand {
    /// Query; the backend fills in the answer.
    pub fn create() -> Self {
        Self {
            header: Self::expected_header(),
            can_run_in_background: 0,
        }
    }

    /// Response carrying `can_run`.
    pub fn with_can_run_in_background(mut self, can_run: bool) -> Self {
        self.can_run_in_background = u8::from(can_run);
        self
    }

    /// Whether the device reports in the background.
    pub fn can_run_in_background(&self) -> bool {
        self.can_run_in_background != 0
    }
}

// ─── Haptics ────────────────────────────────────────────────────────

device_command! {
    /// Drive the low- and high-frequency rumble motors, each in `0..=1`.
    DualMotorRumbleCommand = b"RMBL", 16 {
        low_frequency_motor_speed: f32,
        high_frequency_motor_speed: f32,
    }
}

impl DualMotorRumbleCommand {
    /// Set both motor speeds.
    pub fn create(low_frequency: f32, high_frequency: f32) -> Self {
        Self {
            header: Self::expected_header(),
            low_frequency_motor_speed: low_frequency,
            high_frequency_motor_speed: high_frequency,
        }
    }

    /// Low-frequency motor speed.
    pub fn low_frequency_motor_speed(&self) -> f32 {
        self.low_frequency_motor_speed
    }

    /// High-frequency motor speed.
    pub fn high_frequency_motor_speed(&self) -> f32 {
        self.high_frequency_motor_speed
    }
}

// ─── Pointer ────────────────────────────────────────────────────────

device_command! {
    /// Query the size of the surface a pointer or touch device reports on.
    QueryDimensionsCommand = b"DIMS", 16 {
        dimensions: [f32; 2],
    }
}

impl QueryDimensionsCommand {
    /// Query; the backend fills in the dimensions.
    pub fn create() -> Self {
        Self {
            header: Self::expected_header(),
            dimensions: [0.0; 2],
        }
    }

    /// Response carrying the surface size.
    pub fn with_dimensions(mut self, width: f32, height: f32) -> Self {
        self.dimensions = [width, height];
        self
    }

    /// `[width, height]`.
    pub fn dimensions(&self) -> [f32; 2] {
        self.dimensions
    }
}

device_command! {
    /// Move the system pointer to a position in screen space.
    WarpMousePositionCommand = b"WPMS", 16 {
        warp_position: [f32; 2],
    }
}

impl WarpMousePositionCommand {
    /// Warp to `(x, y)`.
    pub fn create(x: f32, y: f32) -> Self {
        Self {
            header: Self::expected_header(),
            warp_position: [x, y],
        }
    }

    /// `[x, y]`.
    pub fn warp_position(&self) -> [f32; 2] {
        self.warp_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::consts::COMMAND_HEADER_SIZE;

    fn check<C: DeviceCommand>(command: C, tag: &[u8; 4], size: u32) {
        assert_eq!(C::type_tag(), FourCC::from_bytes(*tag));
        assert_eq!(C::SIZE, size);
        assert_eq!(command.as_bytes().len(), size as usize);
        assert_eq!(command.header(), C::expected_header());
        assert_eq!(command.header().payload_size() as usize, size as usize - COMMAND_HEADER_SIZE);
    }

    #[test]
    fn declared_sizes_match_measured_layout() {
        check(SetSamplingFrequencyCommand::create(60.0), b"SSFQ", 12);
        check(QuerySamplingFrequencyCommand::create(), b"SMPL", 12);
        check(EnableDeviceCommand::create(), b"ENBL", 8);
        check(DisableDeviceCommand::create(), b"DSBL", 8);
        check(QueryEnabledStateCommand::create(), b"QRYE", 9);
        check(RequestSyncCommand::create(), b"SYNC", 8);
        check(RequestResetCommand::create(), b"RSET", 8);
        check(QueryCanRunInBackgroundCommand::create(), b"QRBG", 9);
        check(DualMotorRumbleCommand::create(0.25, 0.75), b"RMBL", 16);
        check(QueryDimensionsCommand::create(), b"DIMS", 16);
        check(WarpMousePositionCommand::create(10.0, 20.0), b"WPMS", 16);
    }

    #[test]
    fn payload_follows_header() {
        let command = SetSamplingFrequencyCommand::create(120.0);
        let bytes = command.as_bytes();
        assert_eq!(&bytes[8..12], &120.0f32.to_le_bytes());

        let rumble = DualMotorRumbleCommand::create(0.5, 1.0);
        let bytes = rumble.as_bytes();
        assert_eq!(&bytes[8..12], &0.5f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1.0f32.to_le_bytes());
    }

    #[test]
    fn query_responses_fill_the_payload() {
        let enabled = QueryEnabledStateCommand::create().with_enabled(true);
        assert!(enabled.is_enabled());
        assert_eq!(enabled.as_bytes()[8], 1);

        let dims = QueryDimensionsCommand::create().with_dimensions(1920.0, 1080.0);
        assert_eq!(dims.dimensions(), [1920.0, 1080.0]);
        assert_eq!(dims.header(), QueryDimensionsCommand::expected_header());
    }
}
