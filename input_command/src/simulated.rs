//! In-process simulated backend.
//!
//! `SimulatedBackend` answers device commands from per-device state kept in
//! memory, for development and tests without a platform backend. Which
//! command families it understands is selected with [`BackendFeatures`];
//! everything else is answered `NotSupported`, exactly like a real backend
//! lacking the feature.

use crate::channel::{ChannelReply, CommandChannel};
use crate::codec;
use crate::commands::{
    DeviceCommand, DisableDeviceCommand, DualMotorRumbleCommand, EnableDeviceCommand,
    QueryCanRunInBackgroundCommand, QueryDimensionsCommand, QueryEnabledStateCommand,
    QuerySamplingFrequencyCommand, RequestResetCommand, RequestSyncCommand,
    SetSamplingFrequencyCommand, WarpMousePositionCommand,
};
use crate::error::{CommandError, CommandResult};
use bitflags::bitflags;
use input::device::DeviceId;
use input::fourcc::FourCC;
use std::collections::HashMap;
use tracing::{debug, info, warn};

bitflags! {
    /// Command families a simulated backend answers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BackendFeatures: u8 {
        /// `SSFQ`, `SMPL`
        const SAMPLING   = 0x01;
        /// `ENBL`, `DSBL`, `QRYE`
        const ENABLE     = 0x02;
        /// `SYNC`, `RSET`
        const SYNC       = 0x04;
        /// `QRBG`
        const BACKGROUND = 0x08;
        /// `RMBL`
        const HAPTICS    = 0x10;
        /// `DIMS`, `WPMS`
        const POINTER    = 0x20;
    }
}

impl Default for BackendFeatures {
    fn default() -> Self {
        Self::all()
    }
}

/// Simulated state of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedDevice {
    /// Sampling frequency in Hz.
    pub sampling_frequency: f32,
    /// Whether events are delivered.
    pub enabled: bool,
    /// Whether the device reports while the application is in the background.
    pub can_run_in_background: bool,
    /// Low- and high-frequency motor speeds.
    pub motor_speeds: (f32, f32),
    /// Reporting surface, `[width, height]`.
    pub dimensions: [f32; 2],
    /// Last warped pointer position.
    pub pointer_position: [f32; 2],
    /// Sync requests received.
    pub sync_requests: u32,
    /// Reset requests received.
    pub reset_requests: u32,
}

impl SimulatedDevice {
    /// Default sampling frequency in Hz.
    pub const DEFAULT_SAMPLING_FREQUENCY: f32 = 60.0;
    /// Default reporting surface.
    pub const DEFAULT_DIMENSIONS: [f32; 2] = [1920.0, 1080.0];
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self {
            sampling_frequency: Self::DEFAULT_SAMPLING_FREQUENCY,
            enabled: true,
            can_run_in_background: false,
            motor_speeds: (0.0, 0.0),
            dimensions: Self::DEFAULT_DIMENSIONS,
            pointer_position: [0.0; 2],
            sync_requests: 0,
            reset_requests: 0,
        }
    }
}

/// Simulated command backend.
pub struct SimulatedBackend {
    features: BackendFeatures,
    online: bool,
    devices: HashMap<DeviceId, SimulatedDevice>,
}

impl SimulatedBackend {
    /// Registry name.
    pub const NAME: &'static str = "simulated";

    /// Backend answering every command family.
    pub fn new() -> Self {
        Self::with_features(BackendFeatures::all())
    }

    /// Backend answering only `features`.
    pub fn with_features(features: BackendFeatures) -> Self {
        Self {
            features,
            online: true,
            devices: HashMap::new(),
        }
    }

    /// Supported command families.
    pub fn features(&self) -> BackendFeatures {
        self.features
    }

    /// Take the backend on- or offline. Offline, every `send` fails with
    /// `ChannelFailure`.
    pub fn set_online(&mut self, online: bool) {
        if self.online != online {
            info!(
                "Simulated backend going {}",
                if online { "online" } else { "offline" }
            );
        }
        self.online = online;
    }

    /// State of `device`, if it has received any command.
    pub fn device(&self, device: DeviceId) -> Option<&SimulatedDevice> {
        self.devices.get(&device)
    }

    fn execute(&mut self, id: DeviceId, bytes: &[u8]) -> CommandResult<ChannelReply> {
        let header = codec::peek_header(bytes)?;
        let tag = header.tag();
        let Some(family) = family_of(tag) else {
            warn!("Simulated backend received unknown command '{tag}'");
            return Ok(ChannelReply::NotSupported);
        };
        if !self.features.contains(family) {
            debug!("Simulated backend has no {family:?} support for '{tag}'");
            return Ok(ChannelReply::NotSupported);
        }

        let device = self.devices.entry(id).or_default();
        match tag {
            t if t == SetSamplingFrequencyCommand::TYPE => {
                answer(bytes, |c: SetSamplingFrequencyCommand| {
                    device.sampling_frequency = c.frequency();
                    c
                })
            }
            t if t == QuerySamplingFrequencyCommand::TYPE => {
                answer(bytes, |c: QuerySamplingFrequencyCommand| {
                    c.with_frequency(device.sampling_frequency)
                })
            }
            t if t == EnableDeviceCommand::TYPE => answer(bytes, |c: EnableDeviceCommand| {
                device.enabled = true;
                c
            }),
            t if t == DisableDeviceCommand::TYPE => answer(bytes, |c: DisableDeviceCommand| {
                device.enabled = false;
                c
            }),
            t if t == QueryEnabledStateCommand::TYPE => {
                answer(bytes, |c: QueryEnabledStateCommand| {
                    c.with_enabled(device.enabled)
                })
            }
            t if t == RequestSyncCommand::TYPE => answer(bytes, |c: RequestSyncCommand| {
                device.sync_requests += 1;
                c
            }),
            t if t == RequestResetCommand::TYPE => answer(bytes, |c: RequestResetCommand| {
                let resets = device.reset_requests + 1;
                *device = SimulatedDevice {
                    reset_requests: resets,
                    ..SimulatedDevice::default()
                };
                c
            }),
            t if t == QueryCanRunInBackgroundCommand::TYPE => {
                answer(bytes, |c: QueryCanRunInBackgroundCommand| {
                    c.with_can_run_in_background(device.can_run_in_background)
                })
            }
            t if t == DualMotorRumbleCommand::TYPE => {
                answer(bytes, |c: DualMotorRumbleCommand| {
                    device.motor_speeds = (
                        c.low_frequency_motor_speed().clamp(0.0, 1.0),
                        c.high_frequency_motor_speed().clamp(0.0, 1.0),
                    );
                    c
                })
            }
            t if t == QueryDimensionsCommand::TYPE => answer(bytes, |c: QueryDimensionsCommand| {
                let [width, height] = device.dimensions;
                c.with_dimensions(width, height)
            }),
            t if t == WarpMousePositionCommand::TYPE => {
                answer(bytes, |c: WarpMousePositionCommand| {
                    device.pointer_position = c.warp_position();
                    c
                })
            }
            _ => Ok(ChannelReply::NotSupported),
        }
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandChannel for SimulatedBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn send(&mut self, device: DeviceId, command: &[u8]) -> CommandResult<ChannelReply> {
        if !self.online {
            return Err(CommandError::ChannelFailure {
                backend: Self::NAME.to_string(),
                reason: "backend is offline".to_string(),
            });
        }
        self.execute(device, command)
    }
}

/// Feature family a command tag belongs to.
fn family_of(tag: FourCC) -> Option<BackendFeatures> {
    let family = match tag {
        t if t == SetSamplingFrequencyCommand::TYPE || t == QuerySamplingFrequencyCommand::TYPE => {
            BackendFeatures::SAMPLING
        }
        t if t == EnableDeviceCommand::TYPE
            || t == DisableDeviceCommand::TYPE
            || t == QueryEnabledStateCommand::TYPE =>
        {
            BackendFeatures::ENABLE
        }
        t if t == RequestSyncCommand::TYPE || t == RequestResetCommand::TYPE => {
            BackendFeatures::SYNC
        }
        t if t == QueryCanRunInBackgroundCommand::TYPE => BackendFeatures::BACKGROUND,
        t if t == DualMotorRumbleCommand::TYPE => BackendFeatures::HAPTICS,
        t if t == QueryDimensionsCommand::TYPE || t == WarpMousePositionCommand::TYPE => {
            BackendFeatures::POINTER
        }
        _ => return None,
    };
    Some(family)
}

/// Decode a `C`, apply `handle`, and send the result back as the response.
fn answer<C: DeviceCommand>(bytes: &[u8], handle: impl FnOnce(C) -> C) -> CommandResult<ChannelReply> {
    let command = codec::decode::<C>(bytes)?;
    ChannelReply::response(codec::encode(&handle(command)))
}
