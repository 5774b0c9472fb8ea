//! Device configuration files.
//!
//! A device config declares one device type: the shared section plus a
//! `[device]` table holding the control tree.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! service_name = "gamepad-probe"
//!
//! [device]
//! name = "gamepad"
//! format = "GPAD"
//! max_state_size = 16
//!
//! [[device.controls]]
//! name = "buttonSouth"
//! format = "BIT"
//!
//! [[device.controls]]
//! name = "leftStick"
//! format = "VEC2"
//! offset = 4
//! children = [
//!     { name = "x", format = "FLT" },
//!     { name = "y", format = "FLT" },
//! ]
//! ```

use crate::layout::{ControlDecl, DeviceDecl};
use input::config::{ConfigError, SharedConfig};
use serde::{Deserialize, Serialize};

/// Top-level device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Common settings.
    pub shared: SharedConfig,
    /// Device declaration.
    pub device: DeviceDecl,
}

impl DeviceConfig {
    /// Validate the configuration before a layout is computed.
    ///
    /// Placement errors (overflow, overlap) are left to the layout builder;
    /// this only catches values no layout could accept.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - the shared section is invalid
    /// - `device.name` is empty
    /// - `device.max_state_size` is zero
    /// - `device.format` or a control format is not printable ASCII
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.device.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "device.name cannot be empty".to_string(),
            ));
        }
        if self.device.max_state_size == 0 {
            return Err(ConfigError::ValidationError(format!(
                "device '{}': max_state_size must be greater than 0",
                self.device.name
            )));
        }
        if !self.device.format.is_printable() {
            return Err(ConfigError::ValidationError(format!(
                "device '{}': format {:?} is not printable",
                self.device.name, self.device.format
            )));
        }
        validate_controls(&self.device.controls)
    }
}

fn validate_controls(controls: &[ControlDecl]) -> Result<(), ConfigError> {
    for control in controls {
        if !control.format.tag().is_printable() {
            return Err(ConfigError::ValidationError(format!(
                "control '{}': format {:?} is not printable",
                control.name, control.format
            )));
        }
        validate_controls(&control.children)?;
    }
    Ok(())
}
