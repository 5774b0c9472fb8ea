//! Prelude module for common re-exports.
//!
//! `use input_common::prelude::*;` brings in the identifiers and
//! configuration types most callers need.

// ─── Identity ───────────────────────────────────────────────────────
pub use crate::device::DeviceId;
pub use crate::fourcc::FourCC;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Limits ─────────────────────────────────────────────────────────
pub use crate::consts::{COMMAND_HEADER_SIZE, DEFAULT_MAX_STATE_SIZE, MAX_COMMAND_SIZE};
