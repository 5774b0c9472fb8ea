//! Input Common Library
//!
//! Shared building blocks for the input state workspace: the identifiers,
//! limits and helpers that both the state layout engine and the device
//! command protocol depend on.
//!
//! # Module Structure
//!
//! - [`fourcc`] - Packed four-character identifiers (format tags, command types)
//! - [`bits`] - Pure mask/shift helpers for sub-byte bit fields
//! - [`device`] - Device identity shared by state views and command channels
//! - [`consts`] - Workspace-wide numeric limits
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use input_common::fourcc::FourCC;
//!
//! let tag = FourCC::new(b'S', b'S', b'F', b'Q');
//! assert_eq!(tag.to_string(), "SSFQ");
//! ```

pub mod bits;
pub mod config;
pub mod consts;
pub mod device;
pub mod fourcc;
pub mod prelude;
