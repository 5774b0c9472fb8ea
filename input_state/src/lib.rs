//! # Input State Layout Engine
//!
//! Describes where each control of an input device lives inside a raw
//! device state buffer and decodes values from it on demand.
//!
//! ## Features
//!
//! - **Format Tags**: Four-character codes name the encoding of each value
//!   (`BIT `, `SBIT`, `BYTE`, `SHRT`, `INT `, `FLT `, ...)
//! - **Bit Packing**: Sub-byte fields share a byte; writes preserve siblings
//! - **Deterministic Layout**: The same control tree always yields the same
//!   offsets, and a layout that does not fit is refused whole
//! - **No Copies**: Controls decode straight from the caller's bytes each read
//!
//! ## Architecture Overview
//!
//! ```text
//! DeviceDecl ──compute_layout──► DeviceLayout ──► InputDevice
//!  (TOML)                        (StateBlocks)        │
//!                                                     ├─ control::<T>(path) ─► Control<T>
//!                                                     └─ view(&[u8])        ─► StateView
//!
//! Control<T>::read(&StateView) ─► access ─► FormatKind::decode_* ─► T
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use input::device::DeviceId;
//! use input::fourcc::FourCC;
//! use input_state::{ControlDecl, DeviceDecl, InputDevice, StateFormat};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let decl = DeviceDecl::new(
//!     "buttons",
//!     FourCC::from_bytes(*b"BTNS"),
//!     vec![
//!         ControlDecl::new("counter", StateFormat::INT),
//!         ControlDecl::new("a", StateFormat::BIT).at_bit(4, 0),
//!         ControlDecl::new("b", StateFormat::BIT).at_bit(4, 1),
//!     ],
//! );
//! let device = InputDevice::build(DeviceId(1), &decl)?;
//! let a = device.control::<bool>("a")?;
//! let b = device.control::<bool>("b")?;
//!
//! let mut state = vec![0u8; device.state_size()];
//! let mut view = device.view_mut(&mut state)?;
//! a.write(&mut view, true);
//! b.write(&mut view, false);
//! assert!(a.read(&view));
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod block;
pub mod config;
pub mod device;
pub mod error;
pub mod format;
pub mod layout;
pub mod value;

pub use access::{check_block, try_read_value, try_write_value};
pub use block::StateBlock;
pub use config::DeviceConfig;
pub use device::{Control, InputDevice, StateBytes, StateView, StateViewMut};
pub use error::{LayoutError, LayoutResult, StateError, StateResult};
pub use format::{FormatKind, StateFormat};
pub use layout::{ControlDecl, ControlLayout, DeviceDecl, DeviceLayout, compute_layout};
pub use value::StateValue;
