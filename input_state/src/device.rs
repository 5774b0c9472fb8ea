//! Devices, state views and typed controls.
//!
//! An [`InputDevice`] pairs a runtime id with its compiled layout. The
//! external state layer owns the byte buffers; the device only binds them
//! into [`StateView`] / [`StateViewMut`] after checking that they cover the
//! whole layout. [`Control`] accessors then read and write through those
//! views without further checks on the hot path.
//!
//! ## Example
//!
//! ```rust
//! use input::device::DeviceId;
//! use input::fourcc::FourCC;
//! use input_state::{ControlDecl, DeviceDecl, InputDevice, StateFormat};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let decl = DeviceDecl::new(
//!     "pedal",
//!     FourCC::from_bytes(*b"PEDL"),
//!     vec![ControlDecl::new("throttle", StateFormat::BYTE)],
//! );
//! let device = InputDevice::build(DeviceId(7), &decl)?;
//! let throttle = device.control::<f32>("throttle")?;
//!
//! let mut state = vec![0u8; device.state_size()];
//! let mut view = device.view_mut(&mut state)?;
//! throttle.write(&mut view, 1.0);
//! assert_eq!(throttle.read(&view), 1.0);
//! # Ok(())
//! # }
//! ```

use crate::access;
use crate::block::StateBlock;
use crate::error::{LayoutError, LayoutResult, StateError, StateResult};
use crate::format::FormatKind;
use crate::layout::{DeviceDecl, DeviceLayout, compute_layout};
use crate::value::StateValue;
use input::device::DeviceId;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::info;

/// A device instance bound to its compiled layout.
#[derive(Debug, Clone)]
pub struct InputDevice {
    id: DeviceId,
    layout: Arc<DeviceLayout>,
}

impl InputDevice {
    /// Wrap an already compiled layout. Layouts are shared between devices
    /// of the same type.
    pub fn new(id: DeviceId, layout: Arc<DeviceLayout>) -> Self {
        Self { id, layout }
    }

    /// Compile `decl` and bind it to `id`.
    ///
    /// # Errors
    ///
    /// Any [`LayoutError`] from [`compute_layout`]; the device is not created.
    pub fn build(id: DeviceId, decl: &DeviceDecl) -> LayoutResult<Self> {
        let layout = compute_layout(decl)?;
        info!(
            "Registered {} as '{}' ({} bytes of state)",
            id,
            layout.name(),
            layout.state_size_in_bytes()
        );
        Ok(Self::new(id, Arc::new(layout)))
    }

    /// Runtime id.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Compiled layout.
    pub fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    /// Bytes a state buffer must hold.
    pub fn state_size(&self) -> usize {
        self.layout.state_size_in_bytes() as usize
    }

    /// Typed accessor for the control at `path`.
    ///
    /// # Errors
    ///
    /// - `LayoutError::UnknownControl` if the path is not in the layout
    /// - `LayoutError::TypeMismatch` if the control's format has no decode
    ///   rule (group controls such as `VEC2`)
    pub fn control<T: StateValue>(&self, path: &str) -> LayoutResult<Control<T>> {
        let entry = self.layout.get(path).ok_or_else(|| LayoutError::UnknownControl {
            path: path.to_string(),
        })?;
        let kind = entry.block.kind().ok_or_else(|| LayoutError::TypeMismatch {
            path: path.to_string(),
            format: entry.block.format(),
        })?;
        Ok(Control {
            device: self.id,
            block: entry.block,
            kind,
            _value: PhantomData,
        })
    }

    fn check_len(&self, actual: usize) -> StateResult<()> {
        let required = self.state_size();
        if actual < required {
            return Err(StateError::BufferTooSmall {
                device: self.id,
                required,
                actual,
            });
        }
        Ok(())
    }

    /// Bind a read-only state buffer.
    ///
    /// # Errors
    ///
    /// `StateError::BufferTooSmall` if `bytes` does not cover the layout.
    pub fn view<'a>(&self, bytes: &'a [u8]) -> StateResult<StateView<'a>> {
        self.check_len(bytes.len())?;
        Ok(StateView {
            device: self.id,
            bytes,
        })
    }

    /// Bind a writable state buffer.
    ///
    /// # Errors
    ///
    /// `StateError::BufferTooSmall` if `bytes` does not cover the layout.
    pub fn view_mut<'a>(&self, bytes: &'a mut [u8]) -> StateResult<StateViewMut<'a>> {
        self.check_len(bytes.len())?;
        Ok(StateViewMut {
            device: self.id,
            bytes,
        })
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::StateView<'_> {}
    impl Sealed for super::StateViewMut<'_> {}
}

/// Read access to a device's state bytes.
///
/// Sealed: only the length-checked views returned by
/// [`InputDevice::view`] and [`InputDevice::view_mut`] implement it.
pub trait StateBytes: sealed::Sealed {
    /// Device the bytes belong to.
    fn device(&self) -> DeviceId;
    /// The raw state.
    fn bytes(&self) -> &[u8];
}

/// Read-only state buffer, length-checked against a device layout.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    device: DeviceId,
    bytes: &'a [u8],
}

impl StateBytes for StateView<'_> {
    fn device(&self) -> DeviceId {
        self.device
    }

    fn bytes(&self) -> &[u8] {
        self.bytes
    }
}

/// Writable state buffer, length-checked against a device layout.
#[derive(Debug)]
pub struct StateViewMut<'a> {
    device: DeviceId,
    bytes: &'a mut [u8],
}

impl StateViewMut<'_> {
    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> StateView<'_> {
        StateView {
            device: self.device,
            bytes: &*self.bytes,
        }
    }
}

impl StateBytes for StateViewMut<'_> {
    fn device(&self) -> DeviceId {
        self.device
    }

    fn bytes(&self) -> &[u8] {
        &*self.bytes
    }
}

/// Typed accessor for one control of one device.
///
/// Holds no value: every `read` decodes the current bytes of the view.
#[derive(Debug)]
pub struct Control<T> {
    device: DeviceId,
    block: StateBlock,
    kind: FormatKind,
    _value: PhantomData<fn() -> T>,
}

// Manual impls: `T` itself need not be Clone for the accessor to be.
impl<T> Clone for Control<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Control<T> {}

impl<T: StateValue> Control<T> {
    /// Owning device.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Location and encoding.
    pub fn block(&self) -> &StateBlock {
        &self.block
    }

    /// Decode the control's current value.
    ///
    /// # Panics
    ///
    /// If `view` belongs to another device.
    pub fn read(&self, view: &impl StateBytes) -> T {
        assert_eq!(
            view.device(),
            self.device,
            "control of {} read through a view of {}",
            self.device,
            view.device()
        );
        access::read_value(view.bytes(), &self.block, self.kind)
    }

    /// Encode `value` into the control's bits, preserving sibling bits.
    ///
    /// # Panics
    ///
    /// If `view` belongs to another device.
    pub fn write(&self, view: &mut StateViewMut<'_>, value: T) {
        assert_eq!(
            view.device, self.device,
            "control of {} written through a view of {}",
            self.device, view.device
        );
        access::write_value(view.bytes, &self.block, self.kind, value);
    }
}
