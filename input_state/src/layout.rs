//! Device layout compilation.
//!
//! Turns a declared control tree into one [`StateBlock`] per control.
//!
//! ## Placement rules
//!
//! - Controls are visited depth-first in declaration order.
//! - A control with an explicit `offset` is placed there, relative to its
//!   parent group (top-level controls are relative to the device state).
//!   An explicit `bit` is folded into the byte offset when >= 8.
//! - Other leaves are placed at the automatic cursor: byte-aligned for
//!   byte formats, packed into the current byte for bit fields (`BIT `,
//!   `SBIT`) when the field still fits, otherwise at the next byte.
//! - Every placed control moves the cursor past its last bit. The cursor
//!   never moves backwards.
//! - A group's children start at the group's offset; the group itself gets
//!   a block covering its children, byte-aligned.
//!
//! ## Rejections
//!
//! A layout is refused as a whole. Leaf blocks must fit the device's
//! `max_state_size`, bit fields must stay inside one byte, and leaves may
//! not overlap.
//!
//! The same tree always yields the same blocks.

use crate::block::StateBlock;
use crate::error::{LayoutError, LayoutResult};
use crate::format::{FormatKind, StateFormat};
use input::bits;
use input::consts::{DEFAULT_MAX_STATE_SIZE, PATH_SEPARATOR};
use input::fourcc::FourCC;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

fn default_max_state_size() -> u32 {
    DEFAULT_MAX_STATE_SIZE
}

/// Declaration of one control, as written in a device config.
///
/// # TOML Example
///
/// ```toml
/// [[device.controls]]
/// name = "buttonSouth"
/// format = "BIT"
/// offset = 4
/// bit = 0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlDecl {
    /// Name, unique among siblings. Must not contain `/`.
    pub name: String,

    /// Value encoding. Groups may use any tag.
    pub format: StateFormat,

    /// Explicit byte offset relative to the parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Explicit bit offset. Without `offset` it applies to the byte the
    /// cursor is currently packing.
    #[serde(default, rename = "bit", skip_serializing_if = "Option::is_none")]
    pub bit_offset: Option<u32>,

    /// Width in bits. Defaults to the format's natural width.
    #[serde(default, rename = "bits", skip_serializing_if = "Option::is_none")]
    pub size_in_bits: Option<u32>,

    /// Child controls. A control with children is a group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ControlDecl>,
}

impl ControlDecl {
    /// Leaf control placed automatically.
    pub fn new(name: impl Into<String>, format: StateFormat) -> Self {
        Self {
            name: name.into(),
            format,
            offset: None,
            bit_offset: None,
            size_in_bits: None,
            children: Vec::new(),
        }
    }

    /// Group control over `children`.
    pub fn group(name: impl Into<String>, format: StateFormat, children: Vec<ControlDecl>) -> Self {
        Self {
            children,
            ..Self::new(name, format)
        }
    }

    /// Pin the control to a byte offset.
    pub fn at(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Pin the control to a byte and bit offset.
    pub fn at_bit(mut self, offset: u32, bit_offset: u32) -> Self {
        self.offset = Some(offset);
        self.bit_offset = Some(bit_offset);
        self
    }

    /// Override the width.
    pub fn bits(mut self, size_in_bits: u32) -> Self {
        self.size_in_bits = Some(size_in_bits);
        self
    }

    /// Whether this declaration is a group.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Declaration of a whole device: its state format, size limit and
/// control tree. The `[device]` table of a device config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDecl {
    /// Device type name (`"gamepad"`).
    pub name: String,

    /// Tag of the device's state format (`'GPAD'`).
    pub format: FourCC,

    /// Largest state region the layout may use, in bytes.
    #[serde(default = "default_max_state_size")]
    pub max_state_size: u32,

    /// Top-level controls.
    #[serde(default)]
    pub controls: Vec<ControlDecl>,
}

impl DeviceDecl {
    /// Device with the default state size limit.
    pub fn new(name: impl Into<String>, format: FourCC, controls: Vec<ControlDecl>) -> Self {
        Self {
            name: name.into(),
            format,
            max_state_size: DEFAULT_MAX_STATE_SIZE,
            controls,
        }
    }

    /// Override the state size limit.
    pub fn with_max_state_size(mut self, max_state_size: u32) -> Self {
        self.max_state_size = max_state_size;
        self
    }
}

/// One compiled control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlLayout {
    /// Slash-separated path from the device root (`"leftStick/x"`).
    pub path: String,
    /// Resolved location and encoding.
    pub block: StateBlock,
    /// Whether the control is a group covering other controls.
    pub is_group: bool,
}

/// Compiled, immutable layout of one device type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceLayout {
    name: String,
    format: FourCC,
    state_size_in_bytes: u32,
    controls: Vec<ControlLayout>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DeviceLayout {
    /// Device type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device state format tag.
    pub fn format(&self) -> FourCC {
        self.format
    }

    /// Bytes a state buffer must hold: end of the furthest control.
    pub fn state_size_in_bytes(&self) -> u32 {
        self.state_size_in_bytes
    }

    /// All controls, depth-first in declaration order.
    pub fn controls(&self) -> &[ControlLayout] {
        &self.controls
    }

    /// Leaf controls only.
    pub fn leaves(&self) -> impl Iterator<Item = &ControlLayout> {
        self.controls.iter().filter(|c| !c.is_group)
    }

    /// Look up a control by path.
    pub fn get(&self, path: &str) -> Option<&ControlLayout> {
        self.index.get(path).map(|&i| &self.controls[i])
    }

    /// Block of the control at `path`.
    pub fn block(&self, path: &str) -> Option<StateBlock> {
        self.get(path).map(|c| c.block)
    }
}

/// Automatic-placement cursor, in absolute bits.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    next_bit: u64,
}

impl Cursor {
    fn at_byte(byte: u32) -> Self {
        Self {
            next_bit: u64::from(byte) * 8,
        }
    }

    /// First whole byte at or after the cursor.
    fn next_byte(&self) -> u32 {
        self.next_bit.div_ceil(8) as u32
    }

    /// Byte currently being packed.
    fn packing_byte(&self) -> u32 {
        (self.next_bit / 8) as u32
    }

    /// Slot for a bit field of `size_in_bits`: the current byte if it still
    /// fits, else the start of the next.
    fn bit_slot(&self, size_in_bits: u32) -> Option<(u32, u32)> {
        let byte = self.packing_byte();
        let bit = (self.next_bit % 8) as u32;
        if bits::fits_in_byte(bit, size_in_bits) {
            Some((byte, bit))
        } else {
            Some((byte.checked_add(1)?, 0))
        }
    }

    fn advance_to_bit(&mut self, bit: u64) {
        self.next_bit = self.next_bit.max(bit);
    }

    fn advance_to_byte(&mut self, byte: u32) {
        self.advance_to_bit(u64::from(byte) * 8);
    }
}

/// Working state for one `compute_layout` call.
struct LayoutBuilder {
    limit: u32,
    controls: Vec<ControlLayout>,
    index: HashMap<String, usize>,
    /// Indices of placed leaves, for overlap checks.
    leaves: Vec<usize>,
}

impl LayoutBuilder {
    fn new(limit: u32) -> Self {
        Self {
            limit,
            controls: Vec::new(),
            index: HashMap::new(),
            leaves: Vec::new(),
        }
    }

    fn push(&mut self, path: String, block: StateBlock, is_group: bool) -> LayoutResult<usize> {
        if self.index.contains_key(&path) {
            return Err(LayoutError::DuplicateControl { path });
        }
        let idx = self.controls.len();
        self.index.insert(path.clone(), idx);
        self.controls.push(ControlLayout {
            path,
            block,
            is_group,
        });
        Ok(idx)
    }

    /// Place `decls` starting at `base`; returns the first byte after the
    /// furthest placed control.
    fn place_all(&mut self, decls: &[ControlDecl], base: u32, prefix: &str) -> LayoutResult<u32> {
        let mut cursor = Cursor::at_byte(base);
        let mut end = base;
        for decl in decls {
            let path = join_path(prefix, &decl.name)?;
            let control_end = if decl.is_group() {
                self.place_group(decl, base, path, &mut cursor)?
            } else {
                self.place_leaf(decl, base, path, &mut cursor)?
            };
            end = end.max(control_end);
        }
        Ok(end)
    }

    fn place_group(
        &mut self,
        decl: &ControlDecl,
        base: u32,
        path: String,
        cursor: &mut Cursor,
    ) -> LayoutResult<u32> {
        let offset = match decl.offset {
            Some(o) => base.checked_add(o).ok_or_else(|| unaddressable(&path, self.limit))?,
            None => cursor.next_byte(),
        };

        // Reserve the group's slot so it precedes its children.
        let slot = self.push(path.clone(), StateBlock::new(decl.format, offset, 0, 0), true)?;
        let children_end = self.place_all(&decl.children, offset, &path)?;

        let block = decl
            .size_in_bits
            .or_else(|| (children_end - offset).checked_mul(8))
            .and_then(|size_in_bits| StateBlock::checked(decl.format, offset, 0, size_in_bits))
            .ok_or_else(|| unaddressable(&path, self.limit))?;
        if !block.fits_within(self.limit) {
            return Err(LayoutError::LayoutOverflow {
                control: path,
                end: block.end_byte(),
                limit: self.limit,
            });
        }
        self.controls[slot].block = block;

        let end = block.end_byte().max(children_end);
        cursor.advance_to_byte(end);
        Ok(end)
    }

    fn place_leaf(
        &mut self,
        decl: &ControlDecl,
        base: u32,
        path: String,
        cursor: &mut Cursor,
    ) -> LayoutResult<u32> {
        let Some(kind) = decl.format.kind() else {
            return Err(LayoutError::UnknownFormat {
                control: path,
                format: decl.format,
            });
        };

        let size_in_bits = decl.size_in_bits.unwrap_or(kind.natural_size_in_bits());
        if !kind.accepts_size(size_in_bits) {
            return Err(LayoutError::UnsupportedSize {
                control: path,
                format: decl.format,
                size_in_bits,
            });
        }

        let slot = match (decl.offset, decl.bit_offset) {
            (Some(offset), bit) => base.checked_add(offset).map(|byte| (byte, bit.unwrap_or(0))),
            (None, Some(bit)) => Some((cursor.packing_byte(), bit)),
            (None, None) if kind.is_bit_field() => cursor.bit_slot(size_in_bits),
            (None, None) => Some((cursor.next_byte(), 0)),
        };
        let Some(block) = slot
            .and_then(|(byte, bit)| StateBlock::checked(decl.format, byte, bit, size_in_bits))
        else {
            return Err(unaddressable(&path, self.limit));
        };

        check_bit_span(&path, kind, &block)?;
        if !block.fits_within(self.limit) {
            return Err(LayoutError::LayoutOverflow {
                control: path,
                end: block.end_byte(),
                limit: self.limit,
            });
        }
        if let Some(&other) = self
            .leaves
            .iter()
            .find(|&&i| self.controls[i].block.overlaps(&block))
        {
            return Err(LayoutError::Overlap {
                control: path,
                other: self.controls[other].path.clone(),
            });
        }

        let idx = self.push(path, block, false)?;
        self.leaves.push(idx);
        cursor.advance_to_bit(block.end_bit());
        Ok(block.end_byte())
    }
}

/// Offsets past `u32::MAX` bytes can never fit any state region.
fn unaddressable(path: &str, limit: u32) -> LayoutError {
    LayoutError::LayoutOverflow {
        control: path.to_string(),
        end: u32::MAX,
        limit,
    }
}

/// Bit fields must stay inside one byte; byte formats must start on a byte.
fn check_bit_span(path: &str, kind: FormatKind, block: &StateBlock) -> LayoutResult<()> {
    let ok = if kind.is_bit_field() {
        bits::fits_in_byte(block.bit_offset(), block.size_in_bits())
    } else {
        block.bit_offset() == 0
    };
    if ok {
        Ok(())
    } else {
        Err(LayoutError::BitFieldSpansBytes {
            control: path.to_string(),
            bit_offset: block.bit_offset(),
            size_in_bits: block.size_in_bits(),
        })
    }
}

fn join_path(prefix: &str, name: &str) -> LayoutResult<String> {
    if name.is_empty() || name.contains(PATH_SEPARATOR) {
        return Err(LayoutError::InvalidName {
            name: name.to_string(),
        });
    }
    if prefix.is_empty() {
        Ok(name.to_string())
    } else {
        Ok(format!("{prefix}{PATH_SEPARATOR}{name}"))
    }
}

/// Compile a device declaration into its layout.
///
/// # Errors
///
/// Any [`LayoutError`]; the device must not be registered on error.
pub fn compute_layout(device: &DeviceDecl) -> LayoutResult<DeviceLayout> {
    let mut builder = LayoutBuilder::new(device.max_state_size);
    let end = builder
        .place_all(&device.controls, 0, "")
        .inspect_err(|e| warn!("Layout for device '{}' rejected: {e}", device.name))?;

    debug!(
        "Computed layout for '{}' ({}): {} controls, {} of {} bytes",
        device.name,
        device.format,
        builder.controls.len(),
        end,
        device.max_state_size
    );

    Ok(DeviceLayout {
        name: device.name.clone(),
        format: device.format,
        state_size_in_bytes: end,
        controls: builder.controls,
        index: builder.index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(controls: Vec<ControlDecl>) -> DeviceDecl {
        DeviceDecl::new("test", FourCC::from_bytes(*b"TEST"), controls)
    }

    #[test]
    fn byte_formats_pack_consecutively() {
        let layout = compute_layout(&device(vec![
            ControlDecl::new("a", StateFormat::BYTE),
            ControlDecl::new("b", StateFormat::SHORT),
            ControlDecl::new("c", StateFormat::FLOAT),
        ]))
        .unwrap();

        assert_eq!(layout.block("a").unwrap().byte_offset(), 0);
        assert_eq!(layout.block("b").unwrap().byte_offset(), 1);
        assert_eq!(layout.block("c").unwrap().byte_offset(), 3);
        assert_eq!(layout.state_size_in_bytes(), 7);
    }

    #[test]
    fn adjacent_bits_share_a_byte() {
        let layout = compute_layout(&device(vec![
            ControlDecl::new("b0", StateFormat::BIT),
            ControlDecl::new("b1", StateFormat::BIT),
            ControlDecl::new("hat", StateFormat::BIT).bits(4),
            ControlDecl::new("b2", StateFormat::BIT).bits(3),
            ControlDecl::new("x", StateFormat::BYTE),
        ]))
        .unwrap();

        let b1 = layout.block("b1").unwrap();
        assert_eq!((b1.byte_offset(), b1.bit_offset()), (0, 1));
        let hat = layout.block("hat").unwrap();
        assert_eq!((hat.byte_offset(), hat.bit_offset()), (0, 2));
        // 6 bits used, 3 more do not fit: next byte.
        let b2 = layout.block("b2").unwrap();
        assert_eq!((b2.byte_offset(), b2.bit_offset()), (1, 0));
        // Byte formats realign.
        assert_eq!(layout.block("x").unwrap().byte_offset(), 2);
    }

    #[test]
    fn explicit_offsets_move_the_cursor_forward_only() {
        let layout = compute_layout(&device(vec![
            ControlDecl::new("late", StateFormat::INT).at(8),
            ControlDecl::new("auto", StateFormat::BYTE),
            ControlDecl::new("early", StateFormat::BYTE).at(0),
            ControlDecl::new("auto2", StateFormat::BYTE),
        ]))
        .unwrap();

        assert_eq!(layout.block("auto").unwrap().byte_offset(), 12);
        assert_eq!(layout.block("early").unwrap().byte_offset(), 0);
        assert_eq!(layout.block("auto2").unwrap().byte_offset(), 13);
    }

    #[test]
    fn group_children_are_relative_to_group() {
        let layout = compute_layout(&device(vec![
            ControlDecl::new("buttons", StateFormat::USHORT),
            ControlDecl::group(
                "stick",
                StateFormat::new(FourCC::from_bytes(*b"VEC2")),
                vec![
                    ControlDecl::new("x", StateFormat::FLOAT),
                    ControlDecl::new("y", StateFormat::FLOAT).at(4),
                ],
            )
            .at(4),
        ]))
        .unwrap();

        let paths: Vec<_> = layout.controls().iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["buttons", "stick", "stick/x", "stick/y"]);

        let stick = layout.get("stick").unwrap();
        assert!(stick.is_group);
        assert_eq!(stick.block.byte_offset(), 4);
        assert_eq!(stick.block.size_in_bits(), 64);
        assert_eq!(layout.block("stick/x").unwrap().byte_offset(), 4);
        assert_eq!(layout.block("stick/y").unwrap().byte_offset(), 8);
        assert_eq!(layout.leaves().count(), 3);
    }

    #[test]
    fn explicit_bit_offsets_fold_into_bytes() {
        let layout = compute_layout(&device(vec![
            ControlDecl::new("flag", StateFormat::BIT).at_bit(2, 13),
        ]))
        .unwrap();
        let block = layout.block("flag").unwrap();
        assert_eq!((block.byte_offset(), block.bit_offset()), (3, 5));
    }

    #[test]
    fn bit_without_offset_packs_into_current_byte() {
        let layout = compute_layout(&device(vec![
            ControlDecl::new("b0", StateFormat::BIT),
            ControlDecl {
                bit_offset: Some(5),
                ..ControlDecl::new("flag", StateFormat::BIT)
            },
            ControlDecl::new("b6", StateFormat::BIT),
            ControlDecl::new("x", StateFormat::BYTE),
            ControlDecl {
                bit_offset: Some(3),
                ..ControlDecl::new("mode", StateFormat::BIT).bits(2)
            },
        ]))
        .unwrap();

        let flag = layout.block("flag").unwrap();
        assert_eq!((flag.byte_offset(), flag.bit_offset()), (0, 5));
        // The cursor continues after the pinned bit.
        let b6 = layout.block("b6").unwrap();
        assert_eq!((b6.byte_offset(), b6.bit_offset()), (0, 6));
        let mode = layout.block("mode").unwrap();
        assert_eq!((mode.byte_offset(), mode.bit_offset()), (2, 3));
        assert_eq!(layout.state_size_in_bytes(), 3);
    }

    #[test]
    fn offsets_near_u32_max_are_overflow() {
        let err = compute_layout(
            &device(vec![ControlDecl::new("x", StateFormat::INT).at(u32::MAX - 1)])
                .with_max_state_size(16),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::LayoutOverflow {
                control: "x".into(),
                end: u32::MAX,
                limit: 16
            }
        );
        assert!(err.is_overflow());

        let flag = ControlDecl::new("flag", StateFormat::BIT).at_bit(u32::MAX, 8);
        assert!(matches!(
            compute_layout(&device(vec![flag])),
            Err(LayoutError::LayoutOverflow { .. })
        ));
    }

    #[test]
    fn group_offsets_near_u32_max_are_overflow() {
        let vec2 = StateFormat::new(FourCC::from_bytes(*b"VEC2"));
        let nested = ControlDecl::group(
            "stick",
            vec2,
            vec![ControlDecl::new("x", StateFormat::BYTE).at(u32::MAX - 5)],
        )
        .at(10);
        assert!(matches!(
            compute_layout(&device(vec![nested])),
            Err(LayoutError::LayoutOverflow { control, .. }) if control == "stick/x"
        ));

        let last_byte = ControlDecl::group(
            "stick",
            vec2,
            vec![ControlDecl::new("x", StateFormat::BYTE), ControlDecl::new("y", StateFormat::BYTE)],
        )
        .at(u32::MAX);
        assert!(matches!(
            compute_layout(&device(vec![last_byte]).with_max_state_size(u32::MAX)),
            Err(LayoutError::LayoutOverflow { .. })
        ));

        let huge = ControlDecl::group("stick", vec2, vec![ControlDecl::new("x", StateFormat::BYTE)])
            .bits(u32::MAX);
        assert!(matches!(
            compute_layout(&device(vec![huge])),
            Err(LayoutError::LayoutOverflow { control, .. }) if control == "stick"
        ));
    }

    #[test]
    fn cross_byte_bit_field_is_overflow() {
        let err = compute_layout(&device(vec![
            ControlDecl::new("wide", StateFormat::BIT).at_bit(0, 6).bits(4),
        ]))
        .unwrap_err();
        assert!(matches!(err, LayoutError::BitFieldSpansBytes { .. }));
        assert!(err.is_overflow());
    }

    #[test]
    fn misaligned_byte_format_is_rejected() {
        let err = compute_layout(&device(vec![
            ControlDecl::new("x", StateFormat::SHORT).at_bit(0, 3),
        ]))
        .unwrap_err();
        assert!(matches!(err, LayoutError::BitFieldSpansBytes { .. }));
    }

    #[test]
    fn overlapping_leaves_are_rejected() {
        let err = compute_layout(&device(vec![
            ControlDecl::new("a", StateFormat::INT).at(0),
            ControlDecl::new("b", StateFormat::BYTE).at(3),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::Overlap {
                control: "b".into(),
                other: "a".into()
            }
        );
    }

    #[test]
    fn unknown_leaf_format_and_bad_sizes() {
        let vec2 = StateFormat::new(FourCC::from_bytes(*b"VEC2"));
        assert!(matches!(
            compute_layout(&device(vec![ControlDecl::new("v", vec2)])),
            Err(LayoutError::UnknownFormat { .. })
        ));
        assert!(matches!(
            compute_layout(&device(vec![ControlDecl::new("i", StateFormat::INT).bits(16)])),
            Err(LayoutError::UnsupportedSize { size_in_bits: 16, .. })
        ));
    }

    #[test]
    fn names_are_validated() {
        assert!(matches!(
            compute_layout(&device(vec![ControlDecl::new("", StateFormat::BYTE)])),
            Err(LayoutError::InvalidName { .. })
        ));
        assert!(matches!(
            compute_layout(&device(vec![ControlDecl::new("a/b", StateFormat::BYTE)])),
            Err(LayoutError::InvalidName { .. })
        ));
        assert!(matches!(
            compute_layout(&device(vec![
                ControlDecl::new("a", StateFormat::BYTE),
                ControlDecl::new("a", StateFormat::BYTE),
            ])),
            Err(LayoutError::DuplicateControl { .. })
        ));
    }

    #[test]
    fn empty_device_has_zero_state() {
        let layout = compute_layout(&device(Vec::new())).unwrap();
        assert_eq!(layout.state_size_in_bytes(), 0);
        assert!(layout.controls().is_empty());
    }
}
