//! Rust value types a control can decode to.
//!
//! Each type picks the integer or float decode path of the block's
//! [`FormatKind`]; the format owns the numeric conversion (normalization,
//! sign extension, saturation).

use crate::format::FormatKind;

/// A value type readable from and writable to a state block.
pub trait StateValue: Copy + 'static {
    /// Decode from the block's raw bits (zero-extended, right-aligned).
    fn decode(kind: FormatKind, raw: u64, size_in_bits: u32) -> Self;

    /// Encode into raw bits for the block.
    fn encode(self, kind: FormatKind, size_in_bits: u32) -> u64;
}

impl StateValue for bool {
    /// Float formats use a 0.5 press point; integer formats test for a
    /// positive value.
    fn decode(kind: FormatKind, raw: u64, size_in_bits: u32) -> Self {
        if kind.is_float() {
            kind.decode_float(raw, size_in_bits) >= 0.5
        } else {
            kind.decode_int(raw, size_in_bits) > 0
        }
    }

    fn encode(self, kind: FormatKind, size_in_bits: u32) -> u64 {
        kind.encode_int(i128::from(self), size_in_bits)
    }
}

macro_rules! impl_state_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StateValue for $ty {
                fn decode(kind: FormatKind, raw: u64, size_in_bits: u32) -> Self {
                    kind.decode_int(raw, size_in_bits)
                        .clamp(<$ty>::MIN as i128, <$ty>::MAX as i128) as $ty
                }

                fn encode(self, kind: FormatKind, size_in_bits: u32) -> u64 {
                    kind.encode_int(self as i128, size_in_bits)
                }
            }
        )*
    };
}

macro_rules! impl_state_value_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StateValue for $ty {
                fn decode(kind: FormatKind, raw: u64, size_in_bits: u32) -> Self {
                    kind.decode_float(raw, size_in_bits) as $ty
                }

                fn encode(self, kind: FormatKind, size_in_bits: u32) -> u64 {
                    kind.encode_float(self as f64, size_in_bits)
                }
            }
        )*
    };
}

impl_state_value_int!(u8, i8, u16, i16, u32, i32, u64, i64);
impl_state_value_float!(f32, f64);
