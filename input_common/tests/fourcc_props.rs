//! Property tests for FourCC packing.

use input_common::fourcc::FourCC;
use proptest::prelude::*;

proptest! {
    #[test]
    fn unpack_returns_original_characters(bytes in any::<[u8; 4]>()) {
        let code = FourCC::from_bytes(bytes);
        prop_assert_eq!(code.to_bytes(), bytes);
    }

    #[test]
    fn packing_is_injective(a in any::<[u8; 4]>(), b in any::<[u8; 4]>()) {
        let (ca, cb) = (FourCC::from_bytes(a), FourCC::from_bytes(b));
        prop_assert_eq!(ca == cb, a == b);
        prop_assert_eq!(ca.cmp(&cb), ca.as_u32().cmp(&cb.as_u32()));
    }

    #[test]
    fn printable_codes_survive_text_round_trip(text in "[A-Z0-9 ]{4}") {
        let code = FourCC::parse(&text).unwrap();
        prop_assert_eq!(code.to_string(), text);
    }
}
