//! Property-based round-trip tests (spec §8's universal properties),
//! generating arbitrary `Value` trees and checking they survive
//! `pack`/`unpack` intact.
use fog_wire::{pack, unpack, Config, Decoder, IntInteropMode, Value};
use indexmap::IndexMap;
use proptest::prelude::*;

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::Float64),
        any::<String>().prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    leaf_value().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::List),
            prop::collection::vec((any::<String>(), inner), 0..8).prop_map(|entries| {
                let mut m = IndexMap::new();
                for (k, v) in entries {
                    m.insert(Value::Text(k), v);
                }
                Value::Map(m)
            }),
        ]
    })
}

proptest! {
    /// Property 1: `unpack(pack(v)) == v` for arbitrary value trees (NaN
    /// compared via `roundtrip_eq`, not bitwise `PartialEq`).
    #[test]
    fn roundtrip_identity(v in arb_value()) {
        let bytes = pack(&v, None).unwrap();
        let back = unpack(&bytes, None).unwrap();
        prop_assert!(v.roundtrip_eq(&back), "{:?} != {:?}", v, back);
    }

    /// Property 7: `skipValue` leaves the cursor exactly where `unpack`
    /// would.
    #[test]
    fn skip_equivalence(v in arb_value()) {
        let bytes = pack(&v, None).unwrap();

        let mut unpacker = Decoder::new(&bytes);
        unpacker.unpack().unwrap();
        let unpack_offset = unpacker.offset();

        let mut skipper = Decoder::new(&bytes);
        skipper.skip_value().unwrap();
        prop_assert_eq!(skipper.offset(), unpack_offset);
    }

    /// Property 2 (strings): the chosen string prefix family is the
    /// smallest one whose width admits the actual UTF-8 byte length.
    #[test]
    fn string_size_class_is_minimal(s in any::<String>()) {
        let bytes = pack(&Value::Text(s.clone()), None).unwrap();
        let len = s.len();
        let prefix = bytes[0];
        if len <= 0x1F {
            prop_assert!((0xA0..=0xBF).contains(&prefix));
        } else if len <= u8::MAX as usize {
            prop_assert_eq!(prefix, 0xD9);
        } else if len <= u16::MAX as usize {
            prop_assert_eq!(prefix, 0xDA);
        } else {
            prop_assert_eq!(prefix, 0xDB);
        }
    }

    /// Property 6: with `deterministicMaps = false` (the default), two
    /// text-keyed maps with identical entries but different insertion
    /// order are not guaranteed to agree byte-for-byte, but they are
    /// always semantically round-trip-equal regardless of order.
    #[test]
    fn map_insertion_order_is_irrelevant_to_decoded_value(
        entries in prop::collection::vec((any::<String>(), any::<i64>()), 1..6)
    ) {
        let mut forward = IndexMap::new();
        let mut backward = IndexMap::new();
        for (k, v) in &entries {
            forward.insert(Value::Text(k.clone()), Value::from(*v));
        }
        for (k, v) in entries.iter().rev() {
            backward.insert(Value::Text(k.clone()), Value::from(*v));
        }

        let a = unpack(&pack(&Value::Map(forward), None).unwrap(), None).unwrap();
        let b = unpack(&pack(&Value::Map(backward), None).unwrap(), None).unwrap();
        prop_assert!(a.roundtrip_eq(&b));
    }

    /// Property 8: lowering a cap below a value's actual size makes `pack`
    /// fail with `limit-exceeded`.
    #[test]
    fn cap_enforcement_rejects_oversized_strings(extra in 1usize..16) {
        let s = "x".repeat(10 + extra);
        let config = Config::new().max_string_utf8_bytes(10);
        prop_assert!(pack(&Value::Text(s), Some(config)).is_err());
    }

    /// Property 10 (partial): under `requireBigIntForWide`, any host
    /// integer outside the safe window fails to encode.
    #[test]
    fn require_bigint_for_wide_rejects_all_out_of_window_ints(
        v in prop_oneof![(1i64 << 53)..i64::MAX, i64::MIN..=-(1i64 << 53)]
    ) {
        let config = Config::new().int_interop_mode(IntInteropMode::RequireBigIntForWide);
        prop_assert!(pack(&Value::from(v), Some(config)).is_err());
    }
}
