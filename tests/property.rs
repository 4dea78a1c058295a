use packed_signer::packed::{IntValue, PackingContext, U256};
use packed_signer::{
    keccak256, pack_all, to_checksum_address, PackedDecoder, PackedEncoder, SolType, SolValue,
    TypedArg,
};
use proptest::prelude::*;

fn any_u256() -> impl Strategy<Value = U256> {
    prop::array::uniform4(any::<u64>()).prop_map(U256)
}

fn any_int_width() -> impl Strategy<Value = usize> {
    (1usize..=32).prop_map(|bytes| bytes * 8)
}

/// An unsigned value that fits in `bits`
fn truncate(value: U256, bits: usize) -> U256 {
    let bytes = value.to_be_bytes();
    let width = bits / 8;
    U256::from_be_bytes(&bytes[32 - width..]).expect("at most 32 bytes")
}

fn pack_one(sol_type: &SolType, value: SolValue, context: PackingContext) -> Vec<u8> {
    PackedEncoder::default()
        .pack(sol_type, &value, context)
        .expect("value fits its type")
}

proptest! {
    #[test]
    fn checksum_addresses_roundtrip(bytes in prop::array::uniform20(any::<u8>())) {
        let checksummed = to_checksum_address(&bytes);
        prop_assert!(checksummed.starts_with("0x"));

        let tail = checksummed.trim_start_matches("0x");
        let lower_expected = hex::encode(bytes);
        prop_assert_eq!(tail.to_ascii_lowercase(), lower_expected.clone());

        let hash = keccak256(lower_expected.as_bytes());
        for (i, ch) in tail.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if ch.is_ascii_alphabetic() {
                prop_assert_eq!(ch.is_ascii_uppercase(), nibble >= 8);
            }
        }
    }

    #[test]
    fn packing_is_deterministic(value in any_u256(), flag in any::<bool>(), text in ".{0,40}") {
        let types = ["uint256", "bool", "string"];
        let values = [SolValue::from(value), flag.into(), text.as_str().into()];
        let first = pack_all(&types, &values).expect("packs");
        let second = pack_all(&types, &values).expect("packs");
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), 32 + 1 + text.len());
    }

    #[test]
    fn integer_fragment_widths(bits in any_int_width(), raw in any_u256()) {
        let sol_type = SolType::uint(bits);
        let value = truncate(raw, bits);

        let top = pack_one(&sol_type, value.into(), PackingContext::TopLevel);
        prop_assert_eq!(top.len(), bits / 8);
        prop_assert_eq!(&top[..], &value.to_be_bytes()[32 - bits / 8..]);

        let element = pack_one(&sol_type, value.into(), PackingContext::ArrayElement);
        prop_assert_eq!(element.len(), 32);
        prop_assert_eq!(element, value.to_be_bytes().to_vec());
    }

    #[test]
    fn fixed_bytes_are_right_padded_in_arrays(data in prop::collection::vec(any::<u8>(), 1..=32)) {
        let sol_type = SolType::FixedBytes(data.len());

        let top = pack_one(&sol_type, data.clone().into(), PackingContext::TopLevel);
        prop_assert_eq!(&top, &data);

        let element = pack_one(&sol_type, data.clone().into(), PackingContext::ArrayElement);
        prop_assert_eq!(element.len(), 32);
        prop_assert_eq!(&element[..data.len()], &data[..]);
        prop_assert!(element[data.len()..].iter().all(|b| *b == 0));
    }

    #[test]
    fn address_and_bool_are_left_padded_in_arrays(address in prop::array::uniform20(any::<u8>()), flag in any::<bool>()) {
        let packed = pack_one(&SolType::Address, address.to_vec().into(), PackingContext::ArrayElement);
        prop_assert_eq!(&packed[..12], &[0u8; 12][..]);
        prop_assert_eq!(&packed[12..], &address[..]);

        let packed = pack_one(&SolType::Bool, flag.into(), PackingContext::ArrayElement);
        prop_assert_eq!(&packed[..31], &[0u8; 31][..]);
        prop_assert_eq!(packed[31], flag as u8);
    }

    #[test]
    fn negative_integers_are_twos_complement(a in any::<i8>(), b in any::<i16>(), c in any::<i64>()) {
        let packed = pack_all(&["int8", "int16", "int64"], &[a.into(), b.into(), c.into()]).expect("packs");

        let mut expected = Vec::new();
        expected.extend_from_slice(&a.to_be_bytes());
        expected.extend_from_slice(&b.to_be_bytes());
        expected.extend_from_slice(&c.to_be_bytes());
        prop_assert_eq!(packed, expected);
    }

    #[test]
    fn int256_matches_wrapping_negation(raw in any_u256()) {
        // clear the top bit so the magnitude fits int256
        let mut magnitude = raw;
        magnitude.0[3] &= u64::MAX >> 1;
        let value = IntValue::new(true, magnitude);

        let packed = pack_one(&SolType::int(256), value.into(), PackingContext::TopLevel);
        prop_assert_eq!(packed, magnitude.wrapping_neg().to_be_bytes().to_vec());
    }

    #[test]
    fn out_of_range_integers_are_rejected(bits in (1usize..32).prop_map(|b| b * 8), raw in any_u256()) {
        let too_big = U256::ONE;
        let limit = (0..bits).fold(too_big, |acc, _| acc.checked_mul_u64(2).expect("below 2^256"));
        let value = limit.checked_add(truncate(raw, bits)).expect("below 2^256");

        let result = pack_all(&[SolType::uint(bits).to_string()], &[value.into()]);
        prop_assert!(result.is_err());
    }

    #[test]
    fn decode_then_repack(
        address in prop::array::uniform20(any::<u8>()),
        amount in any_u256(),
        flag in any::<bool>(),
        note in "[a-zA-Z0-9 ]{0,64}",
    ) {
        let types: Vec<SolType> = ["address", "uint256", "bool", "string"]
            .iter()
            .map(|d| d.parse().expect("valid descriptor"))
            .collect();
        let values = vec![
            SolValue::from(address.to_vec()),
            amount.into(),
            flag.into(),
            note.as_str().into(),
        ];
        let args: Vec<TypedArg> = types
            .iter()
            .cloned()
            .zip(values)
            .map(|(t, v)| TypedArg::new(t, v))
            .collect();

        let encoder = PackedEncoder::default();
        let packed = encoder.pack_args(&args).expect("packs");
        let decoded = PackedDecoder::decode(&packed, &types).expect("decodes");
        prop_assert_eq!(&decoded[3], &SolValue::Text(note.clone()));

        let repacked_args: Vec<TypedArg> = types
            .into_iter()
            .zip(decoded)
            .map(|(t, v)| TypedArg::new(t, v))
            .collect();
        prop_assert_eq!(encoder.pack_args(&repacked_args).expect("repacks"), packed);
    }
}
