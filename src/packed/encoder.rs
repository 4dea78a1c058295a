//! Tight-packing encoder (`abi.encodePacked` layout)

use std::str::FromStr;

use super::types::*;
use super::value::*;
use crate::utils::crypto::{decode_hex_lenient, left_pad, right_pad, strip_hex_prefix, WORD_SIZE};

/// What to do with `string`/`bytes` values found inside arrays.
///
/// Solidity refuses to pack them. Web3j-style signers pack them unpadded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DynamicElementPolicy {
    /// Pack unpadded, byte-identical to top level
    #[default]
    Permissive,
    /// Raise `InvalidValue`
    Reject,
}

impl FromStr for DynamicElementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(DynamicElementPolicy::Permissive),
            "reject" => Ok(DynamicElementPolicy::Reject),
            other => Err(format!(
                "unknown dynamic array element policy '{}' (expected permissive or reject)",
                other
            )),
        }
    }
}

/// Encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackOptions {
    pub dynamic_array_elements: DynamicElementPolicy,
}

/// One parsed (type, value) argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedArg {
    pub sol_type: SolType,
    pub value: SolValue,
}

impl TypedArg {
    pub fn new(sol_type: SolType, value: impl Into<SolValue>) -> Self {
        Self {
            sol_type,
            value: value.into(),
        }
    }

    /// Parse the descriptor and pair it with a value
    pub fn parse(descriptor: &str, value: impl Into<SolValue>) -> Result<Self, PackError> {
        Ok(Self::new(descriptor.parse()?, value))
    }
}

/// Tight-packing encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedEncoder {
    options: PackOptions,
}

impl PackedEncoder {
    pub fn new(options: PackOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> PackOptions {
        self.options
    }

    /// Pack parallel lists of descriptors and values.
    ///
    /// Lengths must match. Arguments are processed in order and the first
    /// invalid one aborts the whole call.
    pub fn pack_all<T: AsRef<str>>(
        &self,
        types: &[T],
        values: &[SolValue],
    ) -> Result<Vec<u8>, PackError> {
        if types.len() != values.len() {
            return Err(PackError::InputArityMismatch {
                types: types.len(),
                values: values.len(),
            });
        }

        let mut packed = Vec::new();
        for (descriptor, value) in types.iter().zip(values) {
            let sol_type = SolType::from_str(descriptor.as_ref())?;
            packed.extend(self.pack(&sol_type, value, PackingContext::TopLevel)?);
        }
        Ok(packed)
    }

    /// Pack already-parsed arguments
    pub fn pack_args(&self, args: &[TypedArg]) -> Result<Vec<u8>, PackError> {
        let mut packed = Vec::new();
        for arg in args {
            packed.extend(self.pack(&arg.sol_type, &arg.value, PackingContext::TopLevel)?);
        }
        Ok(packed)
    }

    /// Pack one value in the given context
    pub fn pack(
        &self,
        sol_type: &SolType,
        value: &SolValue,
        context: PackingContext,
    ) -> Result<Vec<u8>, PackError> {
        if let SolType::Array(element, length) = sol_type {
            return self.pack_array(sol_type, element, *length, value);
        }

        if sol_type.is_dynamic()
            && context == PackingContext::ArrayElement
            && self.options.dynamic_array_elements == DynamicElementPolicy::Reject
        {
            return Err(PackError::invalid_value(
                sol_type,
                "dynamic types cannot be packed as array elements",
            ));
        }

        let natural = Self::pack_natural(sol_type, value)?;
        Ok(match context.padding_for(sol_type) {
            Padding::None => natural,
            Padding::Left => left_pad(&natural, WORD_SIZE),
            Padding::Right => right_pad(&natural, WORD_SIZE),
        })
    }

    fn pack_array(
        &self,
        sol_type: &SolType,
        element: &SolType,
        length: ArrayLength,
        value: &SolValue,
    ) -> Result<Vec<u8>, PackError> {
        let items = match value {
            SolValue::Array(items) => items,
            other => {
                return Err(PackError::invalid_value(
                    sol_type,
                    format!("expected an array, got {}", other.kind()),
                ))
            }
        };

        if !length.accepts(items.len()) {
            return Err(PackError::invalid_value(
                sol_type,
                format!("expected {} elements, got {}", describe_length(length), items.len()),
            ));
        }

        let mut packed = Vec::new();
        for item in items {
            packed.extend(self.pack(element, item, PackingContext::ArrayElement)?);
        }
        Ok(packed)
    }

    /// Unpadded encoding of a scalar value
    fn pack_natural(sol_type: &SolType, value: &SolValue) -> Result<Vec<u8>, PackError> {
        match (sol_type, value) {
            (SolType::Address, SolValue::Text(s)) => {
                let digits = strip_hex_prefix(s);
                if digits.len() != 40 {
                    return Err(PackError::invalid_value(
                        sol_type,
                        format!("expected 40 hex characters, got {} in '{}'", digits.len(), s),
                    ));
                }
                hex::decode(digits).map_err(|e| {
                    PackError::invalid_value(sol_type, format!("invalid hex '{}': {}", s, e))
                })
            }
            (SolType::Address, SolValue::Bytes(bytes)) => {
                if bytes.len() != 20 {
                    return Err(PackError::invalid_value(
                        sol_type,
                        format!("expected 20 bytes, got {}", bytes.len()),
                    ));
                }
                Ok(bytes.clone())
            }

            (SolType::Bool, SolValue::Bool(b)) => Ok(vec![u8::from(*b)]),

            (SolType::FixedBytes(size), SolValue::Text(_) | SolValue::Bytes(_)) => {
                let bytes = Self::coerce_bytes(sol_type, value)?;
                if bytes.len() != *size {
                    return Err(PackError::invalid_value(
                        sol_type,
                        format!("expected {} bytes, got {}", size, bytes.len()),
                    ));
                }
                Ok(bytes)
            }

            (SolType::Bytes, SolValue::Text(_) | SolValue::Bytes(_)) => {
                Self::coerce_bytes(sol_type, value)
            }

            (SolType::String, SolValue::Text(s)) => Ok(s.as_bytes().to_vec()),

            (SolType::Int { bits, signed }, SolValue::Int(int)) => {
                Self::pack_int(sol_type, *int, *bits, *signed)
            }
            (SolType::Int { bits, signed }, SolValue::Text(s)) => {
                let int = s
                    .parse::<IntValue>()
                    .map_err(|e| PackError::invalid_value(sol_type, e.to_string()))?;
                Self::pack_int(sol_type, int, *bits, *signed)
            }

            (_, other) => Err(PackError::invalid_value(
                sol_type,
                format!("incompatible {} value", other.kind()),
            )),
        }
    }

    fn pack_int(
        sol_type: &SolType,
        int: IntValue,
        bits: usize,
        signed: bool,
    ) -> Result<Vec<u8>, PackError> {
        if !int.fits(bits, signed) {
            return Err(PackError::invalid_value(
                sol_type,
                format!("{} is out of range", int),
            ));
        }
        Ok(int.to_be_bytes_width(bits))
    }

    /// Hex strings are decoded; raw bytes are taken as-is
    fn coerce_bytes(sol_type: &SolType, value: &SolValue) -> Result<Vec<u8>, PackError> {
        match value {
            SolValue::Bytes(bytes) => Ok(bytes.clone()),
            SolValue::Text(s) => decode_hex_lenient(s).map_err(|e| {
                PackError::invalid_value(sol_type, format!("invalid hex '{}': {}", s, e))
            }),
            other => Err(PackError::invalid_value(
                sol_type,
                format!("incompatible {} value", other.kind()),
            )),
        }
    }
}

fn describe_length(length: ArrayLength) -> String {
    match length {
        ArrayLength::Fixed(count) => format!("exactly {}", count),
        ArrayLength::Unbounded => "any number of".to_string(),
    }
}

/// Pack parallel type/value lists with default options
pub fn pack_all<T: AsRef<str>>(types: &[T], values: &[SolValue]) -> Result<Vec<u8>, PackError> {
    PackedEncoder::default().pack_all(types, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_one(descriptor: &str, value: impl Into<SolValue>) -> Result<Vec<u8>, PackError> {
        pack_all(&[descriptor], &[value.into()])
    }

    #[test]
    fn test_pack_address() {
        let packed = pack_one("address", "0x407d73d8a49eeb85d32cf465507dd71d507100c1").unwrap();
        assert_eq!(hex::encode(&packed), "407d73d8a49eeb85d32cf465507dd71d507100c1");

        let unprefixed = pack_one("address", "407D73D8A49EEB85D32CF465507DD71D507100C1").unwrap();
        assert_eq!(unprefixed, packed);

        let raw = pack_one("address", vec![0xabu8; 20]).unwrap();
        assert_eq!(raw, vec![0xab; 20]);
    }

    #[test]
    fn test_pack_address_wrong_length() {
        for bad in [
            "0x407d73d8a49eeb85d32cf465507dd71d507100c",
            "0x407d73d8a49eeb85d32cf465507dd71d507100c1ff",
            "",
        ] {
            let err = pack_one("address", bad).unwrap_err();
            assert!(matches!(err, PackError::InvalidValue { .. }), "{}", bad);
        }
        let err = pack_one("address", "0xzz7d73d8a49eeb85d32cf465507dd71d507100c1").unwrap_err();
        assert!(matches!(err, PackError::InvalidValue { .. }));
    }

    #[test]
    fn test_pack_bool() {
        assert_eq!(pack_one("bool", true).unwrap(), vec![1]);
        assert_eq!(pack_one("bool", false).unwrap(), vec![0]);
        assert!(matches!(
            pack_one("bool", "true").unwrap_err(),
            PackError::InvalidValue { .. }
        ));
        assert!(matches!(
            pack_one("bool", 1u64).unwrap_err(),
            PackError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_pack_fixed_bytes() {
        assert_eq!(pack_one("bytes4", "0x65746869").unwrap(), b"ethi".to_vec());
        assert_eq!(pack_one("bytes2", "0x102").unwrap(), vec![0x01, 0x02]);
        assert_eq!(pack_one("bytes3", vec![1u8, 2, 3]).unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            pack_one("bytes4", "0x6574").unwrap_err(),
            PackError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_pack_dynamic_bytes_and_string() {
        assert_eq!(pack_one("bytes", vec![9u8, 8, 7]).unwrap(), vec![9, 8, 7]);
        assert_eq!(pack_one("bytes", "0xdead").unwrap(), vec![0xde, 0xad]);
        assert!(pack_one("bytes", "").unwrap().is_empty());
        assert_eq!(pack_one("string", "héllo").unwrap(), "héllo".as_bytes().to_vec());
        assert!(matches!(
            pack_one("string", vec![1u8]).unwrap_err(),
            PackError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_pack_integers() {
        assert_eq!(pack_one("uint8", 7u64).unwrap(), vec![7]);
        assert_eq!(pack_one("uint16", "258").unwrap(), vec![1, 2]);
        assert_eq!(pack_one("int8", -1i64).unwrap(), vec![0xff]);
        assert_eq!(pack_one("int16", -1i64).unwrap(), vec![0xff, 0xff]);
        assert_eq!(pack_one("int16", "-2").unwrap(), vec![0xff, 0xfe]);
        assert_eq!(pack_one("int24", 1i64).unwrap(), vec![0, 0, 1]);

        let amount = pack_one("uint256", "20010000000").unwrap();
        assert_eq!(amount.len(), 32);
        assert_eq!(
            hex::encode(&amount),
            "00000000000000000000000000000000000000000000000000000004a8b05e80"
        );
        assert_eq!(pack_one("uint", 1u64).unwrap().len(), 32);
        assert_eq!(pack_one("uint64", "0xff").unwrap(), vec![0, 0, 0, 0, 0, 0, 0, 0xff]);
    }

    #[test]
    fn test_pack_integer_range() {
        for (descriptor, value) in [
            ("uint8", SolValue::from(256u64)),
            ("uint8", SolValue::from(-1i64)),
            ("int8", SolValue::from(128u64)),
            ("int8", SolValue::from(-129i64)),
            ("uint8", SolValue::from("12x")),
            ("uint8", SolValue::from(true)),
        ] {
            let err = pack_all(&[descriptor], &[value.clone()]).unwrap_err();
            assert!(
                matches!(err, PackError::InvalidValue { .. }),
                "{} {:?} gave {:?}",
                descriptor,
                value,
                err
            );
        }
        assert_eq!(pack_one("uint8", 255u64).unwrap(), vec![0xff]);
        assert_eq!(pack_one("int8", -128i64).unwrap(), vec![0x80]);
    }

    #[test]
    fn test_pack_array_words() {
        let packed = pack_one("uint8[2]", vec![SolValue::from(1u64), SolValue::from(2u64)]).unwrap();
        let mut expected = vec![0u8; 64];
        expected[31] = 1;
        expected[63] = 2;
        assert_eq!(packed, expected);
    }

    #[test]
    fn test_pack_array_element_padding() {
        let address = "0x407d73d8a49eeb85d32cf465507dd71d507100c1";
        let packed = pack_one("address[]", vec![SolValue::from(address)]).unwrap();
        assert_eq!(packed.len(), 32);
        assert_eq!(&packed[..12], &[0u8; 12]);

        let packed = pack_one("bytes2[1]", vec![SolValue::from("0xabcd")]).unwrap();
        assert_eq!(packed.len(), 32);
        assert_eq!(&packed[..2], &[0xab, 0xcd]);
        assert_eq!(&packed[2..], &[0u8; 30]);

        let packed = pack_one("bool[]", vec![SolValue::from(true)]).unwrap();
        assert_eq!(packed.len(), 32);
        assert_eq!(packed[31], 1);
    }

    #[test]
    fn test_pack_nested_arrays() {
        let value = SolValue::Array(vec![
            SolValue::Array(vec![SolValue::from(1u64), SolValue::from(2u64)]),
            SolValue::Array(vec![SolValue::from(3u64), SolValue::from(4u64)]),
        ]);
        let packed = pack_one("uint16[2][]", value).unwrap();
        assert_eq!(packed.len(), 128);
        for (i, expected) in [1u8, 2, 3, 4].iter().enumerate() {
            assert_eq!(packed[i * 32 + 31], *expected);
        }
    }

    #[test]
    fn test_pack_array_length_mismatch() {
        let err = pack_one("uint8[3]", vec![SolValue::from(1u64)]).unwrap_err();
        assert!(matches!(err, PackError::InvalidValue { .. }));
        let err = pack_one("uint8[]", 5u64).unwrap_err();
        assert!(matches!(err, PackError::InvalidValue { .. }));
        assert!(pack_one("uint8[]", Vec::<SolValue>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_dynamic_elements_permissive_by_default() {
        let value = vec![SolValue::from("ab"), SolValue::from("c")];
        assert_eq!(pack_one("string[]", value).unwrap(), b"abc".to_vec());
    }

    #[test]
    fn test_dynamic_elements_rejected_when_configured() {
        let encoder = PackedEncoder::new(PackOptions {
            dynamic_array_elements: DynamicElementPolicy::Reject,
        });
        let err = encoder
            .pack_all(&["bytes[]"], &[SolValue::Array(vec![SolValue::from("0x01")])])
            .unwrap_err();
        assert!(matches!(err, PackError::InvalidValue { .. }));
        // top-level dynamic values are unaffected
        assert_eq!(encoder.pack_all(&["string"], &["x".into()]).unwrap(), b"x".to_vec());
    }

    #[test]
    fn test_arity_mismatch() {
        let err = pack_all(
            &["address", "uint256", "bool"],
            &["0x407d73d8a49eeb85d32cf465507dd71d507100c1".into(), 1u64.into()],
        )
        .unwrap_err();
        assert_eq!(err, PackError::InputArityMismatch { types: 3, values: 2 });
    }

    #[test]
    fn test_descriptor_errors_abort() {
        let err = pack_all(&["uint7"], &[1u64.into()]).unwrap_err();
        assert!(matches!(err, PackError::InvalidTypeDescriptor { .. }));
        let err = pack_all(&["bool", "tuple"], &[true.into(), 1u64.into()]).unwrap_err();
        assert!(matches!(err, PackError::UnsupportedType(_)));
    }

    #[test]
    fn test_pack_args_matches_pack_all() {
        let args = vec![
            TypedArg::parse("uint8", 3u64).unwrap(),
            TypedArg::new(SolType::Bool, true),
        ];
        let from_args = PackedEncoder::default().pack_args(&args).unwrap();
        let from_lists = pack_all(&["uint8", "bool"], &[3u64.into(), true.into()]).unwrap();
        assert_eq!(from_args, from_lists);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Reject".parse::<DynamicElementPolicy>(), Ok(DynamicElementPolicy::Reject));
        assert_eq!(" permissive".parse::<DynamicElementPolicy>(), Ok(DynamicElementPolicy::Permissive));
        assert!("strict".parse::<DynamicElementPolicy>().is_err());
    }
}
