//! Decoder for tightly packed data
//!
//! Packed data carries no lengths or offsets, so decoding needs the type list
//! and only works when at most one argument has a value-dependent size. That
//! argument takes whatever bytes the fixed-size ones leave over.

use super::types::*;
use super::value::*;
use crate::utils::crypto::WORD_SIZE;

/// Packed-data decoder
pub struct PackedDecoder;

impl PackedDecoder {
    /// Decode `data` into one canonical value per type.
    ///
    /// Addresses and fixed bytes come back as `Bytes`, integers as `Int`,
    /// strings as `Text`.
    pub fn decode(data: &[u8], types: &[SolType]) -> Result<Vec<SolValue>, PackError> {
        let widths: Vec<Option<usize>> = types
            .iter()
            .map(|t| t.packed_width(PackingContext::TopLevel))
            .collect();

        let unsized_count = widths.iter().filter(|w| w.is_none()).count();
        if unsized_count > 1 {
            return Err(PackError::Decoding(format!(
                "ambiguous layout: {} arguments have no fixed packed width",
                unsized_count
            )));
        }

        let fixed_total = widths
            .iter()
            .flatten()
            .try_fold(0usize, |acc, w| acc.checked_add(*w))
            .ok_or_else(|| PackError::Decoding("packed width overflows".to_string()))?;
        if data.len() < fixed_total {
            return Err(PackError::Decoding(format!(
                "expected at least {} bytes, got {}",
                fixed_total,
                data.len()
            )));
        }
        let remainder = data.len() - fixed_total;
        if unsized_count == 0 && remainder != 0 {
            return Err(PackError::Decoding(format!(
                "{} trailing bytes after the last argument",
                remainder
            )));
        }

        let mut values = Vec::with_capacity(types.len());
        let mut offset = 0;
        for (sol_type, width) in types.iter().zip(&widths) {
            let width = width.unwrap_or(remainder);
            let fragment = &data[offset..offset + width];
            values.push(Self::decode_value(fragment, sol_type, PackingContext::TopLevel)?);
            offset += width;
        }
        Ok(values)
    }

    /// Decode a single fragment whose extent is already known
    fn decode_value(
        fragment: &[u8],
        sol_type: &SolType,
        context: PackingContext,
    ) -> Result<SolValue, PackError> {
        if let SolType::Array(element, length) = sol_type {
            return Self::decode_array(fragment, sol_type, element, *length);
        }

        let natural = Self::strip_padding(fragment, sol_type, context)?;
        match sol_type {
            SolType::Address | SolType::FixedBytes(_) | SolType::Bytes => {
                Ok(SolValue::Bytes(natural.to_vec()))
            }
            SolType::Bool => match natural {
                [0] => Ok(SolValue::Bool(false)),
                [1] => Ok(SolValue::Bool(true)),
                other => Err(PackError::Decoding(format!(
                    "invalid bool encoding 0x{}",
                    hex::encode(other)
                ))),
            },
            SolType::Int { signed, .. } => {
                Ok(SolValue::Int(IntValue::from_be_bytes_width(natural, *signed)?))
            }
            SolType::String => String::from_utf8(natural.to_vec())
                .map(SolValue::Text)
                .map_err(|_| PackError::Decoding("invalid UTF-8 in string".to_string())),
            SolType::Array(..) => Err(PackError::Decoding(format!(
                "unexpected array type {}",
                sol_type
            ))),
        }
    }

    /// Remove word padding, checking that padding bytes are zero
    fn strip_padding<'a>(
        fragment: &'a [u8],
        sol_type: &SolType,
        context: PackingContext,
    ) -> Result<&'a [u8], PackError> {
        let natural_width = match sol_type.packed_width(PackingContext::TopLevel) {
            Some(width) => width,
            None => return Ok(fragment),
        };
        let expected = sol_type.packed_width(context).unwrap_or(natural_width);
        if fragment.len() != expected {
            return Err(PackError::Decoding(format!(
                "{} needs {} bytes, got {}",
                sol_type,
                expected,
                fragment.len()
            )));
        }

        let (natural, padding) = match context.padding_for(sol_type) {
            Padding::None => (fragment, &fragment[..0]),
            Padding::Left => {
                let (padding, natural) = fragment.split_at(WORD_SIZE - natural_width);
                (natural, padding)
            }
            Padding::Right => {
                let (natural, padding) = fragment.split_at(natural_width);
                (natural, padding)
            }
        };
        if padding.iter().any(|b| *b != 0) {
            return Err(PackError::Decoding(format!(
                "non-zero padding in {} element",
                sol_type
            )));
        }
        Ok(natural)
    }

    fn decode_array(
        fragment: &[u8],
        sol_type: &SolType,
        element: &SolType,
        length: ArrayLength,
    ) -> Result<SolValue, PackError> {
        let element_width = element
            .packed_width(PackingContext::ArrayElement)
            .ok_or_else(|| {
                PackError::Decoding(format!("elements of {} have no fixed packed width", sol_type))
            })?;

        // zero-width elements leave no bytes to count or bound the declared length
        if element_width == 0 {
            return Err(PackError::Decoding(format!(
                "cannot decode zero-width elements of {}",
                sol_type
            )));
        }

        if fragment.len() % element_width != 0 {
            return Err(PackError::Decoding(format!(
                "{} bytes is not a whole number of {}-byte elements",
                fragment.len(),
                element_width
            )));
        }
        let count = fragment.len() / element_width;
        if !length.accepts(count) {
            return Err(PackError::Decoding(format!(
                "{} holds {} elements",
                sol_type, count
            )));
        }

        fragment
            .chunks(element_width)
            .map(|chunk| Self::decode_value(chunk, element, PackingContext::ArrayElement))
            .collect::<Result<Vec<_>, _>>()
            .map(SolValue::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packed::encoder::pack_all;

    fn types(descriptors: &[&str]) -> Vec<SolType> {
        descriptors.iter().map(|d| d.parse().unwrap()).collect()
    }

    #[test]
    fn test_decode_static_arguments() {
        let descriptors = ["address", "uint256", "bool", "int8", "bytes2"];
        let address = "0x407d73d8a49eeb85d32cf465507dd71d507100c1";
        let packed = pack_all(
            &descriptors,
            &[
                address.into(),
                12345u64.into(),
                true.into(),
                (-5i64).into(),
                "0xbeef".into(),
            ],
        )
        .unwrap();

        let decoded = PackedDecoder::decode(&packed, &types(&descriptors)).unwrap();
        assert_eq!(decoded[0], SolValue::Bytes(hex::decode(&address[2..]).unwrap()));
        assert_eq!(decoded[1], SolValue::from(12345u64));
        assert_eq!(decoded[2], SolValue::Bool(true));
        assert_eq!(decoded[3], SolValue::from(-5i64));
        assert_eq!(decoded[4], SolValue::Bytes(vec![0xbe, 0xef]));
    }

    #[test]
    fn test_decode_single_dynamic_argument() {
        let descriptors = ["uint8", "string", "bool"];
        let packed = pack_all(&descriptors, &[7u64.into(), "hello".into(), false.into()]).unwrap();
        let decoded = PackedDecoder::decode(&packed, &types(&descriptors)).unwrap();
        assert_eq!(
            decoded,
            vec![SolValue::from(7u64), SolValue::from("hello"), SolValue::Bool(false)]
        );
    }

    #[test]
    fn test_decode_unbounded_array() {
        let descriptors = ["int16[]"];
        let value = SolValue::Array(vec![SolValue::from(1u64), SolValue::from(2u64)]);
        let packed = pack_all(&descriptors, &[value.clone()]).unwrap();
        let decoded = PackedDecoder::decode(&packed, &types(&descriptors)).unwrap();
        assert_eq!(decoded, vec![value]);
    }

    #[test]
    fn test_decode_fixed_bytes_array() {
        let descriptors = ["bytes3[2]"];
        let packed = pack_all(
            &descriptors,
            &[SolValue::Array(vec!["0x010203".into(), "0x040506".into()])],
        )
        .unwrap();
        let decoded = PackedDecoder::decode(&packed, &types(&descriptors)).unwrap();
        assert_eq!(
            decoded,
            vec![SolValue::Array(vec![
                SolValue::Bytes(vec![1, 2, 3]),
                SolValue::Bytes(vec![4, 5, 6]),
            ])]
        );
    }

    #[test]
    fn test_decode_rejects_ambiguous_layout() {
        let err = PackedDecoder::decode(b"abcd", &types(&["string", "bytes"])).unwrap_err();
        assert!(matches!(err, PackError::Decoding(_)));
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        assert!(PackedDecoder::decode(&[0u8; 19], &types(&["address"])).is_err());
        assert!(PackedDecoder::decode(&[0u8; 21], &types(&["address"])).is_err());
        assert!(PackedDecoder::decode(&[0u8; 33], &types(&["uint8[]"])).is_err());
        assert!(PackedDecoder::decode(&[0u8; 32], &types(&["uint8[2]"])).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_bool_and_padding() {
        assert!(PackedDecoder::decode(&[2], &types(&["bool"])).is_err());
        let mut word = [0u8; 32];
        word[0] = 1;
        word[31] = 1;
        assert!(PackedDecoder::decode(&word, &types(&["bool[]"])).is_err());
        assert!(PackedDecoder::decode(&word, &types(&["bytes1[]"])).is_err());
    }

    #[test]
    fn test_decode_rejects_zero_width_elements() {
        for descriptor in ["uint8[0][2]", "uint8[0][18446744073709551615]", "bool[0][]"] {
            let err = PackedDecoder::decode(&[], &types(&[descriptor])).unwrap_err();
            assert!(matches!(err, PackError::Decoding(_)), "{}: {:?}", descriptor, err);
        }
    }

    #[test]
    fn test_decode_rejects_dynamic_elements() {
        let err = PackedDecoder::decode(b"abc", &types(&["string[]"])).unwrap_err();
        assert!(matches!(err, PackError::Decoding(_)));
    }
}
