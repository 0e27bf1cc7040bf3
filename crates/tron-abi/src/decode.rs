use std::cell::Cell;

use alloy_primitives::{Address, I256, U256};

use crate::encode::{int_fits, padded_len};
use crate::error::EncodingError;
use crate::types::{AbiType, WORD};
use crate::value::AbiValue;

/// A decode may produce at most one value per input byte, and never fewer
/// than this many. Tails shared through aliased offsets hit the cap.
const MIN_VALUE_BUDGET: usize = 1024;

/// How strictly decoded words are checked against their type's domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Accept any bit pattern that can be mapped to a value: a non-zero bool
    /// word is `true`, high bits of narrow integers and padding are ignored.
    #[default]
    Lenient,
    /// Reject non-canonical encodings with [`EncodingError::InvalidValue`].
    Strict,
}

/// Decodes a value of type `ty` whose encoding starts at `offset`.
///
/// This mirrors [`encode`](crate::encode): for dynamic types `offset` points
/// at the length-prefixed payload, not at an offset word. Returns the value
/// and the number of bytes consumed from `offset`.
pub fn decode(
    ty: &AbiType,
    data: &[u8],
    offset: usize,
) -> Result<(AbiValue, usize), EncodingError> {
    decode_with(ty, data, offset, DecodeMode::Lenient)
}

/// [`decode`] with an explicit [`DecodeMode`].
pub fn decode_with(
    ty: &AbiType,
    data: &[u8],
    offset: usize,
    mode: DecodeMode,
) -> Result<(AbiValue, usize), EncodingError> {
    let (value, end) = Decoder::new(data, mode).value(ty, offset)?;
    Ok((value, end - offset))
}

/// Decodes an argument block laid out by [`encode_params`](crate::encode_params).
pub fn decode_params(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, EncodingError> {
    decode_params_with(types, data, DecodeMode::Lenient)
}

/// [`decode_params`] with an explicit [`DecodeMode`].
pub fn decode_params_with(
    types: &[AbiType],
    data: &[u8],
    mode: DecodeMode,
) -> Result<Vec<AbiValue>, EncodingError> {
    let (values, _) = Decoder::new(data, mode).sequence(types.iter(), 0)?;
    Ok(values)
}

struct Decoder<'a> {
    data: &'a [u8],
    mode: DecodeMode,
    /// Values still allowed before the input counts as hostile.
    budget: Cell<usize>,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], mode: DecodeMode) -> Self {
        Self {
            data,
            mode,
            budget: Cell::new(data.len().max(MIN_VALUE_BUDGET)),
        }
    }

    fn strict(&self) -> bool {
        self.mode == DecodeMode::Strict
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], EncodingError> {
        let truncated = || EncodingError::TruncatedData {
            offset,
            needed: len,
            available: self.data.len(),
        };
        let end = offset.checked_add(len).ok_or_else(truncated)?;
        self.data.get(offset..end).ok_or_else(truncated)
    }

    fn word(&self, offset: usize) -> Result<&'a [u8], EncodingError> {
        self.slice(offset, WORD)
    }

    /// Reads a word that must hold a length or offset addressable in memory.
    fn size_word(&self, offset: usize) -> Result<usize, EncodingError> {
        let value = U256::from_be_slice(self.word(offset)?);
        usize::try_from(value)
            .ok()
            .filter(|&n| n <= self.data.len())
            .ok_or(EncodingError::TruncatedData {
                offset,
                needed: self.data.len().saturating_add(1),
                available: self.data.len(),
            })
    }

    /// Decodes the value whose encoding starts at `pos`; returns it with the
    /// end of the furthest byte read.
    fn value(&self, ty: &AbiType, pos: usize) -> Result<(AbiValue, usize), EncodingError> {
        self.charge(pos)?;
        match ty {
            AbiType::Bool => {
                let word = self.word(pos)?;
                if self.strict() && (word[..31].iter().any(|&b| b != 0) || word[31] > 1) {
                    return Err(EncodingError::InvalidValue(format!(
                        "bool word at offset {pos} is not 0 or 1"
                    )));
                }
                Ok((AbiValue::Bool(word.iter().any(|&b| b != 0)), pos + WORD))
            }
            AbiType::Uint(bits) => {
                let value = U256::from_be_slice(self.word(pos)?);
                if self.strict() && value.bit_len() > *bits {
                    return Err(EncodingError::InvalidValue(format!(
                        "value {value} at offset {pos} does not fit in uint{bits}"
                    )));
                }
                Ok((AbiValue::Uint(value), pos + WORD))
            }
            AbiType::Int(bits) => {
                let value = I256::from_raw(U256::from_be_slice(self.word(pos)?));
                if self.strict() && !int_fits(value, *bits) {
                    return Err(EncodingError::InvalidValue(format!(
                        "value {value} at offset {pos} does not fit in int{bits}"
                    )));
                }
                Ok((AbiValue::Int(value), pos + WORD))
            }
            AbiType::Address => {
                let word = self.word(pos)?;
                if self.strict() && word[..12].iter().any(|&b| b != 0) {
                    return Err(EncodingError::InvalidValue(format!(
                        "address word at offset {pos} has non-zero padding"
                    )));
                }
                Ok((AbiValue::Address(Address::from_slice(&word[12..])), pos + WORD))
            }
            AbiType::FixedBytes(len) => {
                let word = self.word(pos)?;
                if self.strict() && word[*len..].iter().any(|&b| b != 0) {
                    return Err(EncodingError::InvalidValue(format!(
                        "bytes{len} word at offset {pos} has non-zero padding"
                    )));
                }
                Ok((AbiValue::FixedBytes(word[..*len].to_vec()), pos + WORD))
            }
            AbiType::Bytes => {
                let (bytes, end) = self.packed_bytes(pos)?;
                Ok((AbiValue::Bytes(bytes.to_vec()), end))
            }
            AbiType::String => {
                let (bytes, end) = self.packed_bytes(pos)?;
                let s = std::str::from_utf8(bytes).map_err(|e| {
                    EncodingError::InvalidValue(format!("string at offset {pos}: {e}"))
                })?;
                Ok((AbiValue::String(s.to_owned()), end))
            }
            AbiType::Array(inner) => {
                let len = self.size_word(pos)?;
                // Every element needs at least one head word.
                let base = pos + WORD;
                self.slice(base, len.saturating_mul(inner.head_size()))?;
                let types = std::iter::repeat_n(inner.as_ref(), len);
                let (items, end) = self.sequence(types, base)?;
                Ok((AbiValue::Array(items), end.max(base)))
            }
            AbiType::FixedArray(inner, len) => {
                self.slice(pos, ty.inline_size()?)?;
                let types = std::iter::repeat_n(inner.as_ref(), *len);
                let (items, end) = self.sequence(types, pos)?;
                Ok((AbiValue::FixedArray(items), end))
            }
            AbiType::Tuple(components) => {
                self.slice(pos, ty.inline_size()?)?;
                let (items, end) = self.sequence(components.iter(), pos)?;
                Ok((AbiValue::Tuple(items), end))
            }
        }
    }

    /// Counts one decoded value against the budget.
    fn charge(&self, pos: usize) -> Result<(), EncodingError> {
        let left = self
            .budget
            .get()
            .checked_sub(1)
            .ok_or(EncodingError::InvalidOffset { offset: pos })?;
        self.budget.set(left);
        Ok(())
    }

    /// Length word at `pos` followed by a padded payload.
    fn packed_bytes(&self, pos: usize) -> Result<(&'a [u8], usize), EncodingError> {
        let len = self.size_word(pos)?;
        let start = pos + WORD;
        let padded = self.slice(start, padded_len(len))?;
        if self.strict() && padded[len..].iter().any(|&b| b != 0) {
            return Err(EncodingError::InvalidValue(format!(
                "payload at offset {start} has non-zero padding"
            )));
        }
        Ok((&padded[..len], start + padded.len()))
    }

    /// Decodes a head/tail block starting at `base`. Dynamic elements are
    /// located through offsets relative to `base`.
    fn sequence<'t>(
        &self,
        types: impl IntoIterator<Item = &'t AbiType>,
        base: usize,
    ) -> Result<(Vec<AbiValue>, usize), EncodingError> {
        let mut values = Vec::new();
        let mut head = base;
        let mut end = base;

        for ty in types {
            if ty.is_dynamic() {
                let offset = self.size_word(head)?;
                let (value, value_end) = self.value(ty, base + offset)?;
                values.push(value);
                end = end.max(value_end);
                head += WORD;
            } else {
                let (value, value_end) = self.value(ty, head)?;
                values.push(value);
                head = value_end;
            }
        }

        Ok((values, end.max(head)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode, encode_params};

    fn ty(s: &str) -> AbiType {
        AbiType::parse(s).unwrap()
    }

    #[test]
    fn decode_mirrors_encode_for_static() {
        let value = AbiValue::from(42u64);
        let data = encode(&ty("uint256"), &value).unwrap();
        assert_eq!(decode(&ty("uint256"), &data, 0).unwrap(), (value, 32));
    }

    #[test]
    fn decode_at_offset() {
        let mut data = vec![0xffu8; 8];
        data.extend_from_slice(&encode(&AbiType::Bool, &AbiValue::Bool(true)).unwrap());
        let (value, used) = decode(&AbiType::Bool, &data, 8).unwrap();
        assert_eq!(value, AbiValue::Bool(true));
        assert_eq!(used, 32);
    }

    #[test]
    fn decode_string_reports_padded_size() {
        let data = encode(&AbiType::String, &AbiValue::from("hello")).unwrap();
        let (value, used) = decode(&AbiType::String, &data, 0).unwrap();
        assert_eq!(value, AbiValue::from("hello"));
        assert_eq!(used, 64);
    }

    #[test]
    fn truncated_word_is_reported() {
        let err = decode(&ty("uint256"), &[0u8; 31], 0).unwrap_err();
        assert_eq!(
            err,
            EncodingError::TruncatedData {
                offset: 0,
                needed: 32,
                available: 31
            }
        );
    }

    #[test]
    fn truncated_payload_is_reported() {
        let mut data = encode(&AbiType::Bytes, &AbiValue::Bytes(vec![1; 40])).unwrap();
        data.truncate(70);
        assert!(matches!(
            decode(&AbiType::Bytes, &data, 0),
            Err(EncodingError::TruncatedData { .. })
        ));
    }

    #[test]
    fn absurd_length_is_truncation_not_panic() {
        let mut data = vec![0xffu8; 32];
        data.extend_from_slice(&[0u8; 32]);
        assert!(matches!(
            decode(&AbiType::Bytes, &data, 0),
            Err(EncodingError::TruncatedData { .. })
        ));
        assert!(matches!(
            decode(&ty("uint256[]"), &data, 0),
            Err(EncodingError::TruncatedData { .. })
        ));
    }

    #[test]
    fn bool_domain_only_checked_in_strict_mode() {
        let mut word = [0u8; 32];
        word[31] = 2;

        let (lenient, _) = decode(&AbiType::Bool, &word, 0).unwrap();
        assert_eq!(lenient, AbiValue::Bool(true));

        let err = decode_with(&AbiType::Bool, &word, 0, DecodeMode::Strict).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidValue(_)));
    }

    #[test]
    fn strict_rejects_dirty_narrow_integers() {
        let word = [0xffu8; 32];
        assert!(decode_with(&ty("uint8"), &word, 0, DecodeMode::Strict).is_err());
        // All ones is -1, a valid int8.
        assert!(decode_with(&ty("int8"), &word, 0, DecodeMode::Strict).is_ok());

        let mut positive_overflow = [0u8; 32];
        positive_overflow[31] = 0x80;
        assert!(decode_with(&ty("int8"), &positive_overflow, 0, DecodeMode::Strict).is_err());
    }

    #[test]
    fn strict_rejects_dirty_address_and_padding() {
        let word = [0x01u8; 32];
        assert!(decode(&AbiType::Address, &word, 0).is_ok());
        assert!(decode_with(&AbiType::Address, &word, 0, DecodeMode::Strict).is_err());
        assert!(decode_with(&ty("bytes4"), &word, 0, DecodeMode::Strict).is_err());

        let mut data = encode(&AbiType::Bytes, &AbiValue::Bytes(vec![0xaa])).unwrap();
        data[40] = 1;
        assert!(decode(&AbiType::Bytes, &data, 0).is_ok());
        assert!(decode_with(&AbiType::Bytes, &data, 0, DecodeMode::Strict).is_err());
    }

    #[test]
    fn invalid_utf8_string_is_rejected() {
        let data = encode(&AbiType::Bytes, &AbiValue::Bytes(vec![0xff, 0xfe])).unwrap();
        assert!(matches!(
            decode(&AbiType::String, &data, 0),
            Err(EncodingError::InvalidValue(_))
        ));
    }

    #[test]
    fn params_with_dynamic_tails_decode() {
        let types = vec![ty("uint256"), ty("string"), ty("bytes32[]"), ty("bool")];
        let values = vec![
            AbiValue::from(7u64),
            AbiValue::from("tron"),
            AbiValue::Array(vec![AbiValue::FixedBytes(vec![9; 32])]),
            AbiValue::Bool(true),
        ];
        let data = encode_params(&types, &values).unwrap();
        assert_eq!(decode_params(&types, &data).unwrap(), values);
    }

    #[test]
    fn nested_dynamic_tuple_decodes() {
        let t = ty("(string,uint256[])[]");
        let value = AbiValue::Array(vec![
            AbiValue::Tuple(vec![
                "a".into(),
                AbiValue::Array(vec![1u64.into(), 2u64.into()]),
            ]),
            AbiValue::Tuple(vec!["bc".into(), AbiValue::Array(vec![])]),
        ]);
        let data = encode(&t, &value).unwrap();
        let (decoded, used) = decode_with(&t, &data, 0, DecodeMode::Strict).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(used, data.len());
    }

    fn size(n: usize) -> [u8; 32] {
        U256::from(n).to_be_bytes::<32>()
    }

    /// `depth` nested arrays of `fanout` elements where every offset of a
    /// level points at the single block of the next level.
    fn aliased_nested_arrays(depth: usize, fanout: usize) -> (AbiType, Vec<u8>) {
        let block = (fanout + 1) * WORD;
        let mut data = Vec::new();
        for level in 0..depth {
            data.extend_from_slice(&size(fanout));
            let offset = if level + 1 < depth { block - WORD } else { 0 };
            for _ in 0..fanout {
                data.extend_from_slice(&size(offset));
            }
        }
        (ty(&format!("uint256{}", "[]".repeat(depth))), data)
    }

    #[test]
    fn oversized_fixed_array_is_truncation() {
        let err = decode(&ty("uint256[1099511627776]"), &[0u8; 64], 0).unwrap_err();
        assert!(matches!(err, EncodingError::TruncatedData { .. }));

        let err = decode(&ty("string[1099511627776]"), &[0u8; 64], 0).unwrap_err();
        assert!(matches!(err, EncodingError::TruncatedData { .. }));
    }

    #[test]
    fn wordless_fixed_array_is_bounded() {
        let err = decode(&ty("()[1099511627776]"), &[], 0).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidOffset { .. }));

        let (value, used) = decode(&ty("()[3]"), &[], 0).unwrap();
        assert_eq!(value, AbiValue::FixedArray(vec![AbiValue::Tuple(Vec::new()); 3]));
        assert_eq!(used, 0);
    }

    #[test]
    fn aliased_tails_cannot_inflate_output() {
        let (t, data) = aliased_nested_arrays(6, 8);
        assert_eq!(data.len(), 1728);
        assert!(matches!(
            decode(&t, &data, 0),
            Err(EncodingError::InvalidOffset { .. })
        ));
        assert!(matches!(
            decode_params(&[t], &[size(32).as_slice(), data.as_slice()].concat()),
            Err(EncodingError::InvalidOffset { .. })
        ));
    }

    #[test]
    fn small_aliased_tails_still_decode() {
        let (t, data) = aliased_nested_arrays(2, 2);
        let (value, _) = decode(&t, &data, 0).unwrap();
        let leaf = AbiValue::Array(vec![AbiValue::from(0u64), AbiValue::from(0u64)]);
        assert_eq!(value, AbiValue::Array(vec![leaf.clone(), leaf]));
    }
}
