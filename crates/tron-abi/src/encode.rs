use alloy_primitives::{I256, U256};

use crate::error::EncodingError;
use crate::types::{AbiType, WORD};
use crate::value::AbiValue;

/// Encodes a single value in its own context.
///
/// Static types produce their word(s) directly. `bytes` and `string` produce
/// a length word followed by the right-padded payload. Arrays and tuples are
/// laid out with the head/tail algorithm of [`encode_params`], arrays with a
/// leading length word. Offset placement of a dynamic value inside an
/// enclosing sequence is the caller's job.
pub fn encode(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, EncodingError> {
    match (ty, value) {
        (AbiType::Bool, AbiValue::Bool(b)) => Ok(uint_word(U256::from(*b as u8)).to_vec()),
        (AbiType::Uint(bits), v) => encode_uint(*bits, v).map(|w| w.to_vec()),
        (AbiType::Int(bits), v) => encode_int(*bits, v).map(|w| w.to_vec()),
        (AbiType::Address, AbiValue::Address(addr)) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(addr.as_slice());
            Ok(word.to_vec())
        }
        (AbiType::FixedBytes(len), AbiValue::FixedBytes(bytes) | AbiValue::Bytes(bytes)) => {
            if bytes.len() != *len {
                return Err(EncodingError::InvalidValue(format!(
                    "bytes{len} needs exactly {len} bytes, got {}",
                    bytes.len()
                )));
            }
            // Right-pad: data + trailing zero bytes.
            let mut word = [0u8; WORD];
            word[..*len].copy_from_slice(bytes);
            Ok(word.to_vec())
        }
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => Ok(encode_packed_bytes(bytes)),
        (AbiType::String, AbiValue::String(s)) => Ok(encode_packed_bytes(s.as_bytes())),
        (AbiType::Array(inner), AbiValue::Array(items)) => {
            let items: Vec<_> = items.iter().map(|item| (inner.as_ref(), item)).collect();
            let mut out = uint_word(U256::from(items.len())).to_vec();
            out.extend_from_slice(&encode_sequence(&items)?);
            Ok(out)
        }
        (AbiType::FixedArray(inner, len), AbiValue::FixedArray(items) | AbiValue::Array(items)) => {
            if items.len() != *len {
                return Err(EncodingError::InvalidValue(format!(
                    "{ty} needs {len} elements, got {}",
                    items.len()
                )));
            }
            let items: Vec<_> = items.iter().map(|item| (inner.as_ref(), item)).collect();
            encode_sequence(&items)
        }
        (AbiType::Tuple(components), AbiValue::Tuple(items)) => {
            if items.len() != components.len() {
                return Err(EncodingError::InvalidValue(format!(
                    "{ty} needs {} components, got {}",
                    components.len(),
                    items.len()
                )));
            }
            let items: Vec<_> = components.iter().zip(items).collect();
            encode_sequence(&items)
        }
        (ty, value) => Err(EncodingError::InvalidValue(format!(
            "cannot encode {} as {ty}",
            kind(value)
        ))),
    }
}

/// Encodes an argument block: heads in declaration order followed by the
/// dynamic tails in declaration order.
///
/// Fails with [`EncodingError::ArityMismatch`] when the number of values does
/// not match the number of types.
pub fn encode_params(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, EncodingError> {
    if types.len() != values.len() {
        return Err(EncodingError::ArityMismatch {
            expected: types.len(),
            got: values.len(),
        });
    }
    let items: Vec<_> = types.iter().zip(values).collect();
    encode_sequence(&items)
}

/// A head slot: either the static encoding itself or the byte offset of a
/// dynamic payload within the block.
enum Head {
    Inline(Vec<u8>),
    Offset(usize),
}

/// Two-pass head/tail layout.
///
/// The head section has a size known from the types alone. The first pass
/// encodes every element and appends dynamic payloads to the tail buffer,
/// recording each payload's offset only once every preceding payload has
/// been placed. The second pass writes the heads.
pub(crate) fn encode_sequence(items: &[(&AbiType, &AbiValue)]) -> Result<Vec<u8>, EncodingError> {
    let head_len = items.iter().try_fold(0usize, |total, (ty, _)| {
        let head = ty.checked_head_size()?;
        total
            .checked_add(head)
            .ok_or_else(|| EncodingError::UnsupportedType(format!("{ty}: encoded size overflows")))
    })?;

    let mut heads = Vec::with_capacity(items.len());
    let mut tail = Vec::new();
    for (ty, value) in items {
        let encoded = encode(ty, value)?;
        if ty.is_dynamic() {
            heads.push(Head::Offset(head_len + tail.len()));
            tail.extend_from_slice(&encoded);
        } else {
            heads.push(Head::Inline(encoded));
        }
    }

    let mut out = Vec::with_capacity(head_len + tail.len());
    for head in heads {
        match head {
            Head::Inline(bytes) => out.extend_from_slice(&bytes),
            Head::Offset(offset) => out.extend_from_slice(&uint_word(U256::from(offset))),
        }
    }
    out.extend_from_slice(&tail);
    Ok(out)
}

fn encode_uint(bits: usize, value: &AbiValue) -> Result<[u8; WORD], EncodingError> {
    let v = match value {
        AbiValue::Uint(v) => *v,
        AbiValue::Int(i) if i.is_negative() => {
            return Err(EncodingError::InvalidValue(format!(
                "negative value {i} for unsigned type uint{bits}"
            )));
        }
        AbiValue::Int(i) => i.into_raw(),
        other => {
            return Err(EncodingError::InvalidValue(format!(
                "cannot encode {} as uint{bits}",
                kind(other)
            )));
        }
    };
    if v.bit_len() > bits {
        return Err(EncodingError::InvalidValue(format!(
            "value {v} does not fit in uint{bits}"
        )));
    }
    Ok(uint_word(v))
}

fn encode_int(bits: usize, value: &AbiValue) -> Result<[u8; WORD], EncodingError> {
    let v = match value {
        AbiValue::Int(v) => *v,
        // A uint that fits below the sign bit is the same two's-complement word.
        AbiValue::Uint(u) if u.bit_len() < bits => I256::from_raw(*u),
        AbiValue::Uint(u) => {
            return Err(EncodingError::InvalidValue(format!(
                "value {u} does not fit in int{bits}"
            )));
        }
        other => {
            return Err(EncodingError::InvalidValue(format!(
                "cannot encode {} as int{bits}",
                kind(other)
            )));
        }
    };
    if !int_fits(v, bits) {
        return Err(EncodingError::InvalidValue(format!(
            "value {v} does not fit in int{bits}"
        )));
    }
    Ok(uint_word(v.into_raw()))
}

/// Whether a two's-complement value is representable in `bits` bits.
pub(crate) fn int_fits(value: I256, bits: usize) -> bool {
    let raw = value.into_raw();
    let magnitude = if value.is_negative() { !raw } else { raw };
    magnitude.bit_len() < bits
}

/// Length word followed by the payload right-padded to a word boundary.
fn encode_packed_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded = padded_len(bytes.len());
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&uint_word(U256::from(bytes.len())));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded, 0);
    out
}

pub(crate) fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

pub(crate) fn uint_word(value: U256) -> [u8; WORD] {
    value.to_be_bytes::<WORD>()
}

fn kind(value: &AbiValue) -> &'static str {
    match value {
        AbiValue::Bool(_) => "bool",
        AbiValue::Int(_) => "int",
        AbiValue::Uint(_) => "uint",
        AbiValue::Address(_) => "address",
        AbiValue::FixedBytes(_) => "fixed bytes",
        AbiValue::Bytes(_) => "bytes",
        AbiValue::String(_) => "string",
        AbiValue::Array(_) => "array",
        AbiValue::FixedArray(_) => "fixed array",
        AbiValue::Tuple(_) => "tuple",
    }
}
