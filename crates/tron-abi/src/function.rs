use std::fmt;
use std::str::FromStr;

use sha3::{Digest, Keccak256};
use tracing::trace;

use crate::decode::{decode_params_with, DecodeMode};
use crate::encode::encode_params;
use crate::error::EncodingError;
use crate::types::AbiType;
use crate::value::AbiValue;

/// Length of a function selector in bytes.
pub const SELECTOR_LEN: usize = 4;

/// A contract function: name, ordered input types and (optionally) the
/// output types used to decode its return data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    name: String,
    inputs: Vec<AbiType>,
    outputs: Vec<AbiType>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<AbiType>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs: Vec::new(),
        }
    }

    pub fn with_outputs(mut self, outputs: Vec<AbiType>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Parses `name(T1,T2,...)`, optionally followed by `returns (R1,...)`.
    ///
    /// Type spellings are canonicalized, so `transfer(address,uint)` and
    /// `transfer(address,uint256)` parse to equal signatures.
    pub fn parse(text: &str) -> Result<Self, EncodingError> {
        let malformed = || EncodingError::UnsupportedType(text.into());
        let text = text.trim();

        let open = text.find('(').ok_or_else(malformed)?;
        let name = text[..open].trim();
        if !is_identifier(name) {
            return Err(malformed());
        }

        let close = open + matching_paren(&text[open..]).ok_or_else(malformed)?;
        let inputs = tuple_components(&text[open..=close])?;

        let rest = text[close + 1..].trim();
        let outputs = if rest.is_empty() {
            Vec::new()
        } else {
            let list = rest.strip_prefix("returns").ok_or_else(malformed)?.trim();
            if !list.starts_with('(') || matching_paren(list) != Some(list.len() - 1) {
                return Err(malformed());
            }
            tuple_components(list)?
        };

        Ok(Self {
            name: name.to_owned(),
            inputs,
            outputs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[AbiType] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[AbiType] {
        &self.outputs
    }

    /// Canonical signature string, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(AbiType::to_string).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// First four bytes of the Keccak-256 hash of [`signature`](Self::signature).
    pub fn selector(&self) -> [u8; SELECTOR_LEN] {
        selector_of(&self.signature())
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

impl FromStr for FunctionSignature {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionSignature::parse(s)
    }
}

/// Call data: a 4-byte selector followed by the encoded argument block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedCall(Vec<u8>);

impl EncodedCall {
    pub fn selector(&self) -> [u8; SELECTOR_LEN] {
        let mut selector = [0u8; SELECTOR_LEN];
        selector.copy_from_slice(&self.0[..SELECTOR_LEN]);
        selector
    }

    /// The argument block after the selector; head offsets are relative to it.
    pub fn arguments(&self) -> &[u8] {
        &self.0[SELECTOR_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl AsRef<[u8]> for EncodedCall {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<EncodedCall> for Vec<u8> {
    fn from(call: EncodedCall) -> Self {
        call.0
    }
}

// ---------------------------------------------------------------------------
// Call encoding
// ---------------------------------------------------------------------------

/// Encodes a call to `signature` with `values` in declaration order.
///
/// # Errors
///
/// [`EncodingError::ArityMismatch`] if the number of values differs from
/// the number of inputs, or any encoding error for a mistyped value.
pub fn encode_call(
    signature: &FunctionSignature,
    values: &[AbiValue],
) -> Result<EncodedCall, EncodingError> {
    let selector = signature.selector();
    let arguments = encode_params(&signature.inputs, values)?;

    let mut data = Vec::with_capacity(SELECTOR_LEN + arguments.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&arguments);

    trace!(
        function = %signature,
        selector = %hex::encode(selector),
        len = data.len(),
        "encoded contract call"
    );
    Ok(EncodedCall(data))
}

/// Decodes the arguments of `call_data` against `signature`'s inputs.
///
/// The leading selector must match the signature's selector.
pub fn decode_call(
    signature: &FunctionSignature,
    call_data: &[u8],
) -> Result<Vec<AbiValue>, EncodingError> {
    decode_call_with(signature, call_data, DecodeMode::Lenient)
}

/// [`decode_call`] with an explicit [`DecodeMode`].
pub fn decode_call_with(
    signature: &FunctionSignature,
    call_data: &[u8],
    mode: DecodeMode,
) -> Result<Vec<AbiValue>, EncodingError> {
    if call_data.len() < SELECTOR_LEN {
        return Err(EncodingError::TruncatedData {
            offset: 0,
            needed: SELECTOR_LEN,
            available: call_data.len(),
        });
    }

    let expected = signature.selector();
    let (found, arguments) = call_data.split_at(SELECTOR_LEN);
    if found != expected {
        return Err(EncodingError::SelectorMismatch {
            expected: hex::encode(expected),
            found: hex::encode(found),
        });
    }

    decode_params_with(&signature.inputs, arguments, mode)
}

/// Decodes a function's return data against its declared output types.
pub fn decode_output(
    signature: &FunctionSignature,
    return_data: &[u8],
) -> Result<Vec<AbiValue>, EncodingError> {
    decode_params_with(&signature.outputs, return_data, DecodeMode::Lenient)
}

/// Constructor arguments: the bare argument block appended to deployment
/// bytecode, without any selector.
pub fn encode_constructor(
    types: &[AbiType],
    values: &[AbiValue],
) -> Result<Vec<u8>, EncodingError> {
    encode_params(types, values)
}

/// Topic 0 of an event: the full Keccak-256 hash of its canonical signature.
pub fn event_topic(signature: &str) -> Result<[u8; 32], EncodingError> {
    let event = FunctionSignature::parse(signature)?;
    Ok(keccak256(event.signature().as_bytes()))
}

/// Selector of an already-canonical signature string.
pub fn selector_of(canonical: &str) -> [u8; SELECTOR_LEN] {
    let hash = keccak256(canonical.as_bytes());
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(&hash[..SELECTOR_LEN]);
    selector
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Index of the ')' closing the '(' at the start of `s`.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn tuple_components(list: &str) -> Result<Vec<AbiType>, EncodingError> {
    match AbiType::parse(list)? {
        AbiType::Tuple(components) => Ok(components),
        _ => Err(EncodingError::UnsupportedType(list.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    fn sig(s: &str) -> FunctionSignature {
        FunctionSignature::parse(s).unwrap()
    }

    #[test]
    fn known_selectors() {
        for (text, selector) in [
            ("transfer(address,uint256)", "a9059cbb"),
            ("balanceOf(address)", "70a08231"),
            ("approve(address,uint256)", "095ea7b3"),
            ("transferFrom(address,address,uint256)", "23b872dd"),
            ("allowance(address,address)", "dd62ed3e"),
            ("name()", "06fdde03"),
            ("symbol()", "95d89b41"),
            ("decimals()", "313ce567"),
            ("totalSupply()", "18160ddd"),
        ] {
            assert_eq!(hex::encode(sig(text).selector()), selector, "{text}");
        }
    }

    #[test]
    fn selector_depends_only_on_canonical_form() {
        let built = FunctionSignature::new("transfer", vec![AbiType::Address, AbiType::Uint(256)]);
        let aliased = sig("transfer(address, uint)");
        assert_eq!(built.signature(), "transfer(address,uint256)");
        assert_eq!(aliased.signature(), built.signature());
        assert_eq!(aliased.selector(), built.selector());
    }

    #[test]
    fn parse_with_returns_clause() {
        let s = sig("balanceOf(address) returns (uint256)");
        assert_eq!(s.name(), "balanceOf");
        assert_eq!(s.inputs(), &[AbiType::Address]);
        assert_eq!(s.outputs(), &[AbiType::Uint(256)]);
    }

    #[test]
    fn parse_tuple_argument() {
        let s = sig("submit((address,uint256)[],bytes)");
        assert_eq!(s.signature(), "submit((address,uint256)[],bytes)");
        assert_eq!(s.inputs().len(), 2);
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in [
            "transfer",
            "(address)",
            "1transfer(address)",
            "transfer(address",
            "transfer(address) uint256",
            "transfer(addr)",
            "f(uint256) returns uint256",
        ] {
            assert!(FunctionSignature::parse(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn transfer_call_layout() {
        let to = Address::from([0x11u8; 20]);
        let call = encode_call(
            &sig("transfer(address,uint256)"),
            &[to.into(), 1_000_000u64.into()],
        )
        .unwrap();

        assert_eq!(call.len(), 4 + 64);
        assert_eq!(call.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&call.arguments()[..12], &[0u8; 12]);
        assert_eq!(&call.arguments()[12..32], to.as_slice());
        assert_eq!(&call.arguments()[60..64], &[0x00, 0x0f, 0x42, 0x40]);
        assert!(call.to_hex().starts_with("a9059cbb"));
    }

    #[test]
    fn call_arity_is_checked() {
        let err = encode_call(&sig("transfer(address,uint256)"), &[Address::ZERO.into()])
            .unwrap_err();
        assert_eq!(
            err,
            EncodingError::ArityMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn decode_call_round_trips() {
        let s = sig("setName(string,uint8)");
        let values = vec![AbiValue::from("vault"), AbiValue::from(3u64)];
        let call = encode_call(&s, &values).unwrap();
        assert_eq!(decode_call(&s, call.as_bytes()).unwrap(), values);
    }

    #[test]
    fn decode_call_checks_selector() {
        let call = encode_call(&sig("approve(address,uint256)"), &[
            Address::ZERO.into(),
            U256::MAX.into(),
        ])
        .unwrap();
        let err = decode_call(&sig("transfer(address,uint256)"), call.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            EncodingError::SelectorMismatch {
                expected: "a9059cbb".into(),
                found: "095ea7b3".into()
            }
        );
    }

    #[test]
    fn decode_call_needs_a_selector() {
        assert!(matches!(
            decode_call(&sig("name()"), &[0x06, 0xfd]),
            Err(EncodingError::TruncatedData { needed: 4, .. })
        ));
    }

    #[test]
    fn output_decoding_uses_return_types() {
        let s = sig("decimals() returns (uint8)");
        let mut data = [0u8; 32];
        data[31] = 6;
        assert_eq!(decode_output(&s, &data).unwrap(), vec![AbiValue::from(6u64)]);
    }

    #[test]
    fn constructor_has_no_selector() {
        let types = [AbiType::Uint(256)];
        let data = encode_constructor(&types, &[AbiValue::from(1u64)]).unwrap();
        assert_eq!(data.len(), 32);
        assert_eq!(data[31], 1);
    }

    #[test]
    fn transfer_event_topic() {
        let topic = event_topic("Transfer(address,address,uint256)").unwrap();
        assert_eq!(
            hex::encode(topic),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }
}
