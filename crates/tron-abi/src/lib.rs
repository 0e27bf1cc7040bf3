//! Solidity-compatible ABI encoding for TRON smart contracts.
//!
//! This crate provides:
//! - A closed [`AbiType`] model parsed from textual type fragments
//! - Word-aligned [`encode`] / [`decode`] with head/tail offset layout
//! - Function selectors and call data ([`FunctionSignature`], [`EncodedCall`])
//! - Contract ABI loading from compiler or node JSON ([`ContractAbi`])
//!
//! ABI `address` values are 20-byte hashes. The TRON network prefix byte is
//! added and stripped by the address layer, never by the ABI.

pub mod decode;
pub mod encode;
pub mod error;
pub mod function;
pub mod json;
pub mod types;
pub mod value;

pub use decode::{decode, decode_params, decode_params_with, decode_with, DecodeMode};
pub use encode::{encode, encode_params};
pub use error::EncodingError;
pub use function::{
    decode_call, decode_call_with, decode_output, encode_call, encode_constructor, event_topic,
    selector_of, EncodedCall, FunctionSignature, SELECTOR_LEN,
};
pub use json::{AbiEvent, AbiFunction, ContractAbi, Param};
pub use types::{AbiType, WORD};
pub use value::{i256_from_i64, AbiValue};

pub use alloy_primitives::{Address, I256, U256};
