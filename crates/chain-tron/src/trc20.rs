use alloy_primitives::U256;
use tron_abi::{
    decode_call, decode_params, encode_call, AbiType, AbiValue, EncodedCall, EncodingError,
    FunctionSignature,
};

use crate::address::TronAddress;

/// Function selector for `transfer(address,uint256)`: `0xa9059cbb`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Function selector for `balanceOf(address)`: `0x70a08231`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Function selector for `approve(address,uint256)`: `0x095ea7b3`.
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

fn transfer_fn() -> FunctionSignature {
    FunctionSignature::new("transfer", vec![AbiType::Address, AbiType::Uint(256)])
}

fn approve_fn() -> FunctionSignature {
    FunctionSignature::new("approve", vec![AbiType::Address, AbiType::Uint(256)])
}

fn balance_of_fn() -> FunctionSignature {
    FunctionSignature::new("balanceOf", vec![AbiType::Address])
}

fn transfer_from_fn() -> FunctionSignature {
    FunctionSignature::new(
        "transferFrom",
        vec![AbiType::Address, AbiType::Address, AbiType::Uint(256)],
    )
}

fn allowance_fn() -> FunctionSignature {
    FunctionSignature::new("allowance", vec![AbiType::Address, AbiType::Address])
}

/// Encodes `transfer(to, amount)`. The ABI sees only the 20-byte hash of
/// `to`; the network prefix is dropped.
pub fn encode_transfer(to: &TronAddress, amount: U256) -> Result<EncodedCall, EncodingError> {
    encode_call(&transfer_fn(), &[to.evm_address().into(), amount.into()])
}

pub fn encode_approve(spender: &TronAddress, amount: U256) -> Result<EncodedCall, EncodingError> {
    encode_call(&approve_fn(), &[spender.evm_address().into(), amount.into()])
}

pub fn encode_balance_of(owner: &TronAddress) -> Result<EncodedCall, EncodingError> {
    encode_call(&balance_of_fn(), &[owner.evm_address().into()])
}

pub fn encode_transfer_from(
    from: &TronAddress,
    to: &TronAddress,
    amount: U256,
) -> Result<EncodedCall, EncodingError> {
    encode_call(
        &transfer_from_fn(),
        &[from.evm_address().into(), to.evm_address().into(), amount.into()],
    )
}

pub fn encode_allowance(
    owner: &TronAddress,
    spender: &TronAddress,
) -> Result<EncodedCall, EncodingError> {
    encode_call(
        &allowance_fn(),
        &[owner.evm_address().into(), spender.evm_address().into()],
    )
}

/// Recovers `(to, amount)` from `transfer` call data, re-attaching `prefix`.
pub fn decode_transfer(
    call_data: &[u8],
    prefix: u8,
) -> Result<(TronAddress, U256), EncodingError> {
    let values = decode_call(&transfer_fn(), call_data)?;
    match values.as_slice() {
        [AbiValue::Address(to), AbiValue::Uint(amount)] => {
            Ok((TronAddress::from_evm_address(prefix, *to), *amount))
        }
        _ => Err(EncodingError::InvalidValue("unexpected transfer arguments".into())),
    }
}

/// Decodes a single `uint256` return value, as returned by `balanceOf`,
/// `allowance`, `totalSupply` and `decimals`.
pub fn decode_uint256(return_data: &[u8]) -> Result<U256, EncodingError> {
    decode_params(&[AbiType::Uint(256)], return_data)?
        .first()
        .and_then(AbiValue::as_uint)
        .ok_or_else(|| EncodingError::InvalidValue("expected a uint256 result".into()))
}
