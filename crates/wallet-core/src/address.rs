use chain_tron::{TronAddress, TronNetwork};

use crate::error::WalletError;
use crate::hd_derivation;
use crate::types::DerivedAddress;

/// Derive the address at m/44'/195'/account'/0/index from seed bytes
pub fn derive_address(
    seed: &[u8],
    network: &TronNetwork,
    account: u32,
    index: u32,
) -> Result<DerivedAddress, WalletError> {
    let key = hd_derivation::derive_key_pair(seed, account, index)?;
    let address = key.address(network);

    Ok(DerivedAddress {
        address: address.to_base58(),
        address_hex: address.to_hex(),
        public_key_hex: hex::encode(key.public_key_compressed()),
        derivation_path: hd_derivation::derivation_path(account, index),
    })
}

/// Derive the first `count` receive addresses of `account`.
pub fn derive_addresses(
    seed: &[u8],
    network: &TronNetwork,
    account: u32,
    count: u32,
) -> Result<Vec<DerivedAddress>, WalletError> {
    (0..count)
        .map(|index| derive_address(seed, network, account, index))
        .collect()
}

/// True if `addr` is a Base58Check or hex address for `network`.
pub fn validate_address(addr: &str, network: &TronNetwork) -> bool {
    TronAddress::parse(addr, network.address_prefix).is_ok()
}

/// Parses `addr` for `network`, mapping failures to
/// [`WalletError::InvalidAddress`].
pub fn parse_address(addr: &str, network: &TronNetwork) -> Result<TronAddress, WalletError> {
    TronAddress::parse(addr, network.address_prefix)
        .map_err(|e| WalletError::InvalidAddress(format!("{addr}: {e}")))
}
