use bip32::{DerivationPath, XPrv};
use chain_tron::KeyPair;
use zeroize::Zeroize;

use crate::error::WalletError;

/// SLIP-44 coin type registered for TRON.
pub const TRON_COIN_TYPE: u32 = 195;

/// BIP-44 derivation path: m/44'/195'/account'/0/index
pub fn derivation_path(account: u32, index: u32) -> String {
    format!("m/44'/{TRON_COIN_TYPE}'/{account}'/0/{index}")
}

/// Derive the secp256k1 key pair at `derivation_path(account, index)`.
pub fn derive_key_pair(seed: &[u8], account: u32, index: u32) -> Result<KeyPair, WalletError> {
    derive_key_pair_at(seed, &derivation_path(account, index))
}

/// Derive the key pair at an arbitrary BIP-32 path, e.g. `m/44'/195'/0'/0/7`.
pub fn derive_key_pair_at(seed: &[u8], path: &str) -> Result<KeyPair, WalletError> {
    if !(16..=64).contains(&seed.len()) {
        return Err(WalletError::InvalidSeed(format!(
            "expected 16 to 64 bytes, got {}",
            seed.len()
        )));
    }

    let path: DerivationPath = path
        .parse()
        .map_err(|e: bip32::Error| WalletError::DerivationFailed(e.to_string()))?;

    let xprv = XPrv::derive_from_path(seed, &path)
        .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;

    let mut private_key_bytes: [u8; 32] = xprv.to_bytes().into();
    let key_pair = KeyPair::from_private_key(&private_key_bytes);
    private_key_bytes.zeroize();
    key_pair.map_err(WalletError::from)
}
