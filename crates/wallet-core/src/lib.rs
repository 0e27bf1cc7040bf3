//! TRON wallet facade: mnemonic -> BIP-44 key -> signed transaction bytes.
//!
//! Every entry point derives the key it needs, signs, and drops the key
//! before returning. Seeds handed out by [`mnemonic_to_seed`] wipe
//! themselves on drop.

pub mod address;
pub mod error;
pub mod hd_derivation;
pub mod mnemonic;
pub mod types;

use chain_tron::{
    build_transfer, build_trc20_transfer, sign_all, sign_message, KeyPair, RawTransaction,
    ReferenceBlock, TronNetwork,
};
use crypto_utils::{ZeroizingBytes, ZeroizingString};
use tracing::debug;
use tron_abi::U256;

use error::WalletError;
use types::{DerivedAddress, SerializedTransaction};

// ─── Mnemonics ───────────────────────────────────────────────────────

/// Generate a new 24-word BIP-39 mnemonic
pub fn generate_mnemonic() -> Result<ZeroizingString, WalletError> {
    mnemonic::generate_mnemonic()
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> bool {
    mnemonic::validate_mnemonic(phrase)
}

/// Check if a single word is in the BIP-39 word list
pub fn is_valid_bip39_word(word: &str) -> bool {
    mnemonic::is_valid_word(word)
}

/// Derive seed bytes from mnemonic + passphrase
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<ZeroizingBytes, WalletError> {
    mnemonic::mnemonic_to_seed(phrase, passphrase)
}

// ─── Addresses ───────────────────────────────────────────────────────

/// Derive the address at m/44'/195'/account'/0/index from a mnemonic
pub fn derive_address_from_mnemonic(
    phrase: &str,
    passphrase: &str,
    network: &TronNetwork,
    account: u32,
    index: u32,
) -> Result<DerivedAddress, WalletError> {
    let seed = mnemonic::mnemonic_to_seed(phrase, passphrase)?;
    address::derive_address(&seed, network, account, index)
}

/// Validate an address for a given network
pub fn validate_address(addr: &str, network: &TronNetwork) -> bool {
    address::validate_address(addr, network)
}

// ─── Signing ─────────────────────────────────────────────────────────

/// Build and sign a native TRX transfer of `amount_sun` from the derived
/// account to `to`.
pub fn sign_trx_transfer(
    seed: &[u8],
    network: &TronNetwork,
    account: u32,
    index: u32,
    to: &str,
    amount_sun: i64,
    ref_block: &ReferenceBlock,
) -> Result<SerializedTransaction, WalletError> {
    let key = hd_derivation::derive_key_pair(seed, account, index)?;
    let owner = key.address(network).to_base58();
    let raw = build_transfer(network, &owner, to, amount_sun, ref_block)?;
    sign_and_serialize(raw, &key, network)
}

/// Build and sign a TRC-20 `transfer(to, amount)` on `token`. `amount` is
/// in the token's base units.
#[allow(clippy::too_many_arguments)]
pub fn sign_trc20_transfer(
    seed: &[u8],
    network: &TronNetwork,
    account: u32,
    index: u32,
    token: &str,
    to: &str,
    amount: U256,
    ref_block: &ReferenceBlock,
) -> Result<SerializedTransaction, WalletError> {
    let key = hd_derivation::derive_key_pair(seed, account, index)?;
    let owner = key.address(network).to_base58();
    let raw = build_trc20_transfer(network, &owner, token, to, amount, ref_block)?;
    sign_and_serialize(raw, &key, network)
}

/// Sign `raw_data` produced elsewhere (e.g. a node's `createtransaction`).
/// The bytes are signed exactly as given.
pub fn sign_raw_transaction(
    seed: &[u8],
    network: &TronNetwork,
    account: u32,
    index: u32,
    raw_data: &[u8],
) -> Result<SerializedTransaction, WalletError> {
    let key = hd_derivation::derive_key_pair(seed, account, index)?;
    let raw = RawTransaction::from_raw_bytes(raw_data)?;
    sign_and_serialize(raw, &key, network)
}

/// Sign an arbitrary message with TIP-191.
/// Returns 65-byte signature (r + s + v), v in {27, 28}.
pub fn sign_tron_message(
    seed: &[u8],
    account: u32,
    index: u32,
    message: &[u8],
) -> Result<Vec<u8>, WalletError> {
    let key = hd_derivation::derive_key_pair(seed, account, index)?;
    Ok(sign_message(message, &key)?.to_vec())
}

fn sign_and_serialize(
    raw: RawTransaction,
    key: &KeyPair,
    network: &TronNetwork,
) -> Result<SerializedTransaction, WalletError> {
    let signed = sign_all(raw, &[key])?;
    debug!(
        txid = %signed.id_hex(),
        network = %network.name,
        "signed transaction"
    );
    Ok(SerializedTransaction {
        txid: signed.id_hex(),
        raw_data_hex: hex::encode(signed.raw().raw_bytes()),
        signed_bytes: signed.encode(network.recovery_encoding),
    })
}
