//! TIP-191 personal message signing, as done by TronLink's `signMessageV2`.
//!
//! The digest is `keccak256("\x19TRON Signed Message:\n" || len || message)`
//! where `len` is the decimal byte length of `message`. Signatures are
//! `r || s || v` with `v` in {27, 28}.

use sha3::{Digest, Keccak256};

use crate::address::TronAddress;
use crate::error::SigningError;
use crate::key::KeyPair;
use crate::network::RecoveryEncoding;
use crate::signing::{sign_prehash, Signature, SIGNATURE_LEN};

pub const MESSAGE_PREFIX: &str = "\x19TRON Signed Message:\n";

pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

pub fn sign_message(message: &[u8], key: &KeyPair) -> Result<[u8; SIGNATURE_LEN], SigningError> {
    let signature = sign_prehash(&hash_message(message), key)?;
    Ok(signature.to_bytes(RecoveryEncoding::Offset27))
}

/// Recovers the signer of a TIP-191 signature. Both `v` conventions
/// (27/28 and 0/1) are accepted.
pub fn recover_message_signer(
    message: &[u8],
    signature: &[u8],
    prefix: u8,
) -> Result<TronAddress, SigningError> {
    let encoding = match signature.get(SIGNATURE_LEN - 1) {
        Some(v) if *v >= 27 => RecoveryEncoding::Offset27,
        _ => RecoveryEncoding::Raw,
    };
    let signature = Signature::from_bytes(signature, encoding)?;
    signature.recover(&hash_message(message), prefix)
}

pub fn verify_message(message: &[u8], signature: &[u8], expected: &TronAddress) -> bool {
    recover_message_signer(message, signature, expected.prefix())
        .is_ok_and(|signer| signer == *expected)
}
