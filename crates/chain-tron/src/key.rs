use std::fmt;

use crypto_utils::random::random_secret;
use crypto_utils::{SecretArray, ZeroizingBytes};
use k256::ecdsa::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::address::TronAddress;
use crate::error::SigningError;
use crate::network::{TronNetwork, MAINNET_PREFIX};

/// A secp256k1 key pair.
///
/// The private scalar lives inside `k256`'s `SigningKey`, which wipes it on
/// drop. The type is deliberately not `Clone`: signing borrows it, and the
/// scalar only leaves through [`export_private_key`](Self::export_private_key).
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Draws a fresh key from the OS RNG.
    pub fn generate() -> Self {
        loop {
            let secret = random_secret::<32>();
            // Out-of-range scalars (zero or >= n) are rejected and redrawn.
            if let Ok(key_pair) = Self::from_private_key(secret.expose()) {
                return key_pair;
            }
        }
    }

    /// Builds a key pair from a 32-byte big-endian scalar.
    ///
    /// # Errors
    ///
    /// [`SigningError::InvalidKey`] if the scalar is zero or not below the
    /// curve order.
    pub fn from_private_key(private_key: &[u8; 32]) -> Result<Self, SigningError> {
        let mut key_bytes = *private_key;
        let signing_key = SigningKey::from_bytes((&key_bytes).into())
            .map_err(|_| SigningError::InvalidKey("scalar is zero or exceeds the curve order".into()));
        key_bytes.zeroize();
        Ok(Self {
            signing_key: signing_key?,
        })
    }

    /// Parses a 64-digit hex private key, with or without `0x`.
    pub fn from_hex(private_key_hex: &str) -> Result<Self, SigningError> {
        let secret = SecretArray::<32>::from_hex(private_key_hex)
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        Self::from_private_key(secret.expose())
    }

    /// 65-byte SEC1 public key, `0x04 || x || y`.
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        let point = self.verifying_key().to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// 33-byte SEC1 compressed public key.
    pub fn public_key_compressed(&self) -> [u8; 33] {
        let point = self.verifying_key().to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// The key's address on `network`. Derived on every call, never cached.
    pub fn address(&self, network: &TronNetwork) -> TronAddress {
        self.address_with_prefix(network.address_prefix)
    }

    pub fn address_with_prefix(&self, prefix: u8) -> TronAddress {
        TronAddress::from_verifying_key(self.verifying_key(), prefix)
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Copies the private scalar out into a buffer that is wiped on drop.
    pub fn export_private_key(&self) -> ZeroizingBytes {
        let mut scalar = self.signing_key.to_bytes();
        let exported = ZeroizingBytes::new(scalar.to_vec());
        scalar.as_mut_slice().zeroize();
        exported
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address_with_prefix(MAINNET_PREFIX))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_one() -> KeyPair {
        let mut scalar = [0u8; 32];
        scalar[31] = 1;
        KeyPair::from_private_key(&scalar).unwrap()
    }

    #[test]
    fn key_one_address() {
        let address = key_one().address(&TronNetwork::mainnet());
        assert_eq!(address.to_base58(), "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC");
    }

    #[test]
    fn public_key_forms() {
        let key = key_one();
        let uncompressed = key.public_key_uncompressed();
        let compressed = key.public_key_compressed();
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(compressed[0], 0x02);
        assert_eq!(&uncompressed[1..33], &compressed[1..]);

        let via_compressed = TronAddress::from_public_key(&compressed, MAINNET_PREFIX).unwrap();
        assert_eq!(via_compressed, key.address_with_prefix(MAINNET_PREFIX));
    }

    #[test]
    fn zero_and_order_are_rejected() {
        assert!(matches!(
            KeyPair::from_private_key(&[0u8; 32]),
            Err(SigningError::InvalidKey(_))
        ));
        // secp256k1 group order n.
        let order = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";
        assert!(matches!(KeyPair::from_hex(order), Err(SigningError::InvalidKey(_))));
        assert!(matches!(KeyPair::from_hex("0x1234"), Err(SigningError::InvalidKey(_))));
    }

    #[test]
    fn hex_import_and_export() {
        let hex_key = format!("0x{}01", "00".repeat(31));
        let key = KeyPair::from_hex(&hex_key).unwrap();
        let exported = key.export_private_key();
        assert_eq!(exported.len(), 32);
        assert_eq!(&*exported.to_hex(), &hex_key[2..]);
    }

    #[test]
    fn exported_scalar_reimports_to_same_key() {
        let key = KeyPair::generate();
        let exported = key.export_private_key();
        let scalar: [u8; 32] = exported[..].try_into().unwrap();
        let again = KeyPair::from_private_key(&scalar).unwrap();
        assert_eq!(again.public_key_compressed(), key.public_key_compressed());
    }

    #[test]
    fn generated_keys_are_distinct() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.public_key_compressed(), b.public_key_compressed());
    }

    #[test]
    fn debug_never_prints_the_scalar() {
        let key = key_one();
        let debug = format!("{key:?}");
        assert!(debug.contains("TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC"));
        assert!(!debug.contains("signing_key"));
    }
}
