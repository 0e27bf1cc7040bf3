use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::error::AddressError;
use crate::network::MAINNET_PREFIX;

/// Prefix byte plus 20-byte account hash.
pub const ADDRESS_LEN: usize = 21;

const CHECKSUM_LEN: usize = 4;

/// A TRON account address: network prefix byte followed by the last 20
/// bytes of the Keccak-256 hash of the account's public key.
///
/// The length is fixed by the type; every constructor checks the prefix
/// against the network the caller expects.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TronAddress([u8; ADDRESS_LEN]);

impl TronAddress {
    /// Wraps raw address bytes after checking length, then prefix.
    pub fn from_bytes(bytes: &[u8], expected_prefix: u8) -> Result<Self, AddressError> {
        let raw: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::BadLength(bytes.len()))?;
        if raw[0] != expected_prefix {
            return Err(AddressError::BadPrefix {
                expected: expected_prefix,
                got: raw[0],
            });
        }
        Ok(Self(raw))
    }

    /// Joins a prefix and a 20-byte EVM-style address, as found in ABI data.
    pub fn from_evm_address(prefix: u8, address: Address) -> Self {
        let mut raw = [0u8; ADDRESS_LEN];
        raw[0] = prefix;
        raw[1..].copy_from_slice(address.as_slice());
        Self(raw)
    }

    /// Derives the address of a SEC1-encoded public key.
    ///
    /// Accepts the 65-byte uncompressed form and the 33-byte compressed form.
    pub fn from_public_key(public_key: &[u8], prefix: u8) -> Result<Self, AddressError> {
        let key = PublicKey::from_sec1_bytes(public_key)
            .map_err(|e| AddressError::InvalidPublicKey(e.to_string()))?;
        let point = key.to_encoded_point(false);
        Ok(Self::from_uncompressed_point(point.as_bytes(), prefix))
    }

    pub fn from_verifying_key(key: &VerifyingKey, prefix: u8) -> Self {
        let point = key.to_encoded_point(false);
        Self::from_uncompressed_point(point.as_bytes(), prefix)
    }

    /// `point` is `0x04 || x || y`; the hash covers `x || y` only.
    fn from_uncompressed_point(point: &[u8], prefix: u8) -> Self {
        let hash = Keccak256::digest(&point[1..]);
        let mut raw = [0u8; ADDRESS_LEN];
        raw[0] = prefix;
        raw[1..].copy_from_slice(&hash[12..]);
        Self(raw)
    }

    /// Decodes the checksummed Base58 text form.
    pub fn from_base58(text: &str, expected_prefix: u8) -> Result<Self, AddressError> {
        let decoded = bs58::decode(text.trim())
            .into_vec()
            .map_err(|e| AddressError::InvalidEncoding(format!("invalid base58: {e}")))?;

        if decoded.len() != ADDRESS_LEN + CHECKSUM_LEN {
            return Err(AddressError::BadLength(
                decoded.len().saturating_sub(CHECKSUM_LEN),
            ));
        }

        let (payload, checksum) = decoded.split_at(ADDRESS_LEN);
        if checksum != double_sha256_checksum(payload) {
            return Err(AddressError::BadChecksum);
        }

        Self::from_bytes(payload, expected_prefix)
    }

    /// Decodes the 42-digit hex form, with or without `0x`. The hex form
    /// carries no checksum.
    pub fn from_hex(text: &str, expected_prefix: u8) -> Result<Self, AddressError> {
        let text = text.trim();
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        let bytes = hex::decode(digits)
            .map_err(|e| AddressError::InvalidEncoding(format!("invalid hex: {e}")))?;
        Self::from_bytes(&bytes, expected_prefix)
    }

    /// Accepts either text form: hex when the input is all hex digits of the
    /// right length, Base58 otherwise.
    pub fn parse(text: &str, expected_prefix: u8) -> Result<Self, AddressError> {
        if looks_like_hex(text.trim()) {
            Self::from_hex(text, expected_prefix)
        } else {
            Self::from_base58(text, expected_prefix)
        }
    }

    pub fn to_base58(&self) -> String {
        let mut payload = Vec::with_capacity(ADDRESS_LEN + CHECKSUM_LEN);
        payload.extend_from_slice(&self.0);
        payload.extend_from_slice(&double_sha256_checksum(&self.0));
        bs58::encode(payload).into_string()
    }

    /// Lower-case hex of all 21 bytes, without `0x`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn prefix(&self) -> u8 {
        self.0[0]
    }

    /// The 20-byte hash used for ABI `address` values.
    pub fn evm_address(&self) -> Address {
        Address::from_slice(&self.0[1..])
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TronAddress({})", self.to_base58())
    }
}

/// Parses Base58 or hex text against the mainnet prefix.
impl FromStr for TronAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TronAddress::parse(s, MAINNET_PREFIX)
    }
}

impl AsRef<[u8]> for TronAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Returns `true` if `text` decodes to an address with `expected_prefix`.
pub fn is_valid_address(text: &str, expected_prefix: u8) -> bool {
    TronAddress::parse(text, expected_prefix).is_ok()
}

fn looks_like_hex(text: &str) -> bool {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    digits.len() == ADDRESS_LEN * 2 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// First four bytes of SHA-256(SHA-256(data)).
fn double_sha256_checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&second[..CHECKSUM_LEN]);
    checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    // Private key 1: the secp256k1 generator point.
    const GENERATOR_UNCOMPRESSED: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
         483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";
    const GENERATOR_COMPRESSED: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const GENERATOR_ADDRESS: &str = "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC";
    const GENERATOR_HEX: &str = "417e5f4552091a69125d5dfcb7b8c2659029395bdf";

    const USDT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
    const USDT_HEX: &str = "41a614f803b6fd780986a42c78ec9c7f77e6ded13c";

    #[test]
    fn derive_from_uncompressed_key() {
        let key = hex::decode(GENERATOR_UNCOMPRESSED).unwrap();
        let address = TronAddress::from_public_key(&key, MAINNET_PREFIX).unwrap();
        assert_eq!(address.to_base58(), GENERATOR_ADDRESS);
        assert_eq!(address.to_hex(), GENERATOR_HEX);
    }

    #[test]
    fn derive_from_compressed_key() {
        let key = hex::decode(GENERATOR_COMPRESSED).unwrap();
        let address = TronAddress::from_public_key(&key, MAINNET_PREFIX).unwrap();
        assert_eq!(address.to_string(), GENERATOR_ADDRESS);
    }

    #[test]
    fn derive_rejects_points_off_curve() {
        let mut key = hex::decode(GENERATOR_UNCOMPRESSED).unwrap();
        key[64] ^= 1;
        assert!(matches!(
            TronAddress::from_public_key(&key, MAINNET_PREFIX),
            Err(AddressError::InvalidPublicKey(_))
        ));
        assert!(TronAddress::from_public_key(&[0x04; 10], MAINNET_PREFIX).is_err());
    }

    #[test]
    fn base58_and_hex_agree() {
        let from_text = TronAddress::from_base58(USDT, MAINNET_PREFIX).unwrap();
        let from_hex = TronAddress::from_hex(USDT_HEX, MAINNET_PREFIX).unwrap();
        let from_0x = TronAddress::from_hex(&format!("0x{USDT_HEX}"), MAINNET_PREFIX).unwrap();
        assert_eq!(from_text, from_hex);
        assert_eq!(from_text, from_0x);
        assert_eq!(from_hex.to_base58(), USDT);
    }

    #[test]
    fn zero_hash_address() {
        let mut raw = [0u8; ADDRESS_LEN];
        raw[0] = MAINNET_PREFIX;
        let address = TronAddress::from_bytes(&raw, MAINNET_PREFIX).unwrap();
        assert_eq!(address.to_base58(), "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb");
    }

    #[test]
    fn parse_detects_form() {
        let a: TronAddress = USDT.parse().unwrap();
        let b: TronAddress = USDT_HEX.parse().unwrap();
        assert_eq!(a, b);
        assert!(is_valid_address(USDT, MAINNET_PREFIX));
        assert!(!is_valid_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u", MAINNET_PREFIX));
    }

    #[test]
    fn bad_checksum() {
        // Last character changed.
        assert_eq!(
            TronAddress::from_base58("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u", MAINNET_PREFIX),
            Err(AddressError::BadChecksum)
        );
    }

    #[test]
    fn bad_length() {
        let mut payload = vec![MAINNET_PREFIX; 20];
        payload.extend_from_slice(&double_sha256_checksum(&payload));
        let text = bs58::encode(payload).into_string();
        assert_eq!(
            TronAddress::from_base58(&text, MAINNET_PREFIX),
            Err(AddressError::BadLength(20))
        );
        assert_eq!(
            TronAddress::from_hex("41a614f803", MAINNET_PREFIX),
            Err(AddressError::BadLength(5))
        );
    }

    #[test]
    fn bad_prefix() {
        // Same hash as USDT, prefix 0xa0.
        assert_eq!(
            TronAddress::from_base58("27abhp5LCcYZjKq8Ry84hpNNHLmp9Q6YVxY", MAINNET_PREFIX),
            Err(AddressError::BadPrefix {
                expected: 0x41,
                got: 0xa0
            })
        );
        assert!(matches!(
            TronAddress::from_hex("a0a614f803b6fd780986a42c78ec9c7f77e6ded13c", MAINNET_PREFIX),
            Err(AddressError::BadPrefix { got: 0xa0, .. })
        ));
    }

    #[test]
    fn invalid_encodings() {
        assert!(matches!(
            TronAddress::from_base58("T0OIl", MAINNET_PREFIX),
            Err(AddressError::InvalidEncoding(_))
        ));
        assert!(matches!(
            TronAddress::from_hex("zz", MAINNET_PREFIX),
            Err(AddressError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn evm_boundary() {
        let address = TronAddress::from_base58(USDT, MAINNET_PREFIX).unwrap();
        let evm = address.evm_address();
        assert_eq!(hex::encode(evm), &USDT_HEX[2..]);
        assert_eq!(TronAddress::from_evm_address(MAINNET_PREFIX, evm), address);
    }

    #[test]
    fn debug_shows_base58() {
        let address: TronAddress = USDT.parse().unwrap();
        assert_eq!(format!("{address:?}"), format!("TronAddress({USDT})"));
    }
}
