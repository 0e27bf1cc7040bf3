use serde::{Deserialize, Serialize};

/// Address derived from a seed, with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    /// Base58Check form, e.g. `T...`.
    pub address: String,
    /// Hex form with the network prefix byte.
    pub address_hex: String,
    /// 33-byte compressed public key, hex.
    pub public_key_hex: String,
    pub derivation_path: String,
}

/// A signed transaction ready for `broadcasthex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTransaction {
    /// Transaction id, hex.
    pub txid: String,
    /// Serialized `raw_data`, hex.
    pub raw_data_hex: String,
    /// Serialized `protocol.Transaction` with signatures.
    pub signed_bytes: Vec<u8>,
}
