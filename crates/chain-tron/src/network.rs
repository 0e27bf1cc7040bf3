use serde::{Deserialize, Serialize};

use crate::error::{SigningError, TronError};

/// Address prefix byte shared by every public TRON network.
pub const MAINNET_PREFIX: u8 = 0x41;

/// Fee limit applied by the text-address builders: 150 TRX in sun.
pub const DEFAULT_FEE_LIMIT: i64 = 150_000_000;

/// Validity window applied by the text-address builders.
pub const DEFAULT_EXPIRATION_WINDOW_MS: i64 = 60_000;

/// How the recovery id is written in the last byte of a 65-byte signature.
///
/// TRON nodes recover signers from a raw id of 0 or 1. Ethereum-derived
/// tooling often expects 27 or 28 instead, so the choice is configured per
/// network rather than fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryEncoding {
    #[default]
    Raw,
    Offset27,
}

impl RecoveryEncoding {
    /// Serialized `v` byte for a canonical recovery id (0 or 1).
    pub fn encode(self, recovery_id: u8) -> u8 {
        match self {
            RecoveryEncoding::Raw => recovery_id,
            RecoveryEncoding::Offset27 => recovery_id + 27,
        }
    }

    /// Canonical recovery id from a serialized `v` byte.
    pub fn decode(self, v: u8) -> Result<u8, SigningError> {
        let id = match self {
            RecoveryEncoding::Raw => v,
            RecoveryEncoding::Offset27 => v.wrapping_sub(27),
        };
        if id > 1 {
            return Err(SigningError::InvalidSignature(format!(
                "recovery byte {v} is not valid for {self:?} encoding"
            )));
        }
        Ok(id)
    }
}

/// A TRON network definition.
///
/// Endpoints are metadata for whichever transport submits transactions;
/// nothing in this crate performs I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TronNetwork {
    pub name: String,
    #[serde(default = "default_prefix")]
    pub address_prefix: u8,
    pub grpc_endpoint: String,
    pub solidity_endpoint: String,
    pub explorer_url: String,
    pub is_testnet: bool,
    #[serde(default)]
    pub recovery_encoding: RecoveryEncoding,
    /// Fee limit in sun used when a caller does not supply one.
    #[serde(default = "default_fee_limit")]
    pub default_fee_limit: i64,
    #[serde(default = "default_expiration_window")]
    pub expiration_window_ms: i64,
}

fn default_prefix() -> u8 {
    MAINNET_PREFIX
}

fn default_fee_limit() -> i64 {
    DEFAULT_FEE_LIMIT
}

fn default_expiration_window() -> i64 {
    DEFAULT_EXPIRATION_WINDOW_MS
}

impl TronNetwork {
    pub fn mainnet() -> Self {
        Self::preset(
            "TRON Mainnet",
            "grpc.trongrid.io:50051",
            "grpc.trongrid.io:50052",
            "https://tronscan.org",
            false,
        )
    }

    pub fn nile() -> Self {
        Self::preset(
            "Nile Testnet",
            "grpc.nile.trongrid.io:50051",
            "grpc.nile.trongrid.io:50061",
            "https://nile.tronscan.org",
            true,
        )
    }

    pub fn shasta() -> Self {
        Self::preset(
            "Shasta Testnet",
            "grpc.shasta.trongrid.io:50051",
            "grpc.shasta.trongrid.io:50052",
            "https://shasta.tronscan.org",
            true,
        )
    }

    fn preset(
        name: &str,
        grpc: &str,
        solidity: &str,
        explorer: &str,
        is_testnet: bool,
    ) -> Self {
        Self {
            name: name.into(),
            address_prefix: MAINNET_PREFIX,
            grpc_endpoint: grpc.into(),
            solidity_endpoint: solidity.into(),
            explorer_url: explorer.into(),
            is_testnet,
            recovery_encoding: RecoveryEncoding::Raw,
            default_fee_limit: DEFAULT_FEE_LIMIT,
            expiration_window_ms: DEFAULT_EXPIRATION_WINDOW_MS,
        }
    }

    /// Loads and validates a network definition from JSON. Omitted optional
    /// fields take the mainnet defaults.
    pub fn from_json(json: &str) -> Result<Self, TronError> {
        let network: TronNetwork =
            serde_json::from_str(json).map_err(|e| TronError::InvalidConfig(e.to_string()))?;
        network.validate()?;
        Ok(network)
    }

    pub fn validate(&self) -> Result<(), TronError> {
        if self.default_fee_limit <= 0 {
            return Err(TronError::InvalidConfig(format!(
                "default_fee_limit must be positive, got {}",
                self.default_fee_limit
            )));
        }
        if self.expiration_window_ms <= 0 {
            return Err(TronError::InvalidConfig(format!(
                "expiration_window_ms must be positive, got {}",
                self.expiration_window_ms
            )));
        }
        Ok(())
    }

    /// Explorer page for a transaction id.
    pub fn transaction_url(&self, txid_hex: &str) -> String {
        format!("{}/#/transaction/{txid_hex}", self.explorer_url)
    }
}

impl Default for TronNetwork {
    fn default() -> Self {
        Self::mainnet()
    }
}
