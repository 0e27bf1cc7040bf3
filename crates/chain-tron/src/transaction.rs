use alloy_primitives::U256;
use prost::Message;
use sha2::{Digest, Sha256};
use tracing::debug;
use tron_abi::EncodedCall;

use crate::address::TronAddress;
use crate::error::{AddressError, TransactionError};
use crate::network::TronNetwork;
use crate::proto::{self, ContractType};
use crate::trc20;

/// The recent block a transaction is anchored to, as reported by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceBlock {
    pub hash: [u8; 32],
    pub number: i64,
    /// Block time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ReferenceBlock {
    pub fn new(hash: [u8; 32], number: i64, timestamp: i64) -> Self {
        Self {
            hash,
            number,
            timestamp,
        }
    }

    /// Bytes 6..8 of the big-endian block number.
    pub fn ref_block_bytes(&self) -> [u8; 2] {
        let be = self.number.to_be_bytes();
        [be[6], be[7]]
    }

    /// Bytes 8..16 of the block hash.
    pub fn ref_block_hash(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.hash[8..16]);
        out
    }
}

/// What a transaction does. Amounts are in sun (1 TRX = 1_000_000 sun).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Native TRX transfer.
    Transfer {
        owner: TronAddress,
        to: TronAddress,
        amount: i64,
    },
    /// TRC-10 token transfer; `asset_name` is the token id, e.g. `"1002000"`.
    TransferAsset {
        owner: TronAddress,
        to: TronAddress,
        asset_name: String,
        amount: i64,
    },
    /// Smart contract call carrying ABI call data.
    TriggerSmartContract {
        owner: TronAddress,
        contract: TronAddress,
        data: Vec<u8>,
        call_value: i64,
        call_token_value: i64,
        token_id: i64,
    },
}

impl Instruction {
    /// A contract call without attached TRX or TRC-10 value.
    pub fn trigger(owner: TronAddress, contract: TronAddress, call: EncodedCall) -> Self {
        Instruction::TriggerSmartContract {
            owner,
            contract,
            data: call.into_bytes(),
            call_value: 0,
            call_token_value: 0,
            token_id: 0,
        }
    }

    pub fn owner(&self) -> &TronAddress {
        match self {
            Instruction::Transfer { owner, .. }
            | Instruction::TransferAsset { owner, .. }
            | Instruction::TriggerSmartContract { owner, .. } => owner,
        }
    }

    pub fn contract_type(&self) -> ContractType {
        match self {
            Instruction::Transfer { .. } => ContractType::TransferContract,
            Instruction::TransferAsset { .. } => ContractType::TransferAssetContract,
            Instruction::TriggerSmartContract { .. } => ContractType::TriggerSmartContract,
        }
    }

    pub fn is_contract_call(&self) -> bool {
        matches!(self, Instruction::TriggerSmartContract { .. })
    }

    fn validate(&self) -> Result<(), TransactionError> {
        let prefix = self.owner().prefix();
        match self {
            Instruction::Transfer { to, amount, .. } => {
                same_network("to", to, prefix)?;
                positive_amount("transfer amount", *amount)
            }
            Instruction::TransferAsset {
                to,
                asset_name,
                amount,
                ..
            } => {
                same_network("to", to, prefix)?;
                if asset_name.is_empty() {
                    return Err(TransactionError::Malformed("empty asset name".into()));
                }
                positive_amount("asset amount", *amount)
            }
            Instruction::TriggerSmartContract {
                contract,
                call_value,
                call_token_value,
                ..
            } => {
                same_network("contract", contract, prefix)?;
                non_negative("call value", *call_value)?;
                non_negative("call token value", *call_token_value)
            }
        }
    }

    fn to_any(&self) -> proto::Any {
        let value = match self {
            Instruction::Transfer { owner, to, amount } => proto::TransferContract {
                owner_address: owner.as_bytes().to_vec(),
                to_address: to.as_bytes().to_vec(),
                amount: *amount,
            }
            .encode_to_vec(),
            Instruction::TransferAsset {
                owner,
                to,
                asset_name,
                amount,
            } => proto::TransferAssetContract {
                asset_name: asset_name.as_bytes().to_vec(),
                owner_address: owner.as_bytes().to_vec(),
                to_address: to.as_bytes().to_vec(),
                amount: *amount,
            }
            .encode_to_vec(),
            Instruction::TriggerSmartContract {
                owner,
                contract,
                data,
                call_value,
                call_token_value,
                token_id,
            } => proto::TriggerSmartContract {
                owner_address: owner.as_bytes().to_vec(),
                contract_address: contract.as_bytes().to_vec(),
                call_value: *call_value,
                data: data.clone(),
                call_token_value: *call_token_value,
                token_id: *token_id,
            }
            .encode_to_vec(),
        };

        proto::Any {
            type_url: self.contract_type().type_url().to_owned(),
            value,
        }
    }
}

/// Optional fields of a raw transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Creation time in ms; defaults to the reference block's timestamp.
    pub timestamp: Option<i64>,
    /// Free-form note stored in the `data` field.
    pub memo: Vec<u8>,
    /// Account permission authorizing the transaction; 0 is the owner.
    pub permission_id: i32,
}

/// An unsigned transaction with its serialized form and id fixed at
/// construction.
///
/// There are no setters: a different payload means a different id, so the
/// only way to change a field is to build a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    raw: proto::TransactionRaw,
    bytes: Vec<u8>,
    id: [u8; 32],
}

impl RawTransaction {
    /// Adopts `raw_data` bytes built elsewhere (e.g. by a node's
    /// `createtransaction` API) exactly as received.
    ///
    /// The id is the hash of these bytes, not of a re-encoding, so
    /// signatures stay valid even if the sender used a field layout this
    /// crate would not produce.
    pub fn from_raw_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let raw = proto::TransactionRaw::decode(bytes)
            .map_err(|e| TransactionError::Malformed(e.to_string()))?;
        if raw.contract.is_empty() {
            return Err(TransactionError::Malformed("no contract".into()));
        }
        Ok(Self::from_parts(raw, bytes.to_vec()))
    }

    fn from_parts(raw: proto::TransactionRaw, bytes: Vec<u8>) -> Self {
        let id = compute_id(&bytes);
        Self { raw, bytes, id }
    }

    /// SHA-256 of the serialized raw data: the transaction id and the
    /// message every signature commits to.
    pub fn id(&self) -> [u8; 32] {
        self.id
    }

    pub fn id_hex(&self) -> String {
        hex::encode(self.id)
    }

    /// The serialized `raw_data`.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn expiration(&self) -> i64 {
        self.raw.expiration
    }

    pub fn timestamp(&self) -> i64 {
        self.raw.timestamp
    }

    pub fn fee_limit(&self) -> i64 {
        self.raw.fee_limit
    }

    pub fn ref_block_bytes(&self) -> &[u8] {
        &self.raw.ref_block_bytes
    }

    pub fn ref_block_hash(&self) -> &[u8] {
        &self.raw.ref_block_hash
    }

    pub fn memo(&self) -> &[u8] {
        &self.raw.data
    }

    pub fn permission_id(&self) -> i32 {
        self.raw.contract.first().map_or(0, |c| c.permission_id)
    }

    pub fn contract_type(&self) -> Option<ContractType> {
        let contract = self.raw.contract.first()?;
        ContractType::try_from(contract.r#type).ok()
    }

    /// Owner address of the first contract, for the contract types this
    /// crate understands.
    pub fn owner_address(&self) -> Option<TronAddress> {
        let parameter = self.raw.contract.first()?.parameter.as_ref()?;
        let owner = match self.contract_type()? {
            ContractType::TransferContract => {
                proto::TransferContract::decode(parameter.value.as_slice())
                    .ok()?
                    .owner_address
            }
            ContractType::TransferAssetContract => {
                proto::TransferAssetContract::decode(parameter.value.as_slice())
                    .ok()?
                    .owner_address
            }
            ContractType::TriggerSmartContract => {
                proto::TriggerSmartContract::decode(parameter.value.as_slice())
                    .ok()?
                    .owner_address
            }
            ContractType::AccountCreateContract => return None,
        };
        let prefix = *owner.first()?;
        TronAddress::from_bytes(&owner, prefix).ok()
    }
}

/// SHA-256 of serialized raw transaction bytes.
pub fn compute_id(raw_bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(raw_bytes).into()
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Builds a raw transaction with default [`BuildOptions`].
///
/// # Errors
///
/// - [`TransactionError::InvalidAddress`] if a counterparty address is on a
///   different network than the owner.
/// - [`TransactionError::AlreadyExpired`] if `expiration` is not after the
///   reference block's timestamp.
/// - [`TransactionError::MissingFeeLimit`] if a contract call has a
///   non-positive fee limit.
pub fn build(
    instruction: &Instruction,
    expiration: i64,
    fee_limit: i64,
    ref_block: &ReferenceBlock,
) -> Result<RawTransaction, TransactionError> {
    build_with(
        instruction,
        expiration,
        fee_limit,
        ref_block,
        &BuildOptions::default(),
    )
}

pub fn build_with(
    instruction: &Instruction,
    expiration: i64,
    fee_limit: i64,
    ref_block: &ReferenceBlock,
    options: &BuildOptions,
) -> Result<RawTransaction, TransactionError> {
    instruction.validate()?;

    if ref_block.number < 0 {
        return Err(TransactionError::InvalidReferenceBlock(format!(
            "negative block number {}",
            ref_block.number
        )));
    }
    if expiration <= ref_block.timestamp {
        return Err(TransactionError::AlreadyExpired {
            expiration,
            reference: ref_block.timestamp,
        });
    }
    if instruction.is_contract_call() {
        if fee_limit <= 0 {
            return Err(TransactionError::MissingFeeLimit(fee_limit));
        }
    } else if fee_limit < 0 {
        return Err(TransactionError::InvalidAmount(format!(
            "negative fee limit {fee_limit}"
        )));
    }
    if options.permission_id < 0 {
        return Err(TransactionError::Malformed(format!(
            "negative permission id {}",
            options.permission_id
        )));
    }

    let contract = proto::Contract {
        r#type: instruction.contract_type() as i32,
        parameter: Some(instruction.to_any()),
        permission_id: options.permission_id,
        ..Default::default()
    };

    let raw = proto::TransactionRaw {
        ref_block_bytes: ref_block.ref_block_bytes().to_vec(),
        ref_block_hash: ref_block.ref_block_hash().to_vec(),
        expiration,
        data: options.memo.clone(),
        contract: vec![contract],
        timestamp: options.timestamp.unwrap_or(ref_block.timestamp),
        fee_limit,
        ..Default::default()
    };

    let bytes = raw.encode_to_vec();
    let tx = RawTransaction::from_parts(raw, bytes);
    debug!(
        txid = %tx.id_hex(),
        contract = ?instruction.contract_type(),
        expiration,
        fee_limit,
        "built raw transaction"
    );
    Ok(tx)
}

// ---------------------------------------------------------------------------
// Text-address builders
// ---------------------------------------------------------------------------

/// Native TRX transfer between two text addresses, expiring after the
/// network's expiration window.
pub fn build_transfer(
    network: &TronNetwork,
    owner: &str,
    to: &str,
    amount: i64,
    ref_block: &ReferenceBlock,
) -> Result<RawTransaction, TransactionError> {
    let instruction = Instruction::Transfer {
        owner: parse_address("owner", owner, network)?,
        to: parse_address("to", to, network)?,
        amount,
    };
    build(&instruction, expiry(network, ref_block)?, 0, ref_block)
}

/// Contract call with the network's default fee limit.
pub fn build_trigger_smart_contract(
    network: &TronNetwork,
    owner: &str,
    contract: &str,
    call: EncodedCall,
    call_value: i64,
    ref_block: &ReferenceBlock,
) -> Result<RawTransaction, TransactionError> {
    let instruction = Instruction::TriggerSmartContract {
        owner: parse_address("owner", owner, network)?,
        contract: parse_address("contract", contract, network)?,
        data: call.into_bytes(),
        call_value,
        call_token_value: 0,
        token_id: 0,
    };
    build(
        &instruction,
        expiry(network, ref_block)?,
        network.default_fee_limit,
        ref_block,
    )
}

/// TRC-20 `transfer(to, amount)` on `token`, in the token's base units.
pub fn build_trc20_transfer(
    network: &TronNetwork,
    owner: &str,
    token: &str,
    to: &str,
    amount: U256,
    ref_block: &ReferenceBlock,
) -> Result<RawTransaction, TransactionError> {
    let recipient = parse_address("to", to, network)?;
    let call = trc20::encode_transfer(&recipient, amount)?;
    build_trigger_smart_contract(network, owner, token, call, 0, ref_block)
}

fn parse_address(
    role: &'static str,
    text: &str,
    network: &TronNetwork,
) -> Result<TronAddress, TransactionError> {
    TronAddress::parse(text, network.address_prefix)
        .map_err(|source| TransactionError::InvalidAddress { role, source })
}

fn expiry(network: &TronNetwork, ref_block: &ReferenceBlock) -> Result<i64, TransactionError> {
    ref_block
        .timestamp
        .checked_add(network.expiration_window_ms)
        .ok_or_else(|| {
            TransactionError::InvalidReferenceBlock(format!(
                "timestamp {} overflows the expiration window",
                ref_block.timestamp
            ))
        })
}

fn same_network(
    role: &'static str,
    address: &TronAddress,
    prefix: u8,
) -> Result<(), TransactionError> {
    if address.prefix() != prefix {
        return Err(TransactionError::InvalidAddress {
            role,
            source: AddressError::BadPrefix {
                expected: prefix,
                got: address.prefix(),
            },
        });
    }
    Ok(())
}

fn positive_amount(what: &str, amount: i64) -> Result<(), TransactionError> {
    if amount <= 0 {
        return Err(TransactionError::InvalidAmount(format!(
            "{what} must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn non_negative(what: &str, amount: i64) -> Result<(), TransactionError> {
    if amount < 0 {
        return Err(TransactionError::InvalidAmount(format!(
            "{what} must not be negative, got {amount}"
        )));
    }
    Ok(())
}
