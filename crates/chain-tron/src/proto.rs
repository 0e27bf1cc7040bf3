//! Wire messages from the TRON `protocol` package, limited to the fields this
//! crate writes. Field numbers match `core/Tron.proto` and
//! `core/contract/*.proto` so the encoding is byte-identical to a node's.

/// `google.protobuf.Any`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: ::prost::alloc::vec::Vec<u8>,
}

/// `protocol.Transaction`.
///
/// `raw_data` is held as the serialized `TransactionRaw` rather than as a
/// nested message, so the bytes the id was computed over are carried through
/// decode and re-encode untouched. Both forms are the same on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(bytes = "vec", tag = "1")]
    pub raw_data: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub signature: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// `protocol.Transaction.raw`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionRaw {
    #[prost(bytes = "vec", tag = "1")]
    pub ref_block_bytes: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "3")]
    pub ref_block_num: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub ref_block_hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "8")]
    pub expiration: i64,
    #[prost(bytes = "vec", tag = "10")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "11")]
    pub contract: ::prost::alloc::vec::Vec<Contract>,
    #[prost(bytes = "vec", tag = "12")]
    pub scripts: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "14")]
    pub timestamp: i64,
    #[prost(int64, tag = "18")]
    pub fee_limit: i64,
}

/// `protocol.Transaction.Contract`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Contract {
    #[prost(enumeration = "ContractType", tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub parameter: ::core::option::Option<Any>,
    #[prost(bytes = "vec", tag = "3")]
    pub provider: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub contract_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(int32, tag = "5")]
    pub permission_id: i32,
}

/// `protocol.Transaction.Contract.ContractType`, the variants this crate builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ContractType {
    AccountCreateContract = 0,
    TransferContract = 1,
    TransferAssetContract = 2,
    TriggerSmartContract = 31,
}

impl ContractType {
    /// Type URL of the `Any` wrapping this contract's parameter.
    pub fn type_url(self) -> &'static str {
        match self {
            ContractType::AccountCreateContract => {
                "type.googleapis.com/protocol.AccountCreateContract"
            }
            ContractType::TransferContract => "type.googleapis.com/protocol.TransferContract",
            ContractType::TransferAssetContract => {
                "type.googleapis.com/protocol.TransferAssetContract"
            }
            ContractType::TriggerSmartContract => {
                "type.googleapis.com/protocol.TriggerSmartContract"
            }
        }
    }
}

/// `protocol.TransferContract`: native TRX transfer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "3")]
    pub amount: i64,
}

/// `protocol.TransferAssetContract`: TRC-10 transfer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferAssetContract {
    #[prost(bytes = "vec", tag = "1")]
    pub asset_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub to_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "4")]
    pub amount: i64,
}

/// `protocol.TriggerSmartContract`: contract call.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TriggerSmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "3")]
    pub call_value: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "5")]
    pub call_token_value: i64,
    #[prost(int64, tag = "6")]
    pub token_id: i64,
}
