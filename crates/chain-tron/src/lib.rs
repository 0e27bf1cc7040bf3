//! TRON chain support for the wallet.
//!
//! This crate provides:
//! - Base58Check / hex address codec with network prefix checks
//! - secp256k1 key pairs and address derivation
//! - Protobuf raw transaction building (TRX, TRC-10, contract calls)
//! - Transaction signing, multi-signature attachment and verification
//! - TRC-20 call data helpers on top of `tron-abi`
//! - TIP-191 message signing
//! - Network definitions (mainnet, Nile, Shasta)

pub mod address;
pub mod error;
pub mod key;
pub mod message;
pub mod network;
pub mod proto;
pub mod signing;
pub mod transaction;
pub mod trc20;

pub use address::{is_valid_address, TronAddress, ADDRESS_LEN};
pub use error::{AddressError, SigningError, TransactionError, TronError};
pub use key::KeyPair;
pub use message::{hash_message, recover_message_signer, sign_message, verify_message};
pub use network::{RecoveryEncoding, TronNetwork, MAINNET_PREFIX};
pub use signing::{attach, sign, sign_all, verify, Permission, Signature, SignedTransaction};
pub use transaction::{
    build, build_transfer, build_trc20_transfer, build_trigger_smart_contract, build_with,
    compute_id, BuildOptions, Instruction, RawTransaction, ReferenceBlock,
};
