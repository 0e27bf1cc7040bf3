use chain_tron::TronError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Tron(#[from] TronError),
}

impl From<chain_tron::TransactionError> for WalletError {
    fn from(e: chain_tron::TransactionError) -> Self {
        WalletError::Tron(e.into())
    }
}

impl From<chain_tron::SigningError> for WalletError {
    fn from(e: chain_tron::SigningError) -> Self {
        WalletError::Tron(e.into())
    }
}
