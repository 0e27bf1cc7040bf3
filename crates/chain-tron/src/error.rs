use thiserror::Error;
use tron_abi::EncodingError;

/// Address decoding and derivation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("bad checksum")]
    BadChecksum,

    #[error("bad length: expected 21 bytes, got {0}")]
    BadLength(usize),

    #[error("bad prefix: expected 0x{expected:02x}, got 0x{got:02x}")]
    BadPrefix { expected: u8, got: u8 },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Key handling, signing and signature attachment errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("duplicate signer: {0}")]
    DuplicateSigner(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Errors raised while building a raw transaction, before anything is hashed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("invalid {role} address: {source}")]
    InvalidAddress {
        role: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("already expired: expiration {expiration} is not after reference block time {reference}")]
    AlreadyExpired { expiration: i64, reference: i64 },

    #[error("missing fee limit: contract calls need a positive fee limit, got {0}")]
    MissingFeeLimit(i64),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid reference block: {0}")]
    InvalidReferenceBlock(String),

    #[error("malformed transaction: {0}")]
    Malformed(String),

    #[error("call encoding failed: {0}")]
    Encoding(#[from] EncodingError),
}

/// Umbrella error for callers that drive the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TronError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_bad_checksum() {
        assert_eq!(AddressError::BadChecksum.to_string(), "bad checksum");
    }

    #[test]
    fn display_bad_length() {
        assert_eq!(
            AddressError::BadLength(20).to_string(),
            "bad length: expected 21 bytes, got 20"
        );
    }

    #[test]
    fn display_bad_prefix() {
        let err = AddressError::BadPrefix {
            expected: 0x41,
            got: 0xa0,
        };
        assert_eq!(err.to_string(), "bad prefix: expected 0x41, got 0xa0");
    }

    #[test]
    fn display_invalid_key() {
        let err = SigningError::InvalidKey("scalar is zero".into());
        assert_eq!(err.to_string(), "invalid private key: scalar is zero");
    }

    #[test]
    fn display_duplicate_signer() {
        let err = SigningError::DuplicateSigner("TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC".into());
        assert_eq!(
            err.to_string(),
            "duplicate signer: TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC"
        );
    }

    #[test]
    fn display_invalid_address_names_role() {
        let err = TransactionError::InvalidAddress {
            role: "owner",
            source: AddressError::BadChecksum,
        };
        assert_eq!(err.to_string(), "invalid owner address: bad checksum");
    }

    #[test]
    fn display_already_expired() {
        let err = TransactionError::AlreadyExpired {
            expiration: 10,
            reference: 10,
        };
        assert_eq!(
            err.to_string(),
            "already expired: expiration 10 is not after reference block time 10"
        );
    }

    #[test]
    fn display_missing_fee_limit() {
        assert_eq!(
            TransactionError::MissingFeeLimit(0).to_string(),
            "missing fee limit: contract calls need a positive fee limit, got 0"
        );
    }

    #[test]
    fn umbrella_is_transparent() {
        let err: TronError = AddressError::BadChecksum.into();
        assert_eq!(err.to_string(), "bad checksum");

        let err = TronError::InvalidConfig("fee limit must be positive".into());
        assert_eq!(err.to_string(), "invalid config: fee limit must be positive");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(TransactionError::InvalidAddress {
            role: "to",
            source: AddressError::BadLength(3),
        });
        assert!(err.source().is_some());
    }

    #[test]
    fn debug_format_works() {
        let debug = format!("{:?}", SigningError::InvalidSignature("v".into()));
        assert!(debug.contains("InvalidSignature"));
    }
}
