use thiserror::Error;

/// ABI encoding and decoding errors.
///
/// All variants are local input-validation failures: nothing is retried and
/// no partially encoded output is ever returned alongside them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("arity mismatch: expected {expected} values, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("truncated data: need {needed} bytes at offset {offset}, have {available}")]
    TruncatedData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid offset {offset}: decoded output outgrows the input")]
    InvalidOffset { offset: usize },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("selector mismatch: expected {expected}, found {found}")]
    SelectorMismatch { expected: String, found: String },

    #[error("invalid abi json: {0}")]
    InvalidAbi(String),
}
