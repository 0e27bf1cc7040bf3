//! # crypto-utils
//!
//! Secret-material hygiene for the TRON wallet crates: zeroize-on-drop byte,
//! array and string wrappers, and OS randomness drawn straight into them.

pub mod error;
pub mod random;
pub mod zeroizing;

pub use error::CryptoError;
pub use zeroizing::{SecretArray, ZeroizingBytes, ZeroizingString};
