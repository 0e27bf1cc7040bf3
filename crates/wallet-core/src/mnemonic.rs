use bip39::{Language, Mnemonic};
use crypto_utils::random::random_secret;
use crypto_utils::{ZeroizingBytes, ZeroizingString};
use zeroize::Zeroize;

use crate::error::WalletError;

/// Word counts BIP-39 allows, with their entropy sizes in bytes.
const ENTROPY_BYTES: [(usize, usize); 5] = [(12, 16), (15, 20), (18, 24), (21, 28), (24, 32)];

/// Generate a new 24-word BIP-39 mnemonic (256 bits of entropy)
pub fn generate_mnemonic() -> Result<ZeroizingString, WalletError> {
    generate_mnemonic_with_words(24)
}

/// Generate a mnemonic of `word_count` words (12, 15, 18, 21 or 24).
pub fn generate_mnemonic_with_words(word_count: usize) -> Result<ZeroizingString, WalletError> {
    let entropy_len = ENTROPY_BYTES
        .iter()
        .find(|(words, _)| *words == word_count)
        .map(|(_, bytes)| *bytes)
        .ok_or_else(|| {
            WalletError::InvalidMnemonic(format!("unsupported word count {word_count}"))
        })?;

    let entropy = random_secret::<32>();
    let mut mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy.expose()[..entropy_len])
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    let phrase = ZeroizingString::new(mnemonic.to_string());
    mnemonic.zeroize();
    Ok(phrase)
}

/// Validate a mnemonic phrase (word list and checksum)
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Derive the 64-byte BIP-39 seed from mnemonic + optional passphrase.
/// The seed is wiped when the returned buffer is dropped.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<ZeroizingBytes, WalletError> {
    let mut mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    let mut seed = mnemonic.to_seed(passphrase);
    let out = ZeroizingBytes::new(seed.to_vec());
    seed.zeroize();
    mnemonic.zeroize();
    Ok(out)
}

/// Get the word list for autocomplete
pub fn word_list() -> &'static [&'static str] {
    Language::English.word_list()
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}
