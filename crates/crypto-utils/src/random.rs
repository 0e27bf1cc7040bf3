use rand::RngCore;
use rand_core::OsRng;

use crate::zeroizing::SecretArray;

/// Draws a fresh secret, wiped on drop.
///
/// Callers that need a value in a restricted range (a curve scalar) reject
/// and redraw.
pub fn random_secret<const N: usize>() -> SecretArray<N> {
    let mut secret = SecretArray::new([0u8; N]);
    OsRng.fill_bytes(secret.expose_mut());
    secret
}
