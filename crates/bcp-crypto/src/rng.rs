//! Randomness for production calls.
//!
//! Every randomized operation has a `_with_rng` form that takes a
//! caller-provided `RngCore + CryptoRng`, which keeps tests deterministic.
//! The plain forms build a fresh generator per call with [`os_rng`], so no
//! generator state is ever shared between threads.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroizing;

use crate::error::BcpError;

/// `ChaCha20Rng` seeded from the OS cryptographic RNG (getrandom).
///
/// # Errors
///
/// - `EntropyUnavailable`: the OS refused to provide entropy. Retryable.
pub fn os_rng() -> Result<ChaCha20Rng, BcpError> {
    let mut seed = Zeroizing::new([0u8; 32]);
    getrandom::fill(seed.as_mut_slice()).map_err(|_| BcpError::EntropyUnavailable)?;
    Ok(ChaCha20Rng::from_seed(*seed))
}
