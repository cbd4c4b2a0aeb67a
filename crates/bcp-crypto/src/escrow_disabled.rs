//! Master decryption in builds without the `escrow` feature.
//!
//! The trapdoor algebra is not compiled; both entry points fail
//! unconditionally.

use num_bigint::BigUint;

use crate::{
    encryption::Ciphertext, error::BcpError, keys::PublicKey, params::Parameters,
    scalar::ScalarCiphertext,
};

/// Always fails: master decryption is not compiled into this build.
///
/// # Errors
///
/// - `MasterKeyUnavailable`: always
pub fn master_decrypt(
    _params: &Parameters,
    _ciphertext: &Ciphertext,
    _public_key: &PublicKey,
) -> Result<Vec<u8>, BcpError> {
    Err(BcpError::MasterKeyUnavailable)
}

/// Always fails: master decryption is not compiled into this build.
///
/// # Errors
///
/// - `MasterKeyUnavailable`: always
pub fn master_decrypt_scalar(
    _params: &Parameters,
    _ciphertext: &ScalarCiphertext,
    _public_key: &PublicKey,
) -> Result<BigUint, BcpError> {
    Err(BcpError::MasterKeyUnavailable)
}
