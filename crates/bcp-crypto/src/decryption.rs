//! Holder decryption.
//!
//! All failure modes after key validation (foreign parameters, non-unit
//! encapsulation, wrong key, tampered payload or tag) collapse into a single
//! [`BcpError::DecryptionFailed`]. The recovered scalar is never checked for
//! well-formedness; a wrong key only surfaces when the tag fails to verify,
//! and no plaintext is released before that.

use chacha20poly1305::{
    Tag, XChaCha20Poly1305, XNonce,
    aead::{AeadInPlace, KeyInit},
};
use num_bigint::BigUint;

use crate::{
    arith::l_function,
    encryption::{Ciphertext, PAYLOAD_AAD},
    error::BcpError,
    kdf::derive_payload_key,
    keys::SecretKey,
    params::Parameters,
    scalar::Encapsulation,
};

/// Decrypt a ciphertext with the holder secret key.
///
/// # Errors
///
/// - `InvalidSecretKey`: key fails validation against `params`
/// - `DecryptionFailed`: tampered, ill-formed, or wrongly keyed ciphertext
pub fn decrypt(
    params: &Parameters,
    ciphertext: &Ciphertext,
    secret_key: &SecretKey,
) -> Result<Vec<u8>, BcpError> {
    let exponent = secret_key.exponent(params)?;
    let public_element = params.g.modpow(&exponent, &params.n_squared);

    let encapsulation = checked_encapsulation(params, ciphertext)?;
    let scalar = encapsulation
        .unblind(params, &exponent)
        .map(|unblinded| l_function(&unblinded, &params.n))
        .ok_or(BcpError::DecryptionFailed)?;

    open_payload(params, ciphertext, &public_element, &scalar)
}

/// Structural checks that need no key material.
pub(crate) fn checked_encapsulation<'a>(
    params: &Parameters,
    ciphertext: &'a Ciphertext,
) -> Result<&'a Encapsulation, BcpError> {
    if ciphertext.params_id != params.id() || !ciphertext.encapsulation.is_well_formed(params) {
        tracing::trace!("ciphertext rejected before tag check");
        return Err(BcpError::DecryptionFailed);
    }
    Ok(&ciphertext.encapsulation)
}

/// Derive the payload key from a recovered scalar and open the AEAD.
///
/// The tag is verified before any keystream is applied.
pub(crate) fn open_payload(
    params: &Parameters,
    ciphertext: &Ciphertext,
    public_element: &BigUint,
    scalar: &BigUint,
) -> Result<Vec<u8>, BcpError> {
    let key = derive_payload_key(params, scalar, public_element, &ciphertext.encapsulation);
    let cipher = XChaCha20Poly1305::new((&*key).into());

    let mut plaintext = ciphertext.payload.clone();
    cipher
        .decrypt_in_place_detached(
            XNonce::from_slice(&ciphertext.nonce),
            PAYLOAD_AAD,
            &mut plaintext,
            Tag::from_slice(&ciphertext.tag),
        )
        .map_err(|_| {
            tracing::trace!("payload authentication failed");
            BcpError::DecryptionFailed
        })?;

    Ok(plaintext)
}
