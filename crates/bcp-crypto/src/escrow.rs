//! Master decryption: recovery through the factorization trapdoor.
//!
//! The master secret `mk = p'q'` collapses any element of `Z*_{n^2}` raised
//! to it onto the subgroup `1 + n·Z_n`, where `L` reads off discrete logs
//! to base `1 + k·n`. That recovers `a mod n` from the public key and
//! `r mod n` from the encapsulation, which is enough to strip `h^r` from `B`
//! up to a factor that `mk` annihilates:
//!
//! ```text
//! a  = L(h^mk) · k^-1            (mod n)
//! r  = L(A^mk) · k^-1            (mod n)
//! γ  = a · r                     (mod n)
//! m  = L((B · g^-γ)^mk) · mk^-1  (mod n)
//! ```
//!
//! This module is only compiled with the `escrow` feature. Without it no
//! code path can reach the trapdoor.

use std::fmt;

use num_bigint::BigUint;

use crate::{
    arith::{is_one_mod, l_function},
    decryption::{checked_encapsulation, open_payload},
    encryption::Ciphertext,
    error::BcpError,
    keys::PublicKey,
    params::Parameters,
    scalar::{Encapsulation, ScalarCiphertext},
    secret::SecretScalar,
};

/// The escrow capability, owned by [`Parameters`].
///
/// Every component derived from the factorization is secret; all are
/// zeroized on drop.
pub(crate) struct MasterKey {
    /// `mk = p'q'`
    trapdoor: SecretScalar,
    /// `mk^-1 mod n`
    trapdoor_inverse: SecretScalar,
    /// `k^-1 mod n` where `k = L(g^mk)`
    lift_inverse: SecretScalar,
    /// `g^-1 mod n^2`
    generator_inverse: BigUint,
}

impl MasterKey {
    pub(crate) fn new(
        n: &BigUint,
        n_squared: &BigUint,
        g: &BigUint,
        trapdoor: &SecretScalar,
        lift: &BigUint,
    ) -> Result<Self, BcpError> {
        let trapdoor_inverse =
            trapdoor.expose().modinv(n).ok_or(BcpError::InvalidParameters)?;
        let lift_inverse = lift.modinv(n).ok_or(BcpError::InvalidParameters)?;
        let generator_inverse = g.modinv(n_squared).ok_or(BcpError::InvalidParameters)?;

        Ok(Self {
            trapdoor: trapdoor.clone(),
            trapdoor_inverse: SecretScalar::new(&trapdoor_inverse),
            lift_inverse: SecretScalar::new(&lift_inverse),
            generator_inverse,
        })
    }

    /// Discrete log of `element` to base `g`, reduced mod `n`.
    fn log_mod_n(&self, params: &Parameters, element: &BigUint) -> BigUint {
        let collapsed = element.modpow(&self.trapdoor.expose(), &params.n_squared);
        l_function(&collapsed, &params.n) * self.lift_inverse.expose() % &params.n
    }

    /// Strip the holder mask from `B` without the holder secret.
    ///
    /// Returns `(1 + m·n)^mk mod n^2` for a well-formed encapsulation under
    /// `public_element`.
    fn unmask(
        &self,
        params: &Parameters,
        public_element: &BigUint,
        encapsulation: &Encapsulation,
    ) -> BigUint {
        let holder_log = self.log_mod_n(params, public_element);
        let ephemeral_log = self.log_mod_n(params, &encapsulation.ephemeral);
        let gamma = holder_log * ephemeral_log % &params.n;

        let unmasked = &encapsulation.masked
            * self.generator_inverse.modpow(&gamma, &params.n_squared)
            % &params.n_squared;
        unmasked.modpow(&self.trapdoor.expose(), &params.n_squared)
    }

    fn recover(&self, params: &Parameters, collapsed: &BigUint) -> BigUint {
        l_function(collapsed, &params.n) * self.trapdoor_inverse.expose() % &params.n
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}

/// Decrypt a ciphertext with the master secret, given only the recipient's
/// public key.
///
/// # Errors
///
/// - `MasterKeyUnavailable`: `params` carry no master secret
/// - `InvalidPublicKey`: key fails validation against `params`
/// - `DecryptionFailed`: tampered, ill-formed, or ciphertext for another key
pub fn master_decrypt(
    params: &Parameters,
    ciphertext: &Ciphertext,
    public_key: &PublicKey,
) -> Result<Vec<u8>, BcpError> {
    let master = params.master_key().ok_or(BcpError::MasterKeyUnavailable)?;
    let public_element = public_key.validate(params)?;

    let encapsulation = checked_encapsulation(params, ciphertext)?;
    let collapsed = master.unmask(params, public_element, encapsulation);
    let scalar = master.recover(params, &collapsed);

    open_payload(params, ciphertext, public_element, &scalar)
}

/// Decrypt a scalar ciphertext with the master secret.
///
/// Strict: the collapsed value must be `≡ 1 (mod n)`.
///
/// # Errors
///
/// - `MasterKeyUnavailable`: `params` carry no master secret
/// - `InvalidPublicKey`: key fails validation against `params`
/// - `DecryptionFailed`: ill-formed ciphertext or ciphertext for another key
pub fn master_decrypt_scalar(
    params: &Parameters,
    ciphertext: &ScalarCiphertext,
    public_key: &PublicKey,
) -> Result<BigUint, BcpError> {
    let master = params.master_key().ok_or(BcpError::MasterKeyUnavailable)?;
    let public_element = public_key.validate(params)?;

    let encapsulation = ciphertext.checked(params)?;
    let collapsed = master.unmask(params, public_element, encapsulation);
    if !is_one_mod(&collapsed, &params.n) {
        return Err(BcpError::DecryptionFailed);
    }
    Ok(master.recover(params, &collapsed))
}
