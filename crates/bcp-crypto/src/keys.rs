//! Holder key pairs.
//!
//! The secret key is an exponent `a ∈ [1, n^2/2)`; the public key is
//! `h = g^a mod n^2`. Both carry the [`ParamsId`] of the parameters they were
//! generated under and are rejected by every other parameter set.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::{
    arith::is_unit,
    error::BcpError,
    params::{Parameters, ParamsId},
    rng::os_rng,
    secret::SecretScalar,
    wire::{BlobKind, BlobReader, BlobWriter},
};

/// Holder public key `h = g^a mod n^2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    params_id: ParamsId,
    element: BigUint,
}

impl PublicKey {
    /// Parameters this key belongs to.
    pub fn params_id(&self) -> ParamsId {
        self.params_id
    }

    /// Group element `h`.
    pub fn element(&self) -> &BigUint {
        &self.element
    }

    /// Check group membership against `params` and return the element.
    ///
    /// # Errors
    ///
    /// - `InvalidPublicKey`: bound to other parameters, not in `(1, n^2)`, or
    ///   shares a factor with `n`
    pub(crate) fn validate(&self, params: &Parameters) -> Result<&BigUint, BcpError> {
        if self.params_id != params.id()
            || self.element.is_one()
            || !is_unit(&self.element, &params.n, &params.n_squared)
        {
            return Err(BcpError::InvalidPublicKey);
        }
        Ok(&self.element)
    }

    /// Encode as a versioned blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        BlobWriter::new(BlobKind::PublicKey)
            .bytes(self.params_id.as_bytes())
            .integer(&self.element)
            .finish()
    }

    /// Decode from a versioned blob.
    ///
    /// # Errors
    ///
    /// - `InvalidPublicKey`: malformed blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BcpError> {
        let decode = || {
            let mut reader = BlobReader::open(bytes, BlobKind::PublicKey)?;
            let params_id = ParamsId::from_bytes(reader.fixed()?);
            let element = reader.integer()?;
            reader.finish()?;
            Ok::<_, crate::wire::WireError>(Self { params_id, element })
        };
        decode().map_err(|_| BcpError::InvalidPublicKey)
    }
}

/// Holder secret key: the exponent `a`. Zeroized on drop.
#[derive(Debug, Clone)]
pub struct SecretKey {
    params_id: ParamsId,
    exponent: SecretScalar,
}

impl SecretKey {
    /// Parameters this key belongs to.
    pub fn params_id(&self) -> ParamsId {
        self.params_id
    }

    /// Check the exponent range against `params` and materialize it.
    ///
    /// # Errors
    ///
    /// - `InvalidSecretKey`: bound to other parameters or outside
    ///   `[1, n^2/2)`
    pub(crate) fn exponent(&self, params: &Parameters) -> Result<BigUint, BcpError> {
        if self.params_id != params.id() {
            return Err(BcpError::InvalidSecretKey);
        }

        let exponent = self.exponent.expose();
        if exponent.is_zero() || exponent >= params.exponent_bound() {
            return Err(BcpError::InvalidSecretKey);
        }
        Ok(exponent)
    }

    /// Recompute the matching public key.
    ///
    /// # Errors
    ///
    /// - `InvalidSecretKey`: see [`SecretKey::exponent`] conditions
    pub fn public_key(&self, params: &Parameters) -> Result<PublicKey, BcpError> {
        let exponent = self.exponent(params)?;
        Ok(PublicKey {
            params_id: self.params_id,
            element: params.g.modpow(&exponent, &params.n_squared),
        })
    }

    /// Encode as a versioned blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        BlobWriter::new(BlobKind::SecretKey)
            .bytes(self.params_id.as_bytes())
            .bytes(self.exponent.as_be_bytes())
            .finish()
    }

    /// Decode from a versioned blob.
    ///
    /// # Errors
    ///
    /// - `InvalidSecretKey`: malformed blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BcpError> {
        let decode = || {
            let mut reader = BlobReader::open(bytes, BlobKind::SecretKey)?;
            let params_id = ParamsId::from_bytes(reader.fixed()?);
            let exponent = SecretScalar::from_be_bytes(reader.integer_bytes()?);
            reader.finish()?;
            Ok::<_, crate::wire::WireError>(Self { params_id, exponent })
        };
        decode().map_err(|_| BcpError::InvalidSecretKey)
    }
}

/// A holder key pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Public key, safe to distribute
    pub public: PublicKey,
    /// Secret key, owned by the holder
    pub secret: SecretKey,
}

/// Generate a key pair from OS randomness.
///
/// # Errors
///
/// - `EntropyUnavailable`: the OS RNG failed. Retryable.
pub fn generate_keypair(params: &Parameters) -> Result<KeyPair, BcpError> {
    let mut rng = os_rng()?;
    Ok(generate_keypair_with_rng(params, &mut rng))
}

/// Generate a key pair with caller-provided randomness.
///
/// The secret exponent is uniform in `[1, n^2/2)`, so two calls collide with
/// probability about `2^-(4·level)`.
pub fn generate_keypair_with_rng<R: RngCore + CryptoRng>(
    params: &Parameters,
    rng: &mut R,
) -> KeyPair {
    let exponent = rng.gen_biguint_range(&BigUint::one(), &params.exponent_bound());
    let element = params.g.modpow(&exponent, &params.n_squared);

    KeyPair {
        public: PublicKey { params_id: params.id(), element },
        secret: SecretKey { params_id: params.id(), exponent: SecretScalar::new(&exponent) },
    }
}
