//! BCP encryption of elements of `Z_n`.
//!
//! `Enc(m) = (A, B) = (g^r, h^r·(1 + m·n)) mod n^2`. The hybrid scheme uses
//! this transform to encapsulate its payload key scalar; the scalar API
//! exposes it directly, including additive homomorphism:
//! `Enc(m1)·Enc(m2) = Enc(m1 + m2 mod n)` under the same public key.

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, RngCore};

use crate::{
    arith::{is_one_mod, is_unit, l_function},
    error::BcpError,
    keys::{PublicKey, SecretKey},
    params::{Parameters, ParamsId},
    rng::os_rng,
    wire::{BlobKind, BlobReader, BlobWriter, WireError},
};

/// The pair `(A, B)` produced by the BCP transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encapsulation {
    /// `A = g^r mod n^2`
    pub ephemeral: BigUint,
    /// `B = h^r·(1 + m·n) mod n^2`
    pub masked: BigUint,
}

impl Encapsulation {
    /// Encrypt `m < n` under public element `h`.
    pub(crate) fn seal<R: RngCore + CryptoRng>(
        params: &Parameters,
        public_element: &BigUint,
        m: &BigUint,
        rng: &mut R,
    ) -> Self {
        let r = rng.gen_biguint_range(&BigUint::one(), &params.exponent_bound());
        let ephemeral = params.g.modpow(&r, &params.n_squared);
        let lifted = (m * &params.n + 1u32) % &params.n_squared;
        let masked = public_element.modpow(&r, &params.n_squared) * lifted % &params.n_squared;
        Self { ephemeral, masked }
    }

    /// Both components are units of `Z*_{n^2}`.
    pub(crate) fn is_well_formed(&self, params: &Parameters) -> bool {
        is_unit(&self.ephemeral, &params.n, &params.n_squared)
            && is_unit(&self.masked, &params.n, &params.n_squared)
    }

    /// `B · (A^a)^-1 mod n^2`, which is `1 + m·n` under the matching key.
    pub(crate) fn unblind(&self, params: &Parameters, exponent: &BigUint) -> Option<BigUint> {
        let mask = self.ephemeral.modpow(exponent, &params.n_squared);
        let inverse = mask.modinv(&params.n_squared)?;
        Some(&self.masked * inverse % &params.n_squared)
    }

    pub(crate) fn write(&self, writer: BlobWriter) -> BlobWriter {
        writer.integer(&self.ephemeral).integer(&self.masked)
    }

    pub(crate) fn read(reader: &mut BlobReader<'_>) -> Result<Self, WireError> {
        Ok(Self { ephemeral: reader.integer()?, masked: reader.integer()? })
    }
}

/// Encryption of an element of `Z_n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarCiphertext {
    /// Parameters the ciphertext was produced under
    pub params_id: ParamsId,
    /// The BCP pair
    pub encapsulation: Encapsulation,
}

impl ScalarCiphertext {
    /// Homomorphic addition: decrypts to the sum of both plaintexts mod `n`.
    ///
    /// Both ciphertexts must be under the same public key; mixing keys yields
    /// a ciphertext that fails strict decryption.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters`: either ciphertext belongs to other parameters
    pub fn add(&self, other: &Self, params: &Parameters) -> Result<Self, BcpError> {
        if self.params_id != params.id() || other.params_id != params.id() {
            return Err(BcpError::InvalidParameters);
        }

        let n_squared = &params.n_squared;
        let lhs = &self.encapsulation;
        let rhs = &other.encapsulation;
        Ok(Self {
            params_id: self.params_id,
            encapsulation: Encapsulation {
                ephemeral: &lhs.ephemeral * &rhs.ephemeral % n_squared,
                masked: &lhs.masked * &rhs.masked % n_squared,
            },
        })
    }

    /// Encode as a versioned blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        let writer =
            BlobWriter::new(BlobKind::ScalarCiphertext).bytes(self.params_id.as_bytes());
        self.encapsulation.write(writer).finish()
    }

    /// Decode from a versioned blob.
    ///
    /// # Errors
    ///
    /// - `DecryptionFailed`: malformed blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BcpError> {
        let decode = || {
            let mut reader = BlobReader::open(bytes, BlobKind::ScalarCiphertext)?;
            let params_id = ParamsId::from_bytes(reader.fixed()?);
            let encapsulation = Encapsulation::read(&mut reader)?;
            reader.finish()?;
            Ok::<_, WireError>(Self { params_id, encapsulation })
        };
        decode().map_err(|_| BcpError::DecryptionFailed)
    }

    /// Structural check shared by both decryption paths.
    pub(crate) fn checked<'a>(&'a self, params: &Parameters) -> Result<&'a Encapsulation, BcpError> {
        if self.params_id != params.id() || !self.encapsulation.is_well_formed(params) {
            return Err(BcpError::DecryptionFailed);
        }
        Ok(&self.encapsulation)
    }
}

/// Encrypt `m ∈ Z_n` from OS randomness.
///
/// # Errors
///
/// - `InvalidPublicKey`: key fails validation against `params`
/// - `PlaintextOutOfRange`: `m >= n`
/// - `EntropyUnavailable`: the OS RNG failed
pub fn encrypt_scalar(
    params: &Parameters,
    public_key: &PublicKey,
    m: &BigUint,
) -> Result<ScalarCiphertext, BcpError> {
    let mut rng = os_rng()?;
    encrypt_scalar_with_rng(params, public_key, m, &mut rng)
}

/// Encrypt `m ∈ Z_n` with caller-provided randomness.
///
/// # Errors
///
/// Same as [`encrypt_scalar`], minus entropy failures.
pub fn encrypt_scalar_with_rng<R: RngCore + CryptoRng>(
    params: &Parameters,
    public_key: &PublicKey,
    m: &BigUint,
    rng: &mut R,
) -> Result<ScalarCiphertext, BcpError> {
    let element = public_key.validate(params)?;
    if m >= &params.n {
        return Err(BcpError::PlaintextOutOfRange);
    }

    Ok(ScalarCiphertext {
        params_id: params.id(),
        encapsulation: Encapsulation::seal(params, element, m, rng),
    })
}

/// Decrypt a scalar ciphertext with the holder secret key.
///
/// Strict: the unblinded value must be `≡ 1 (mod n)`.
///
/// # Errors
///
/// - `InvalidSecretKey`: key fails validation against `params`
/// - `DecryptionFailed`: ill-formed ciphertext or wrong key
pub fn decrypt_scalar(
    params: &Parameters,
    ciphertext: &ScalarCiphertext,
    secret_key: &SecretKey,
) -> Result<BigUint, BcpError> {
    let exponent = secret_key.exponent(params)?;
    let encapsulation = ciphertext.checked(params)?;

    let unblinded = encapsulation.unblind(params, &exponent).ok_or(BcpError::DecryptionFailed)?;
    if !is_one_mod(&unblinded, &params.n) {
        return Err(BcpError::DecryptionFailed);
    }
    Ok(l_function(&unblinded, &params.n))
}
