//! Hybrid encryption: BCP key encapsulation plus `XChaCha20-Poly1305`.
//!
//! A uniform scalar `s ∈ Z_n` is encapsulated under the recipient public key,
//! the payload key is derived from `s` with HKDF, and the message is sealed
//! with a fresh random nonce. The Poly1305 tag is stored detached so that
//! the ciphertext mirrors its logical layout (encapsulation, payload, tag).

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{AeadInPlace, KeyInit},
};
use num_bigint::RandBigInt;
use rand::{CryptoRng, RngCore};

use crate::{
    error::BcpError,
    kdf::derive_payload_key,
    keys::PublicKey,
    params::{Parameters, ParamsId},
    rng::os_rng,
    scalar::Encapsulation,
    wire::{BlobKind, BlobReader, BlobWriter, WireError},
};

/// `XChaCha20` nonce size (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Associated data for the payload AEAD
pub(crate) const PAYLOAD_AAD: &[u8] = b"bcpPayloadV1";

/// A hybrid ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    /// Parameters the ciphertext was produced under
    pub params_id: ParamsId,
    /// BCP encryption of the payload key scalar
    pub encapsulation: Encapsulation,
    /// The 24-byte `XChaCha20` nonce
    pub nonce: [u8; NONCE_SIZE],
    /// Encrypted message body, same length as the message
    pub payload: Vec<u8>,
    /// Poly1305 integrity tag over the payload
    pub tag: [u8; TAG_SIZE],
}

impl Ciphertext {
    /// Plaintext length.
    pub fn plaintext_len(&self) -> usize {
        self.payload.len()
    }

    /// Encode as a versioned blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        let writer = BlobWriter::new(BlobKind::Ciphertext).bytes(self.params_id.as_bytes());
        self.encapsulation
            .write(writer)
            .bytes(&self.nonce)
            .bytes(&self.tag)
            .bytes(&self.payload)
            .finish()
    }

    /// Decode from a versioned blob.
    ///
    /// # Errors
    ///
    /// - `DecryptionFailed`: malformed blob. Indistinguishable from a
    ///   failed tag check.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BcpError> {
        let decode = || {
            let mut reader = BlobReader::open(bytes, BlobKind::Ciphertext)?;
            let params_id = ParamsId::from_bytes(reader.fixed()?);
            let encapsulation = Encapsulation::read(&mut reader)?;
            let nonce = reader.fixed()?;
            let tag = reader.fixed()?;
            let payload = reader.bytes()?.to_vec();
            reader.finish()?;
            Ok::<_, WireError>(Self { params_id, encapsulation, nonce, payload, tag })
        };
        decode().map_err(|_| BcpError::DecryptionFailed)
    }
}

/// Encrypt a message from OS randomness.
///
/// # Errors
///
/// - `InvalidPublicKey`: key fails validation against `params`
/// - `PlaintextOutOfRange`: message exceeds the AEAD length limit
/// - `EntropyUnavailable`: the OS RNG failed
pub fn encrypt(
    params: &Parameters,
    public_key: &PublicKey,
    message: &[u8],
) -> Result<Ciphertext, BcpError> {
    let mut rng = os_rng()?;
    encrypt_with_rng(params, public_key, message, &mut rng)
}

/// Encrypt a message with caller-provided randomness.
///
/// # Security
///
/// - Fresh `r`, scalar, and nonce per call: identical messages under the
///   same key produce unlinkable ciphertexts
/// - The payload key is bound to the public key and encapsulation
/// - Caller MUST provide cryptographically secure random bytes in production
///
/// # Errors
///
/// Same as [`encrypt`], minus entropy failures.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    params: &Parameters,
    public_key: &PublicKey,
    message: &[u8],
    rng: &mut R,
) -> Result<Ciphertext, BcpError> {
    let element = public_key.validate(params)?;

    let scalar = rng.gen_biguint_below(&params.n);
    let encapsulation = Encapsulation::seal(params, element, &scalar, rng);
    let key = derive_payload_key(params, &scalar, element, &encapsulation);

    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);

    let cipher = XChaCha20Poly1305::new((&*key).into());
    let mut payload = message.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(XNonce::from_slice(&nonce), PAYLOAD_AAD, &mut payload)
        .map_err(|_| BcpError::PlaintextOutOfRange)?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(Ciphertext { params_id: params.id(), encapsulation, nonce, payload, tag: tag_bytes })
}
