//! Text-level `Bcp` facade for host runtimes.
//!
//! Wraps one parameter set in a [`ParameterSlot`] and exchanges keys,
//! ciphertexts, and public parameters as standard base64 of their versioned
//! blobs. Messages are UTF-8 text.
//!
//! ```text
//! Bcp::new(level) ──► gen_keypair() ──► { public, private }
//!                                            │        │
//!          encrypt(message, public) ◄────────┘        │
//!                  │                                  │
//!                  ├──► decrypt(ciphertext, private) ◄┘
//!                  └──► decrypt_mk(ciphertext, public)
//! ```
//!
//! Malformed text maps onto the error of the value it was meant to encode:
//! a bad ciphertext is indistinguishable from a failed tag check.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bcp_crypto::{
    BcpError, Ciphertext, Lifecycle, ParameterSlot, Parameters, PublicKey, PublicParameters,
    SecretKey, SetupConfig,
};
pub use error::HostError;

/// A key pair as base64 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedKeyPair {
    /// Public key, safe to distribute
    pub public: String,
    /// Secret key, owned by the holder
    pub private: String,
}

/// Encryption object bound to one parameter set.
///
/// All operations take `&self`; share the instance across threads with
/// `Arc`. After [`Bcp::destroy`] every operation fails with
/// `ParametersUninitialized`.
pub struct Bcp {
    slot: ParameterSlot,
}

impl Bcp {
    /// Fresh parameters at `security_level` bits per prime, with escrow when
    /// the build supports it.
    ///
    /// # Errors
    ///
    /// - `InvalidSecurityLevel`: level outside the supported range
    /// - `EntropyUnavailable`: the OS RNG failed
    pub fn new(security_level: u32) -> Result<Self, HostError> {
        Self::with_config(&SetupConfig { security_level, ..Default::default() })
    }

    /// Fresh parameters from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Same as [`bcp_crypto::setup`].
    pub fn with_config(config: &SetupConfig) -> Result<Self, HostError> {
        let params = bcp_crypto::setup(config)?;
        tracing::debug!(
            security_level = config.security_level,
            escrow = params.escrow_enabled(),
            "bcp instance created"
        );
        Ok(Self { slot: ParameterSlot::with_parameters(params) })
    }

    /// Holder-only instance from exported public parameters. Master
    /// decryption is never available on it.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters`: text does not decode to a valid group
    /// - `InvalidSecurityLevel`: encoded level outside the supported range
    pub fn holder_only(public_parameters: &str) -> Result<Self, HostError> {
        let blob = BASE64.decode(public_parameters).map_err(|_| BcpError::InvalidParameters)?;
        let public = PublicParameters::from_bytes(&blob)?;
        let params = Parameters::from_public(&public)?;
        Ok(Self { slot: ParameterSlot::with_parameters(params) })
    }

    /// Export the public parameters for holder-only instances.
    pub fn public_parameters(&self) -> Result<String, HostError> {
        let params = self.params()?;
        Ok(BASE64.encode(params.public().to_bytes()))
    }

    /// Generate a key pair.
    ///
    /// # Errors
    ///
    /// - `ParametersUninitialized`: instance destroyed
    /// - `EntropyUnavailable`: the OS RNG failed. Retryable.
    pub fn gen_keypair(&self) -> Result<EncodedKeyPair, HostError> {
        let params = self.params()?;
        let pair = bcp_crypto::generate_keypair(&params)?;
        Ok(EncodedKeyPair {
            public: BASE64.encode(pair.public.to_bytes()),
            private: BASE64.encode(pair.secret.to_bytes()),
        })
    }

    /// Encrypt `message` to the holder of `public_key`.
    ///
    /// # Errors
    ///
    /// - `ParametersUninitialized`: instance destroyed
    /// - `InvalidPublicKey`: key text malformed or bound to other parameters
    pub fn encrypt(&self, message: &str, public_key: &str) -> Result<String, HostError> {
        let params = self.params()?;
        let public_key = decode_public_key(public_key)?;
        let ciphertext = bcp_crypto::encrypt(&params, &public_key, message.as_bytes())?;
        Ok(BASE64.encode(ciphertext.to_bytes()))
    }

    /// Decrypt with the holder secret key.
    ///
    /// # Errors
    ///
    /// - `ParametersUninitialized`: instance destroyed
    /// - `InvalidSecretKey`: key text malformed or bound to other parameters
    /// - `DecryptionFailed`: malformed, tampered, or wrongly keyed ciphertext
    /// - `NotUtf8`: authenticated plaintext is not text
    pub fn decrypt(&self, ciphertext: &str, secret_key: &str) -> Result<String, HostError> {
        let params = self.params()?;
        let secret_key = BASE64
            .decode(secret_key)
            .map_err(|_| BcpError::InvalidSecretKey)
            .and_then(|blob| SecretKey::from_bytes(&blob))?;
        let ciphertext = decode_ciphertext(ciphertext)?;

        into_text(bcp_crypto::decrypt(&params, &ciphertext, &secret_key)?)
    }

    /// Decrypt with the master secret, given only the holder's public key.
    ///
    /// # Errors
    ///
    /// - `ParametersUninitialized`: instance destroyed
    /// - `MasterKeyUnavailable`: no escrow on this instance or build
    /// - `InvalidPublicKey`: key text malformed or bound to other parameters
    /// - `DecryptionFailed`: malformed, tampered, or mismatched ciphertext
    /// - `NotUtf8`: authenticated plaintext is not text
    pub fn decrypt_mk(&self, ciphertext: &str, public_key: &str) -> Result<String, HostError> {
        let params = self.params()?;
        let public_key = decode_public_key(public_key)?;
        let ciphertext = decode_ciphertext(ciphertext)?;

        let plaintext = bcp_crypto::master_decrypt(&params, &ciphertext, &public_key)?;
        tracing::debug!(len = plaintext.len(), "master decryption completed");
        into_text(plaintext)
    }

    /// Whether master decryption is available.
    pub fn escrow_enabled(&self) -> bool {
        self.slot.current().is_ok_and(|params| params.escrow_enabled())
    }

    /// Release the parameters. Operations already running finish normally.
    pub fn destroy(&self) {
        self.slot.destroy();
    }

    /// Lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.slot.lifecycle()
    }

    fn params(&self) -> Result<Arc<Parameters>, HostError> {
        Ok(self.slot.current()?)
    }
}

fn decode_public_key(text: &str) -> Result<PublicKey, BcpError> {
    let blob = BASE64.decode(text).map_err(|_| BcpError::InvalidPublicKey)?;
    PublicKey::from_bytes(&blob)
}

fn decode_ciphertext(text: &str) -> Result<Ciphertext, BcpError> {
    let blob = BASE64.decode(text).map_err(|_| BcpError::DecryptionFailed)?;
    Ciphertext::from_bytes(&blob)
}

fn into_text(plaintext: Vec<u8>) -> Result<String, HostError> {
    String::from_utf8(plaintext).map_err(|_| HostError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use bcp_crypto::MIN_SECURITY_LEVEL;

    use super::*;

    fn instance() -> Bcp {
        Bcp::new(MIN_SECURITY_LEVEL).unwrap()
    }

    #[test]
    fn text_roundtrip_both_paths() {
        let bcp = instance();
        let keys = bcp.gen_keypair().unwrap();

        let ct = bcp.encrypt("Hello, World!", &keys.public).unwrap();
        assert_eq!(bcp.decrypt(&ct, &keys.private).unwrap(), "Hello, World!");

        let master = bcp.decrypt_mk(&ct, &keys.public);
        if bcp.escrow_enabled() {
            assert_eq!(master.unwrap(), "Hello, World!");
        } else {
            assert_eq!(master, Err(HostError::Crypto(BcpError::MasterKeyUnavailable)));
        }
    }

    #[test]
    fn rejects_invalid_security_level() {
        assert!(matches!(
            Bcp::new(8),
            Err(HostError::Crypto(BcpError::InvalidSecurityLevel { level: 8, .. }))
        ));
    }

    #[test]
    fn malformed_text_maps_to_value_errors() {
        let bcp = instance();
        let keys = bcp.gen_keypair().unwrap();
        let ct = bcp.encrypt("hi", &keys.public).unwrap();

        assert_eq!(
            bcp.encrypt("hi", "not base64!"),
            Err(HostError::Crypto(BcpError::InvalidPublicKey))
        );
        assert_eq!(
            bcp.decrypt(&ct, "not base64!"),
            Err(HostError::Crypto(BcpError::InvalidSecretKey))
        );
        assert_eq!(
            bcp.decrypt("not base64!", &keys.private),
            Err(HostError::Crypto(BcpError::DecryptionFailed))
        );
        assert_eq!(
            bcp.decrypt(&BASE64.encode(b"short"), &keys.private),
            Err(HostError::Crypto(BcpError::DecryptionFailed))
        );
        // Key text swapped for ciphertext text
        assert_eq!(
            bcp.decrypt(&keys.public, &keys.private),
            Err(HostError::Crypto(BcpError::DecryptionFailed))
        );
    }

    #[test]
    fn keys_from_another_instance_are_rejected() {
        let bcp = instance();
        let other = instance();
        let foreign = other.gen_keypair().unwrap();

        assert_eq!(
            bcp.encrypt("hi", &foreign.public),
            Err(HostError::Crypto(BcpError::InvalidPublicKey))
        );
    }

    #[test]
    fn non_text_plaintext_is_reported() {
        let bcp = instance();
        let params = bcp.params().unwrap();
        let pair = bcp_crypto::generate_keypair(&params).unwrap();
        let ct = bcp_crypto::encrypt(&params, &pair.public, &[0xFF, 0xFE, 0x00]).unwrap();
        let ct = BASE64.encode(ct.to_bytes());

        let private = BASE64.encode(pair.secret.to_bytes());
        assert_eq!(bcp.decrypt(&ct, &private), Err(HostError::NotUtf8));
    }

    #[test]
    fn destroy_disables_every_operation() {
        let bcp = instance();
        let keys = bcp.gen_keypair().unwrap();
        let ct = bcp.encrypt("hi", &keys.public).unwrap();

        bcp.destroy();

        let uninit = Some(HostError::Crypto(BcpError::ParametersUninitialized));
        assert_eq!(bcp.lifecycle(), Lifecycle::Destroyed);
        assert_eq!(bcp.gen_keypair().err(), uninit);
        assert_eq!(bcp.encrypt("hi", &keys.public).err(), uninit);
        assert_eq!(bcp.decrypt(&ct, &keys.private).err(), uninit);
        assert_eq!(bcp.decrypt_mk(&ct, &keys.public).err(), uninit);
        assert_eq!(bcp.public_parameters().err(), uninit);
        assert!(!bcp.escrow_enabled());
    }

    #[test]
    fn holder_only_instance_shares_keys_but_not_escrow() {
        let authority = instance();
        let holder = Bcp::holder_only(&authority.public_parameters().unwrap()).unwrap();
        assert!(!holder.escrow_enabled());

        let keys = holder.gen_keypair().unwrap();
        let ct = holder.encrypt("from holder", &keys.public).unwrap();

        assert_eq!(holder.decrypt(&ct, &keys.private).unwrap(), "from holder");
        assert_eq!(
            holder.decrypt_mk(&ct, &keys.public),
            Err(HostError::Crypto(BcpError::MasterKeyUnavailable))
        );
        if authority.escrow_enabled() {
            assert_eq!(authority.decrypt_mk(&ct, &keys.public).unwrap(), "from holder");
        }
    }

    #[test]
    fn holder_only_rejects_garbage() {
        assert!(matches!(
            Bcp::holder_only("%%%"),
            Err(HostError::Crypto(BcpError::InvalidParameters))
        ));
    }
}
