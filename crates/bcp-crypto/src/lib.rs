//! BCP Escrow Cryptosystem
//!
//! Public-key encryption in which every ciphertext can be opened two ways:
//! by the recipient with their secret key, and by the holder of the
//! parameter set's master secret with only the recipient's public key.
//! Built on the Bresson–Catalano–Pointcheval double-trapdoor scheme over
//! `Z*_{n^2}`, used as a key encapsulation mechanism in front of an AEAD.
//!
//! # Key Lifecycle
//!
//! ```text
//! Security level
//!        │
//!        ▼ setup
//! Parameters (n, g) ──── MasterKey (p'q')      [escrow feature]
//!        │
//!        ▼ generate_keypair
//! KeyPair (a, h = g^a)
//!        │
//!        ▼ encrypt
//! Encapsulation (A, B) of scalar s
//!        │
//!        ▼ HKDF(s, h ‖ A ‖ B)
//! Payload key → XChaCha20-Poly1305 → Ciphertext
//! ```
//!
//! Holder decryption recovers `s` from `(A, B)` with `a`; master decryption
//! recovers `s` from `(A, B)` and `h` with `p'q'`. Both derive the same key
//! and verify the same tag.
//!
//! # Security
//!
//! Hardness:
//! - Confidentiality rests on the Lift Diffie–Hellman assumption over
//!   `Z*_{n^2}`, which implies factoring `n` is hard
//! - The master secret is equivalent to the factorization of `n`
//!
//! Isolation:
//! - Keys and ciphertexts carry a [`ParamsId`] and are rejected by other
//!   parameter sets
//! - Parameters built with [`EscrowMode::Disabled`], rebuilt from
//!   [`PublicParameters`], or compiled without the `escrow` feature have no
//!   master secret; master decryption fails with
//!   [`BcpError::MasterKeyUnavailable`]
//!
//! Integrity:
//! - The Poly1305 tag is checked before any plaintext is released
//! - Every decryption failure is the same [`BcpError::DecryptionFailed`]
//!
//! Side channels:
//! - Tag comparison is constant time; big-integer exponentiation is not
//!   constant time in the exponent
//! - Secrets are stored zeroizing; transient big-integer temporaries are not
//!   wiped

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod arith;
mod decryption;
mod encryption;
pub mod error;
#[cfg(feature = "escrow")]
mod escrow;
#[cfg(not(feature = "escrow"))]
mod escrow_disabled;
mod kdf;
mod keys;
pub mod lifecycle;
mod params;
pub mod rng;
mod scalar;
mod secret;
pub mod wire;

pub use decryption::decrypt;
pub use encryption::{Ciphertext, NONCE_SIZE, TAG_SIZE, encrypt, encrypt_with_rng};
pub use error::BcpError;
#[cfg(feature = "escrow")]
pub use escrow::{master_decrypt, master_decrypt_scalar};
#[cfg(not(feature = "escrow"))]
pub use escrow_disabled::{master_decrypt, master_decrypt_scalar};
pub use keys::{KeyPair, PublicKey, SecretKey, generate_keypair, generate_keypair_with_rng};
pub use lifecycle::{Lifecycle, ParameterSlot};
pub use num_bigint::BigUint;
pub use params::{
    EscrowMode, MAX_SECURITY_LEVEL, MIN_SECURITY_LEVEL, Parameters, ParamsId, PublicParameters,
    SecurityLevel, SetupConfig, setup, setup_with_rng,
};
pub use scalar::{
    Encapsulation, ScalarCiphertext, decrypt_scalar, encrypt_scalar, encrypt_scalar_with_rng,
};
