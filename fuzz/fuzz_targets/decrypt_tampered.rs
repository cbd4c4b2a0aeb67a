//! Fuzz target for tampered ciphertexts
//!
//! Encrypts an arbitrary message, applies arbitrary byte edits to the
//! serialized ciphertext, and decrypts through both paths.
//!
//! # Invariants
//!
//! - Untouched blobs decrypt to the original message on both paths
//! - Any change to the blob fails with `DecryptionFailed` on both paths
//! - Neither path panics

#![no_main]

use std::sync::LazyLock;

use arbitrary::Arbitrary;
use bcp_crypto::{
    decrypt, encrypt_with_rng, generate_keypair_with_rng, master_decrypt, setup_with_rng,
    BcpError, Ciphertext, Parameters, SetupConfig, MIN_SECURITY_LEVEL,
};
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

static PARAMS: LazyLock<Parameters> = LazyLock::new(|| {
    let config = SetupConfig { security_level: MIN_SECURITY_LEVEL, ..Default::default() };
    setup_with_rng(&config, &mut ChaCha20Rng::seed_from_u64(0xF022)).unwrap()
});

#[derive(Debug, Arbitrary)]
struct Scenario {
    message: Vec<u8>,
    seed: u64,
    edits: Vec<Edit>,
}

#[derive(Debug, Arbitrary)]
enum Edit {
    Flip { index: u16, mask: u8 },
    Truncate { len: u16 },
    Append { byte: u8 },
}

fuzz_target!(|scenario: Scenario| {
    let params = &*PARAMS;
    let mut rng = ChaCha20Rng::seed_from_u64(scenario.seed);
    let pair = generate_keypair_with_rng(params, &mut rng);
    let ct = encrypt_with_rng(params, &pair.public, &scenario.message, &mut rng).unwrap();

    let original = ct.to_bytes();
    let mut blob = original.clone();
    for edit in &scenario.edits {
        match *edit {
            Edit::Flip { index, mask } => {
                if !blob.is_empty() {
                    let index = usize::from(index) % blob.len();
                    blob[index] ^= mask;
                }
            },
            Edit::Truncate { len } => blob.truncate(usize::from(len)),
            Edit::Append { byte } => blob.push(byte),
        }
    }

    let holder = Ciphertext::from_bytes(&blob).and_then(|ct| decrypt(params, &ct, &pair.secret));
    let master =
        Ciphertext::from_bytes(&blob).and_then(|ct| master_decrypt(params, &ct, &pair.public));

    if blob == original {
        assert_eq!(holder.as_deref(), Ok(scenario.message.as_slice()));
        if params.escrow_enabled() {
            assert_eq!(master.as_deref(), Ok(scenario.message.as_slice()));
        }
    } else {
        assert_eq!(holder, Err(BcpError::DecryptionFailed));
        if params.escrow_enabled() {
            assert_eq!(master, Err(BcpError::DecryptionFailed));
        }
    }
});
