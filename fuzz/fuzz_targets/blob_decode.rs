//! Fuzz target for blob decoding
//!
//! Feeds arbitrary bytes to every blob decoder.
//!
//! # Invariants
//!
//! - Decoders never panic; invalid input returns an error
//! - Encoding is canonical: any accepted blob re-encodes to the same bytes
//! - A blob is accepted by at most the decoder its header kind names

#![no_main]

use bcp_crypto::{
    wire::BlobHeader, Ciphertext, PublicKey, PublicParameters, ScalarCiphertext, SecretKey,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let kind = BlobHeader::parse(data).ok().map(|(header, _)| header.kind());

    if let Ok(params) = PublicParameters::from_bytes(data) {
        assert_eq!(kind, Some(0x01));
        assert_eq!(params.to_bytes(), data);
    }
    if let Ok(key) = PublicKey::from_bytes(data) {
        assert_eq!(kind, Some(0x02));
        assert_eq!(key.to_bytes(), data);
    }
    if let Ok(key) = SecretKey::from_bytes(data) {
        assert_eq!(kind, Some(0x03));
        assert_eq!(key.to_bytes(), data);
    }
    if let Ok(ct) = Ciphertext::from_bytes(data) {
        assert_eq!(kind, Some(0x04));
        assert_eq!(ct.to_bytes(), data);
    }
    if let Ok(ct) = ScalarCiphertext::from_bytes(data) {
        assert_eq!(kind, Some(0x05));
        assert_eq!(ct.to_bytes(), data);
    }
});
