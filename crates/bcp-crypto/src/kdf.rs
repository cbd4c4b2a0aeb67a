//! Payload key derivation using HKDF

use hkdf::Hkdf;
use num_bigint::BigUint;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{arith::to_fixed_be, params::Parameters, scalar::Encapsulation};

/// Label used for payload key derivation
const PAYLOAD_KEY_LABEL: &[u8] = b"bcpPayloadKeyV1";

/// Derive the 32-byte payload key from an encapsulated scalar.
///
/// The scalar is the input key material; the info string binds the key to
/// the recipient public element and both halves of the encapsulation, so
/// substituting any of them yields an unrelated key.
///
/// All group elements are written at the fixed width of `n^2` and the scalar
/// at the width of `n`, which keeps the encoding injective.
pub(crate) fn derive_payload_key(
    params: &Parameters,
    scalar: &BigUint,
    public_element: &BigUint,
    encapsulation: &Encapsulation,
) -> Zeroizing<[u8; 32]> {
    let ikm = to_fixed_be(scalar, params.modulus_len());
    let hkdf = Hkdf::<Sha256>::new(None, &ikm);

    let width = params.element_len();
    let mut info = Vec::with_capacity(PAYLOAD_KEY_LABEL.len() + 3 * width);
    info.extend_from_slice(PAYLOAD_KEY_LABEL);
    for element in [public_element, &encapsulation.ephemeral, &encapsulation.masked] {
        info.extend_from_slice(&to_fixed_be(element, width));
    }

    let mut key = Zeroizing::new([0u8; 32]);
    let Ok(()) = hkdf.expand(&info, key.as_mut_slice()) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    key
}
