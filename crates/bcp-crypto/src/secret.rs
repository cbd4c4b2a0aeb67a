//! Zeroizing storage for secret integers.
//!
//! `BigUint` does not wipe its limbs on drop, so secrets are kept at rest as
//! big-endian bytes inside [`Zeroizing`] and only materialized for the
//! duration of a single operation.

use std::fmt;

use num_bigint::BigUint;
use zeroize::Zeroizing;

/// A secret non-negative integer, zeroized on drop.
#[derive(Clone)]
pub(crate) struct SecretScalar(Zeroizing<Vec<u8>>);

impl SecretScalar {
    pub(crate) fn new(value: &BigUint) -> Self {
        Self(Zeroizing::new(value.to_bytes_be()))
    }

    pub(crate) fn from_be_bytes(bytes: &[u8]) -> Self {
        Self(Zeroizing::new(bytes.to_vec()))
    }

    /// Materialize the integer for one computation.
    pub(crate) fn expose(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    pub(crate) fn as_be_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar(<redacted>)")
    }
}
