//! Modular arithmetic helpers over `Z_n` and `Z*_{n^2}`.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use zeroize::Zeroizing;

/// `L(x) = (x - 1) / n`.
///
/// Only meaningful for `x ≡ 1 (mod n)`; for other units the result is an
/// arbitrary value below `n`, which callers rely on to keep a single failure
/// signal downstream.
pub(crate) fn l_function(x: &BigUint, n: &BigUint) -> BigUint {
    if x.is_zero() {
        return BigUint::zero();
    }
    (x - 1u32) / n
}

/// Whether `x ≡ 1 (mod n)`.
pub(crate) fn is_one_mod(x: &BigUint, n: &BigUint) -> bool {
    (x % n).is_one()
}

/// Whether `x` is a unit of `Z*_{n^2}` given as a residue in `(0, n^2)`.
pub(crate) fn is_unit(x: &BigUint, n: &BigUint, n_squared: &BigUint) -> bool {
    !x.is_zero() && x < n_squared && x.gcd(n).is_one()
}

/// Big-endian bytes left-padded to `len`.
///
/// Values wider than `len` keep their full width.
pub(crate) fn to_fixed_be(x: &BigUint, len: usize) -> Zeroizing<Vec<u8>> {
    let raw = Zeroizing::new(x.to_bytes_be());
    let mut out = Zeroizing::new(vec![0u8; len.saturating_sub(raw.len())]);
    out.extend_from_slice(&raw);
    out
}

/// Byte length of `x` when written big-endian.
pub(crate) fn byte_len(x: &BigUint) -> usize {
    x.bits().div_ceil(8) as usize
}
