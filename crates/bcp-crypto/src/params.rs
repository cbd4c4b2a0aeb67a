//! Parameter setup: the group `Z*_{n^2}` and the optional master secret.
//!
//! `n = p·q` for distinct safe primes `p = 2p'+1`, `q = 2q'+1` of exactly
//! `security_level` bits. The generator `g` is a random square in
//! `Z*_{n^2}` whose lift `k = L(g^{p'q'} mod n^2)` is invertible mod `n`.
//! The trapdoor `p'q'` is the master secret.

use std::fmt;

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_prime::RandPrime;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

#[cfg(feature = "escrow")]
use crate::escrow::MasterKey;
use crate::{
    arith::{is_unit, l_function},
    error::BcpError,
    rng::os_rng,
    secret::SecretScalar,
    wire::{BlobKind, BlobReader, BlobWriter},
};

/// Smallest supported security level (bits per prime factor)
pub const MIN_SECURITY_LEVEL: u32 = 64;

/// Largest supported security level (bits per prime factor)
pub const MAX_SECURITY_LEVEL: u32 = 4096;

/// Label for parameter id derivation
const PARAMS_ID_LABEL: &[u8] = b"bcpParamsV1";

/// Validated security level: the bit length of each safe-prime factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecurityLevel(u32);

impl SecurityLevel {
    /// Validate a requested level.
    ///
    /// # Errors
    ///
    /// - `InvalidSecurityLevel`: outside
    ///   `MIN_SECURITY_LEVEL..=MAX_SECURITY_LEVEL`
    pub fn new(bits: u32) -> Result<Self, BcpError> {
        if (MIN_SECURITY_LEVEL..=MAX_SECURITY_LEVEL).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(BcpError::InvalidSecurityLevel {
                level: bits,
                min: MIN_SECURITY_LEVEL,
                max: MAX_SECURITY_LEVEL,
            })
        }
    }

    /// Bits per prime factor.
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Whether setup retains the master secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowMode {
    /// Keep the master secret; master decryption is available
    Enabled,
    /// Discard the trapdoor after setup; master decryption always fails
    Disabled,
}

impl Default for EscrowMode {
    fn default() -> Self {
        if cfg!(feature = "escrow") { Self::Enabled } else { Self::Disabled }
    }
}

/// Setup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    /// Bits per safe-prime factor
    pub security_level: u32,
    /// Retain the master secret
    pub escrow: EscrowMode,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self { security_level: 128, escrow: EscrowMode::default() }
    }
}

/// Identifier binding keys and ciphertexts to one parameter set.
///
/// Truncated SHA-256 over the public group description, so holder-only
/// parameters rebuilt from [`PublicParameters`] share the id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamsId([u8; 16]);

impl ParamsId {
    /// Size in bytes
    pub const SIZE: usize = 16;

    fn derive(n: &BigUint, g: &BigUint) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(PARAMS_ID_LABEL);
        for value in [n, g] {
            let bytes = value.to_bytes_be();
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(&bytes);
        }
        let digest = hasher.finalize();

        let mut id = [0u8; Self::SIZE];
        id.copy_from_slice(&digest[..Self::SIZE]);
        Self(id)
    }

    /// Raw id bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub(crate) fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for ParamsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParamsId(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}

/// Public half of a parameter set: everything a holder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicParameters {
    level: SecurityLevel,
    n: BigUint,
    g: BigUint,
}

impl PublicParameters {
    /// Security level.
    pub fn security_level(&self) -> SecurityLevel {
        self.level
    }

    /// Modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Generator `g` of `Z*_{n^2}`.
    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    /// Encode as a versioned blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        BlobWriter::new(BlobKind::PublicParameters)
            .bytes(&self.level.bits().to_be_bytes())
            .integer(&self.n)
            .integer(&self.g)
            .finish()
    }

    /// Decode from a versioned blob.
    ///
    /// Only the encoding is checked here; [`Parameters::from_public`]
    /// validates the group.
    ///
    /// # Errors
    ///
    /// - `InvalidSecurityLevel`: level outside the supported range
    /// - `InvalidParameters`: malformed blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BcpError> {
        let mut reader = BlobReader::open(bytes, BlobKind::PublicParameters)
            .map_err(|_| BcpError::InvalidParameters)?;
        let level = reader.fixed::<4>().map_err(|_| BcpError::InvalidParameters)?;
        let n = reader.integer().map_err(|_| BcpError::InvalidParameters)?;
        let g = reader.integer().map_err(|_| BcpError::InvalidParameters)?;
        reader.finish().map_err(|_| BcpError::InvalidParameters)?;

        Ok(Self { level: SecurityLevel::new(u32::from_be_bytes(level))?, n, g })
    }
}

/// A parameter set.
///
/// Immutable after setup. Share it by reference or `Arc`; every operation
/// reads it without locking. When built with escrow the master secret lives
/// in an owned capability that is zeroized on drop.
pub struct Parameters {
    level: SecurityLevel,
    id: ParamsId,
    pub(crate) n: BigUint,
    pub(crate) n_squared: BigUint,
    pub(crate) g: BigUint,
    #[cfg(feature = "escrow")]
    master: Option<MasterKey>,
}

impl Parameters {
    /// Security level.
    pub fn security_level(&self) -> SecurityLevel {
        self.level
    }

    /// Identifier shared by keys and ciphertexts under these parameters.
    pub fn id(&self) -> ParamsId {
        self.id
    }

    /// Modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Whether master decryption is possible with these parameters.
    pub fn escrow_enabled(&self) -> bool {
        #[cfg(feature = "escrow")]
        let enabled = self.master.is_some();
        #[cfg(not(feature = "escrow"))]
        let enabled = false;
        enabled
    }

    #[cfg(feature = "escrow")]
    pub(crate) fn master_key(&self) -> Option<&MasterKey> {
        self.master.as_ref()
    }

    /// Export the public half.
    pub fn public(&self) -> PublicParameters {
        PublicParameters { level: self.level, n: self.n.clone(), g: self.g.clone() }
    }

    /// Rebuild holder-only parameters (no master secret) from their public
    /// half.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters`: `n` is even or has the wrong size for the
    ///   level, or `g` is not a unit of `Z*_{n^2}` other than 1
    pub fn from_public(public: &PublicParameters) -> Result<Self, BcpError> {
        let PublicParameters { level, n, g } = public;

        let bits = u64::from(level.bits());
        let size_ok = n.bits() == 2 * bits || n.bits() + 1 == 2 * bits;
        if !n.bit(0) || !size_ok {
            return Err(BcpError::InvalidParameters);
        }

        let n_squared = n * n;
        if g.is_one() || !is_unit(g, n, &n_squared) {
            return Err(BcpError::InvalidParameters);
        }

        Ok(Self {
            level: *level,
            id: ParamsId::derive(n, g),
            n: n.clone(),
            n_squared,
            g: g.clone(),
            #[cfg(feature = "escrow")]
            master: None,
        })
    }

    /// Byte length of `n`.
    pub(crate) fn modulus_len(&self) -> usize {
        crate::arith::byte_len(&self.n)
    }

    /// Byte length of `n^2`.
    pub(crate) fn element_len(&self) -> usize {
        crate::arith::byte_len(&self.n_squared)
    }

    /// Upper bound (exclusive) for secret exponents: `n^2 / 2`.
    pub(crate) fn exponent_bound(&self) -> BigUint {
        &self.n_squared >> 1u32
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("security_level", &self.level.bits())
            .field("id", &self.id)
            .field("escrow", &self.escrow_enabled())
            .finish_non_exhaustive()
    }
}

/// Generate fresh parameters from OS randomness.
///
/// # Errors
///
/// - `InvalidSecurityLevel`: level outside the supported range
/// - `MasterKeyUnavailable`: escrow requested in a build without the
///   `escrow` feature
/// - `EntropyUnavailable`: the OS RNG failed
pub fn setup(config: &SetupConfig) -> Result<Parameters, BcpError> {
    let mut rng = os_rng()?;
    setup_with_rng(config, &mut rng)
}

/// Generate parameters with caller-provided randomness.
///
/// The caller MUST provide a cryptographically secure RNG in production.
///
/// # Errors
///
/// Same as [`setup`], minus entropy failures.
pub fn setup_with_rng<R: RngCore + CryptoRng>(
    config: &SetupConfig,
    rng: &mut R,
) -> Result<Parameters, BcpError> {
    let level = SecurityLevel::new(config.security_level)?;
    if !cfg!(feature = "escrow") && config.escrow == EscrowMode::Enabled {
        return Err(BcpError::MasterKeyUnavailable);
    }

    let bits = level.bits() as usize;
    let p: BigUint = rng.gen_safe_prime_exact(bits);
    let q: BigUint = loop {
        let candidate: BigUint = rng.gen_safe_prime_exact(bits);
        if candidate != p {
            break candidate;
        }
    };

    let trapdoor = SecretScalar::new(&(((&p - 1u32) >> 1u32) * ((&q - 1u32) >> 1u32)));
    let n = p * q;
    let n_squared = &n * &n;

    let two = BigUint::from(2u32);
    let (g, k) = loop {
        let alpha = rng.gen_biguint_range(&two, &n_squared);
        if !alpha.gcd(&n).is_one() {
            continue;
        }

        let g = alpha.modpow(&two, &n_squared);
        let k = l_function(&g.modpow(&trapdoor.expose(), &n_squared), &n);

        // k must be invertible mod n for the master path to exist
        if k.gcd(&n).is_one() {
            break (g, k);
        }
    };

    let params = Parameters {
        level,
        id: ParamsId::derive(&n, &g),
        #[cfg(feature = "escrow")]
        master: match config.escrow {
            EscrowMode::Enabled => Some(MasterKey::new(&n, &n_squared, &g, &trapdoor, &k)?),
            EscrowMode::Disabled => None,
        },
        n,
        n_squared,
        g,
    };

    #[cfg(not(feature = "escrow"))]
    drop(k);

    tracing::debug!(
        security_level = level.bits(),
        escrow = params.escrow_enabled(),
        id = ?params.id,
        "parameters initialized"
    );

    Ok(params)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::test_support::{shared_params, test_config};

    #[test]
    fn security_level_bounds() {
        assert!(SecurityLevel::new(MIN_SECURITY_LEVEL).is_ok());
        assert!(SecurityLevel::new(MAX_SECURITY_LEVEL).is_ok());
        assert!(matches!(
            SecurityLevel::new(MIN_SECURITY_LEVEL - 1),
            Err(BcpError::InvalidSecurityLevel { level: 63, .. })
        ));
        assert!(SecurityLevel::new(MAX_SECURITY_LEVEL + 1).is_err());
        assert!(SecurityLevel::new(0).is_err());
    }

    #[test]
    fn setup_rejects_low_level() {
        let config = SetupConfig { security_level: 16, ..Default::default() };
        let result = setup(&config);
        assert!(matches!(result, Err(BcpError::InvalidSecurityLevel { level: 16, .. })));
    }

    #[test]
    fn modulus_has_twice_the_level_bits() {
        let params = shared_params();
        let bits = u64::from(params.security_level().bits());
        let n_bits = params.modulus().bits();
        assert!(n_bits == 2 * bits || n_bits == 2 * bits - 1);
        assert_eq!(params.n_squared, &params.n * &params.n);
    }

    #[test]
    fn generator_lift_is_invertible() {
        let params = shared_params();
        assert!(is_unit(&params.g, &params.n, &params.n_squared));
        assert!(!params.g.is_one());
    }

    #[test]
    fn setup_is_deterministic_under_seeded_rng() {
        let a = setup_with_rng(&test_config(), &mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let b = setup_with_rng(&test_config(), &mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let c = setup_with_rng(&test_config(), &mut ChaCha20Rng::seed_from_u64(8)).unwrap();

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn escrow_disabled_drops_master_material() {
        let config = SetupConfig { escrow: EscrowMode::Disabled, ..test_config() };
        let params = setup_with_rng(&config, &mut ChaCha20Rng::seed_from_u64(11)).unwrap();
        assert!(!params.escrow_enabled());
    }

    #[cfg(feature = "escrow")]
    #[test]
    fn escrow_enabled_keeps_master_material() {
        assert!(shared_params().escrow_enabled());
    }

    #[test]
    fn public_parameters_round_trip() {
        let params = shared_params();
        let public = params.public();

        let decoded = PublicParameters::from_bytes(&public.to_bytes()).unwrap();
        assert_eq!(decoded, public);

        let holder = Parameters::from_public(&decoded).unwrap();
        assert_eq!(holder.id(), params.id());
        assert!(!holder.escrow_enabled());
    }

    #[test]
    fn from_public_rejects_bad_groups() {
        let public = shared_params().public();

        let even = PublicParameters { n: &public.n + 1u32, ..public.clone() };
        assert_eq!(Parameters::from_public(&even).err(), Some(BcpError::InvalidParameters));

        let trivial = PublicParameters { g: BigUint::one(), ..public.clone() };
        assert_eq!(Parameters::from_public(&trivial).err(), Some(BcpError::InvalidParameters));

        let shared_factor = PublicParameters { g: public.n.clone(), ..public.clone() };
        assert_eq!(
            Parameters::from_public(&shared_factor).err(),
            Some(BcpError::InvalidParameters)
        );

        let wrong_size = PublicParameters { level: SecurityLevel(256), ..public };
        assert_eq!(Parameters::from_public(&wrong_size).err(), Some(BcpError::InvalidParameters));
    }

    #[test]
    fn public_parameters_reject_garbage() {
        assert_eq!(
            PublicParameters::from_bytes(b"not a blob").err(),
            Some(BcpError::InvalidParameters)
        );
    }

    #[test]
    fn debug_hides_numbers() {
        let rendered = format!("{:?}", shared_params());
        assert!(rendered.starts_with("Parameters {"));
        assert!(!rendered.contains(&shared_params().modulus().to_string()));
    }
}
