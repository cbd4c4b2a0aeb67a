//! Error types for BCP operations

use thiserror::Error;

/// Errors from parameter setup, key generation, encryption and decryption.
///
/// Tampered, malformed, and wrongly keyed ciphertexts all produce the same
/// [`BcpError::DecryptionFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BcpError {
    /// Security level outside the supported range
    #[error("invalid security level {level}: supported range is {min}..={max}")]
    InvalidSecurityLevel {
        /// Requested level (bits per prime factor)
        level: u32,
        /// Smallest supported level
        min: u32,
        /// Largest supported level
        max: u32,
    },

    /// No initialized parameters are available (before setup or after
    /// destroy)
    #[error("parameters are not initialized")]
    ParametersUninitialized,

    /// Parameters slot has already left the uninitialized state
    #[error("parameters were already initialized")]
    ParametersAlreadyInitialized,

    /// Public parameters failed validation
    #[error("invalid public parameters")]
    InvalidParameters,

    /// Public key is malformed or not bound to the active parameters
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Secret key is malformed or not bound to the active parameters
    #[error("invalid secret key")]
    InvalidSecretKey,

    /// Scalar plaintext does not fit in `Z_n`
    #[error("plaintext out of range for modulus")]
    PlaintextOutOfRange,

    /// Ciphertext could not be decrypted
    #[error("decryption failed")]
    DecryptionFailed,

    /// Parameters carry no master secret
    #[error("master key unavailable")]
    MasterKeyUnavailable,

    /// The OS randomness source failed
    #[error("entropy source unavailable")]
    EntropyUnavailable,
}

impl BcpError {
    /// Returns true if the operation may succeed on retry.
    ///
    /// Only randomness failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EntropyUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_entropy_failure_is_retryable() {
        assert!(BcpError::EntropyUnavailable.is_retryable());
        assert!(!BcpError::DecryptionFailed.is_retryable());
        assert!(!BcpError::MasterKeyUnavailable.is_retryable());
        assert!(!BcpError::InvalidPublicKey.is_retryable());
    }

    #[test]
    fn decryption_failure_reveals_nothing() {
        assert_eq!(BcpError::DecryptionFailed.to_string(), "decryption failed");
    }

    #[test]
    fn error_display() {
        let err = BcpError::InvalidSecurityLevel { level: 8, min: 64, max: 4096 };
        assert_eq!(err.to_string(), "invalid security level 8: supported range is 64..=4096");
    }
}
