//! Error type for the text-level facade.

use bcp_crypto::BcpError;
use thiserror::Error;

/// Errors returned by [`crate::Bcp`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Failure in the cryptosystem, including malformed text input
    #[error(transparent)]
    Crypto(#[from] BcpError),

    /// Plaintext authenticated but is not valid UTF-8
    #[error("decrypted message is not valid UTF-8")]
    NotUtf8,
}

impl HostError {
    /// Returns true if the operation may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Crypto(err) => err.is_retryable(),
            Self::NotUtf8 => false,
        }
    }
}
