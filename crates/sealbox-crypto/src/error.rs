//! Error taxonomy for the crypto core.
//!
//! Each variant maps to a distinct, actionable caller-visible failure; none
//! of the messages ever contain key material or plaintext.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// No master secret is configured. The service is reachable but cannot
    /// encrypt or decrypt; status reports `configured = false`.
    #[error("encryption not configured: master secret is missing")]
    NotConfigured,

    /// A required request field is missing or empty. Rejected before any
    /// cryptography runs.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The input to decrypt is not a decodable envelope (bad base64, or too
    /// short to hold salt + nonce + tag).
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// AEAD tag verification failed: corrupted ciphertext, wrong key, or
    /// tampering. Plaintext is never returned in this state.
    #[error("authentication failed: data corrupted or tampered")]
    AuthenticationFailed,

    /// Verified plaintext does not parse as the expected payload shape.
    #[error("invalid payload: {0}")]
    PayloadFormat(String),

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}
