//! Common error types shared across crates.

use thiserror::Error;

/// Top-level keyset error type.
///
/// Every failure of registry construction, handle creation, or a seal/open
/// call surfaces as one of these variants. None are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeysetError {
    /// A template or lookup named a type URL with no registered key manager.
    #[error("unknown key type: {0}")]
    UnknownKeyType(String),

    /// A key manager with the same type URL is already registered.
    #[error("key type already registered: {0}")]
    DuplicateKeyType(String),

    /// The raw key bytes do not match any supported AES key size.
    #[error("invalid key material: expected 16, 24 or 32 bytes, got {got}")]
    InvalidKeyMaterial { got: usize },

    /// The envelope is shorter than prefix + nonce + tag.
    #[error("malformed envelope: {len} bytes, need at least {min}")]
    MalformedEnvelope { len: usize, min: usize },

    /// Tag verification or prefix dispatch failed.
    ///
    /// The message is deliberately fixed: it must not reveal whether the tag,
    /// the nonce, or the prefix was wrong.
    #[error("decryption failed")]
    AuthenticationFailure,

    /// The plaintext exceeds the GCM per-message length limit.
    #[error("plaintext too large: {0} bytes")]
    PlaintextTooLarge(usize),

    /// The OS random source could not produce a nonce or key id.
    #[error("secure random source unavailable")]
    RandomnessUnavailable,
}

impl KeysetError {
    /// Returns a short machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            KeysetError::UnknownKeyType(_) => "unknown_key_type",
            KeysetError::DuplicateKeyType(_) => "duplicate_key_type",
            KeysetError::InvalidKeyMaterial { .. } => "invalid_key_material",
            KeysetError::MalformedEnvelope { .. } => "malformed_envelope",
            KeysetError::AuthenticationFailure => "authentication_failure",
            KeysetError::PlaintextTooLarge(_) => "plaintext_too_large",
            KeysetError::RandomnessUnavailable => "randomness_unavailable",
        }
    }
}
