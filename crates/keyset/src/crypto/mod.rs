//! AES-GCM envelope primitives.
//!
//! This module is intentionally free of registry and keyset dependencies.
//! It provides the low-level seal/open operations that key managers hand out
//! as primitives.
//!
//! # Envelope format
//!
//! ```text
//! prefix (0 or 5 bytes) ‖ nonce (12 bytes) ‖ ciphertext (N bytes) ‖ tag (16 bytes)
//! ```
//!
//! The prefix names the encoding scheme and key id; see [`prefix`].

pub mod cipher;
pub mod envelope;
pub mod prefix;
pub mod secret;

use common::KeysetError;

/// An authenticated-encryption primitive bound to one key.
///
/// Implementations are immutable after construction, so a single instance may
/// serve concurrent calls.
pub trait Aead: Send + Sync {
    /// Seal `plaintext`, authenticating `associated_data` alongside it.
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>, KeysetError>;

    /// Open `ciphertext` produced by [`Aead::encrypt`] with the same
    /// `associated_data`.
    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>, KeysetError>;
}

pub use cipher::{AesGcmCipher, KEY_SIZES, NONCE_LEN, TAG_LEN};
pub use envelope::Envelope;
pub use secret::Secret;
