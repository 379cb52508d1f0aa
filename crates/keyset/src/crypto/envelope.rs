//! Zero-copy view of an envelope's `prefix ‖ nonce ‖ sealed` layout.

use common::KeysetError;

use super::cipher::{NONCE_LEN, TAG_LEN};

/// Borrowed components of an envelope.
///
/// `sealed` is `ciphertext ‖ tag`. `nonce` and `sealed` together are exactly
/// what a standard AES-GCM implementation needs to open the payload; the
/// prefix is framing only and carries no authenticated binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub prefix: &'a [u8],
    pub nonce: &'a [u8],
    pub sealed: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Smallest valid envelope for a prefix of `prefix_len` bytes.
    pub const fn min_len(prefix_len: usize) -> usize {
        prefix_len + NONCE_LEN + TAG_LEN
    }

    /// Split `bytes` at the fixed offsets for a prefix of `prefix_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeysetError::MalformedEnvelope`] if `bytes` is shorter than
    /// [`Envelope::min_len`].
    pub fn split(bytes: &'a [u8], prefix_len: usize) -> Result<Self, KeysetError> {
        let min = Self::min_len(prefix_len);
        if bytes.len() < min {
            return Err(KeysetError::MalformedEnvelope {
                len: bytes.len(),
                min,
            });
        }
        let (prefix, rest) = bytes.split_at(prefix_len);
        let (nonce, sealed) = rest.split_at(NONCE_LEN);
        Ok(Self {
            prefix,
            nonce,
            sealed,
        })
    }

    /// Length of the ciphertext body, excluding the tag.
    pub fn ciphertext_len(&self) -> usize {
        self.sealed.len() - TAG_LEN
    }
}
