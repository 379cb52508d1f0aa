//! AES-GCM sealing and opening of byte payloads.
//!
//! **Algorithm choice:** standard AES-GCM (NIST SP 800-38D) with a 96-bit nonce
//! and a 128-bit tag, so that any conforming GCM implementation can open what
//! this module seals given only the key, nonce, and sealed bytes.
//!
//! **Every seal draws a fresh nonce from the OS CSPRNG.** GCM nonce reuse
//! under one key is catastrophic: it breaks both confidentiality and
//! authentication.

use aes_gcm::{
    aead::{consts::U12, rand_core::RngCore, Aead as _, KeyInit, OsRng, Payload},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};
use common::KeysetError;
use tracing::debug;

use super::Aead;

/// Accepted AES key lengths in bytes (AES-128, AES-192, AES-256).
pub const KEY_SIZES: [usize; 3] = [16, 24, 32];

/// Byte length of a GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of a GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

type Aes192Gcm = AesGcm<Aes192, U12>;

enum Engine {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

/// AES-GCM primitive bound to one key.
///
/// Output of [`Aead::encrypt`] is `nonce ‖ ciphertext ‖ tag`, which is exactly
/// the input [`Aead::decrypt`] expects. The cipher holds no per-call state and
/// is safe to share across threads.
pub struct AesGcmCipher {
    engine: Engine,
    key_len: usize,
}

impl AesGcmCipher {
    /// Build a cipher from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeysetError::InvalidKeyMaterial`] if `key` is not 16, 24 or 32
    /// bytes long.
    pub fn new(key: &[u8]) -> Result<Self, KeysetError> {
        let engine = match key.len() {
            16 => Aes128Gcm::new_from_slice(key).map(Engine::Aes128),
            24 => Aes192Gcm::new_from_slice(key).map(Engine::Aes192),
            32 => Aes256Gcm::new_from_slice(key).map(Engine::Aes256),
            got => return Err(KeysetError::InvalidKeyMaterial { got }),
        }
        .map_err(|_| KeysetError::InvalidKeyMaterial { got: key.len() })?;
        Ok(Self {
            engine,
            key_len: key.len(),
        })
    }

    /// Key length in bytes.
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    fn seal_with_nonce(
        &self,
        nonce: &[u8; NONCE_LEN],
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, KeysetError> {
        let nonce = Nonce::from_slice(nonce);
        let payload = Payload {
            msg: plaintext,
            aad: associated_data,
        };
        let sealed = match &self.engine {
            Engine::Aes128(c) => c.encrypt(nonce, payload),
            Engine::Aes192(c) => c.encrypt(nonce, payload),
            Engine::Aes256(c) => c.encrypt(nonce, payload),
        };
        // Encryption only fails for plaintexts beyond the GCM length limit.
        sealed.map_err(|_| KeysetError::PlaintextTooLarge(plaintext.len()))
    }

    fn open_with_nonce(
        &self,
        nonce: &[u8],
        sealed: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, KeysetError> {
        let nonce = Nonce::from_slice(nonce);
        let payload = Payload {
            msg: sealed,
            aad: associated_data,
        };
        let opened = match &self.engine {
            Engine::Aes128(c) => c.decrypt(nonce, payload),
            Engine::Aes192(c) => c.decrypt(nonce, payload),
            Engine::Aes256(c) => c.decrypt(nonce, payload),
        };
        opened.map_err(|_| KeysetError::AuthenticationFailure)
    }
}

impl Aead for AesGcmCipher {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>, KeysetError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|_| KeysetError::RandomnessUnavailable)?;

        let sealed = self.seal_with_nonce(&nonce, plaintext, associated_data)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        debug!(plaintext_len = plaintext.len(), sealed_len = out.len(), "aes-gcm seal");
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>, KeysetError> {
        let min = NONCE_LEN + TAG_LEN;
        if ciphertext.len() < min {
            return Err(KeysetError::MalformedEnvelope {
                len: ciphertext.len(),
                min,
            });
        }
        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
        let plaintext = self.open_with_nonce(nonce, sealed, associated_data)?;
        debug!(sealed_len = ciphertext.len(), plaintext_len = plaintext.len(), "aes-gcm open");
        Ok(plaintext)
    }
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher")
            .field("key_len", &self.key_len)
            .finish_non_exhaustive()
    }
}
