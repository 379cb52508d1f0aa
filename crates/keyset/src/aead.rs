//! [`KeysetAead`]: the envelope codec bound to a keyset handle.
//!
//! Encryption prepends the primary key's output prefix to the primitive's
//! `nonce ‖ ciphertext ‖ tag`. Decryption checks the prefix for dispatch, then
//! hands the remainder to the primitive. The prefix is framing only; nothing
//! authenticates it.

use std::sync::Arc;

use common::{protocol::OutputPrefixType, KeysetError};
use tracing::debug;

use crate::crypto::{prefix::output_prefix, Envelope};
use crate::handle::KeysetHandle;
use crate::registry::Registry;

pub use crate::crypto::Aead;

/// Build the AEAD for `handle`, obtaining its primitive from `registry`.
///
/// # Errors
///
/// Returns [`KeysetError::UnknownKeyType`] if the key's manager is not
/// registered, or [`KeysetError::InvalidKeyMaterial`] if the manager rejects
/// the key bytes.
pub fn new(registry: &Registry, handle: &KeysetHandle) -> Result<KeysetAead, KeysetError> {
    let entry = handle.primary();
    let primitive = registry.primitive(&entry.key_data.type_url, &entry.key_data.value)?;
    Ok(KeysetAead {
        prefix: output_prefix(entry.key_id, entry.output_prefix_type),
        output_prefix_type: entry.output_prefix_type,
        key_id: entry.key_id,
        primitive,
    })
}

/// Prefix-framing wrapper around a key manager's primitive.
#[derive(Clone)]
pub struct KeysetAead {
    prefix: Vec<u8>,
    output_prefix_type: OutputPrefixType,
    key_id: u32,
    primitive: Arc<dyn Aead>,
}

impl KeysetAead {
    /// The bytes prepended to every envelope.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn output_prefix_type(&self) -> OutputPrefixType {
        self.output_prefix_type
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Split an envelope produced by this AEAD into its components.
    pub fn split<'a>(&self, envelope: &'a [u8]) -> Result<Envelope<'a>, KeysetError> {
        Envelope::split(envelope, self.prefix.len())
    }
}

impl Aead for KeysetAead {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>, KeysetError> {
        let sealed = self.primitive.encrypt(plaintext, associated_data)?;
        let mut envelope = Vec::with_capacity(self.prefix.len() + sealed.len());
        envelope.extend_from_slice(&self.prefix);
        envelope.extend_from_slice(&sealed);
        Ok(envelope)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>, KeysetError> {
        let env = self.split(ciphertext)?;
        if env.prefix != self.prefix.as_slice() {
            debug!(key_id = self.key_id, "envelope prefix does not match primary key");
            return Err(KeysetError::AuthenticationFailure);
        }
        self.primitive
            .decrypt(&ciphertext[self.prefix.len()..], associated_data)
    }
}

impl std::fmt::Debug for KeysetAead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeysetAead")
            .field("key_id", &self.key_id)
            .field("output_prefix_type", &self.output_prefix_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Secret, NONCE_LEN, TAG_LEN};
    use crate::registry::{ConstantKeyManager, CONSTANT_KEY_TYPE_URL};

    fn aead_for(mode: OutputPrefixType, key: &[u8]) -> Result<KeysetAead, KeysetError> {
        let km = ConstantKeyManager::new(CONSTANT_KEY_TYPE_URL, Secret::new(key));
        let template = km.template_with_prefix(mode);
        let registry = Registry::new();
        registry.register(km)?;
        let handle = KeysetHandle::new(&registry, &template)?;
        new(&registry, &handle)
    }

    fn demo_key() -> Vec<u8> {
        (1..=16).collect()
    }

    #[test]
    fn round_trip_every_prefix_mode() {
        for mode in [
            OutputPrefixType::Tink,
            OutputPrefixType::Legacy,
            OutputPrefixType::Raw,
            OutputPrefixType::Crunchy,
        ] {
            let aead = aead_for(mode, &demo_key()).unwrap();
            let ct = aead.encrypt(b"This is a test", b"").unwrap();
            assert_eq!(aead.decrypt(&ct, b"").unwrap(), b"This is a test");
        }
    }

    #[test]
    fn tink_envelope_layout() {
        let aead = aead_for(OutputPrefixType::Tink, &demo_key()).unwrap();
        let ct = aead.encrypt(b"hello", b"").unwrap();
        assert_eq!(ct.len(), 5 + NONCE_LEN + 5 + TAG_LEN);
        assert_eq!(ct[0], 0x01);
        assert_eq!(&ct[1..5], &aead.key_id().to_be_bytes());

        let env = aead.split(&ct).unwrap();
        assert_eq!(env.prefix, aead.prefix());
        assert_eq!(env.ciphertext_len(), 5);
    }

    #[test]
    fn raw_envelope_has_no_prefix() {
        let aead = aead_for(OutputPrefixType::Raw, &demo_key()).unwrap();
        let ct = aead.encrypt(b"hello", b"").unwrap();
        assert_eq!(ct.len(), NONCE_LEN + 5 + TAG_LEN);
        assert!(aead.prefix().is_empty());
    }

    #[test]
    fn truncated_envelope_is_malformed() {
        let aead = aead_for(OutputPrefixType::Tink, &demo_key()).unwrap();
        let ct = aead.encrypt(b"", b"").unwrap();
        assert_eq!(
            aead.decrypt(&ct[..ct.len() - 1], b""),
            Err(KeysetError::MalformedEnvelope { len: 32, min: 33 })
        );
    }

    #[test]
    fn foreign_prefix_is_rejected_opaquely() {
        let aead = aead_for(OutputPrefixType::Tink, &demo_key()).unwrap();
        let mut ct = aead.encrypt(b"hello", b"").unwrap();
        ct[0] = 0x00;
        assert_eq!(aead.decrypt(&ct, b""), Err(KeysetError::AuthenticationFailure));
    }

    #[test]
    fn associated_data_is_bound() {
        let aead = aead_for(OutputPrefixType::Tink, &demo_key()).unwrap();
        let ct = aead.encrypt(b"hello", b"header-v1").unwrap();
        assert_eq!(aead.decrypt(&ct, b"header-v1").unwrap(), b"hello");
        assert_eq!(
            aead.decrypt(&ct, b"header-v2"),
            Err(KeysetError::AuthenticationFailure)
        );
    }

    #[test]
    fn wrong_key_length_fails_at_construction() {
        assert_eq!(
            aead_for(OutputPrefixType::Tink, &[0u8; 15]).err(),
            Some(KeysetError::InvalidKeyMaterial { got: 15 })
        );
        assert_eq!(
            aead_for(OutputPrefixType::Tink, &[0u8; 17]).err(),
            Some(KeysetError::InvalidKeyMaterial { got: 17 })
        );
    }

    #[test]
    fn independent_handles_interoperate_only_in_raw_mode() {
        // Same constant secret, different key ids: the prefix differs in
        // Tink mode but there is no prefix in raw mode.
        let a = aead_for(OutputPrefixType::Raw, &demo_key()).unwrap();
        let b = aead_for(OutputPrefixType::Raw, &demo_key()).unwrap();
        let ct = a.encrypt(b"shared", b"").unwrap();
        assert_eq!(b.decrypt(&ct, b"").unwrap(), b"shared");
    }
}
