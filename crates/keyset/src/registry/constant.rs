//! [`ConstantKeyManager`]: a key manager that always hands out one fixed key.
//!
//! Every keyset built from a constant-key template shares the identical secret.
//! That makes the ciphertexts reproducible with a plain AES-GCM implementation,
//! which is the point of the demonstration, and makes the manager unsuitable
//! for real key management.

use std::sync::Arc;

use common::{
    protocol::{KeyData, KeyMaterialType, KeyTemplate, OutputPrefixType},
    KeysetError,
};

use crate::crypto::{Aead, AesGcmCipher, Secret};

use super::KeyManager;

/// Type URL the demonstration registers the constant-key manager under.
pub const CONSTANT_KEY_TYPE_URL: &str = "constantkey.com";

/// Key manager wrapping a pre-existing secret.
#[derive(Debug, Clone)]
pub struct ConstantKeyManager {
    type_url: String,
    secret: Secret,
}

impl ConstantKeyManager {
    /// Create a manager that serves `secret` under `type_url`.
    ///
    /// The secret length is not checked here; an unsupported length surfaces
    /// as [`KeysetError::InvalidKeyMaterial`] when the primitive is built.
    pub fn new(type_url: impl Into<String>, secret: Secret) -> Self {
        Self {
            type_url: type_url.into(),
            secret,
        }
    }

    /// The secret this manager serves.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Template naming this manager with [`OutputPrefixType::Tink`] output.
    pub fn template(&self) -> KeyTemplate {
        self.template_with_prefix(OutputPrefixType::Tink)
    }

    /// Template naming this manager with the given output prefix mode.
    pub fn template_with_prefix(&self, output_prefix_type: OutputPrefixType) -> KeyTemplate {
        KeyTemplate {
            type_url: self.type_url.clone(),
            value: Vec::new(),
            output_prefix_type,
        }
    }
}

impl KeyManager for ConstantKeyManager {
    fn type_url(&self) -> &str {
        &self.type_url
    }

    fn does_support(&self, type_url: &str) -> bool {
        type_url == self.type_url
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<Arc<dyn Aead>, KeysetError> {
        Ok(Arc::new(AesGcmCipher::new(serialized_key)?))
    }

    fn new_key_data(&self, _serialized_key_format: &[u8]) -> Result<KeyData, KeysetError> {
        // The format is ignored: the descriptor always wraps the fixed secret.
        Ok(KeyData {
            type_url: self.type_url.clone(),
            value: self.secret.expose().to_vec(),
            key_material_type: KeyMaterialType::Symmetric,
        })
    }

    fn new_key(&self, _serialized_key_format: &[u8]) -> Result<Option<Vec<u8>>, KeysetError> {
        Ok(None)
    }
}
