//! The [`KeyManager`] capability set every pluggable key provider implements.

use std::sync::Arc;

use common::{protocol::KeyData, KeysetError};

use crate::crypto::Aead;

/// A pluggable provider of key material and the primitive that uses it.
///
/// The registry only ever talks to providers through this trait, so the
/// envelope codec never learns where a key came from.
#[cfg_attr(test, mockall::automock)]
pub trait KeyManager {
    /// Globally namespaced identifier this manager is registered under.
    fn type_url(&self) -> &str;

    /// Whether this manager handles keys of `type_url`.
    fn does_support(&self, type_url: &str) -> bool;

    /// Build the runtime AEAD from serialized key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeysetError::InvalidKeyMaterial`] if the key length does not
    /// match a supported cipher mode.
    fn primitive(&self, serialized_key: &[u8]) -> Result<Arc<dyn Aead>, KeysetError>;

    /// Produce a key descriptor for `serialized_key_format`.
    fn new_key_data(&self, serialized_key_format: &[u8]) -> Result<KeyData, KeysetError>;

    /// Generate a fresh serialized key, or `None` if this manager does not
    /// generate keys ad hoc and [`KeyManager::new_key_data`] should be used.
    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Option<Vec<u8>>, KeysetError>;
}
