//! [`KeysetHandle`]: in-memory key material realised from a [`KeyTemplate`].

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use common::{
    protocol::{KeyData, KeyInfo, KeyStatus, KeyTemplate, KeysetInfo, OutputPrefixType},
    KeysetError,
};
use tracing::info;

use crate::registry::Registry;

/// A single key inside a keyset.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    pub key_data: KeyData,
    pub key_id: u32,
    pub status: KeyStatus,
    pub output_prefix_type: OutputPrefixType,
}

/// Caller-owned keyset holding exactly one primary key.
///
/// The handle is immutable once built; an AEAD built from it may be used for
/// as long as the caller keeps it.
#[derive(Debug, Clone)]
pub struct KeysetHandle {
    primary: KeyEntry,
}

impl KeysetHandle {
    /// Realise `template` through the manager `registry` holds for it.
    ///
    /// # Errors
    ///
    /// Returns [`KeysetError::UnknownKeyType`] if the template's type URL is
    /// not registered, or whatever the manager reports while producing key data.
    pub fn new(registry: &Registry, template: &KeyTemplate) -> Result<Self, KeysetError> {
        let key_data = registry.new_key_data(template)?;
        let key_id = new_key_id()?;
        info!(
            type_url = %key_data.type_url,
            key_id,
            output_prefix_type = ?template.output_prefix_type,
            "keyset handle created"
        );
        Ok(Self {
            primary: KeyEntry {
                key_data,
                key_id,
                status: KeyStatus::Enabled,
                output_prefix_type: template.output_prefix_type,
            },
        })
    }

    /// The primary key.
    pub fn primary(&self) -> &KeyEntry {
        &self.primary
    }

    /// Metadata about this keyset. Contains no key material.
    pub fn keyset_info(&self) -> KeysetInfo {
        let entry = &self.primary;
        KeysetInfo {
            primary_key_id: entry.key_id,
            key_info: vec![KeyInfo {
                type_url: entry.key_data.type_url.clone(),
                status: entry.status,
                key_id: entry.key_id,
                output_prefix_type: entry.output_prefix_type,
            }],
        }
    }
}

/// Draw a random non-zero key id from the OS CSPRNG.
fn new_key_id() -> Result<u32, KeysetError> {
    loop {
        let mut buf = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|_| KeysetError::RandomnessUnavailable)?;
        let id = u32::from_be_bytes(buf);
        if id != 0 {
            return Ok(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secret;
    use crate::registry::ConstantKeyManager;

    fn registry_with_constant() -> (Registry, KeyTemplate) {
        let km = ConstantKeyManager::new("constantkey.com", Secret::new(&[5u8; 16]));
        let template = km.template();
        let registry = Registry::new();
        registry.register(km).unwrap();
        (registry, template)
    }

    #[test]
    fn handle_from_registered_template() {
        let (registry, template) = registry_with_constant();
        let handle = KeysetHandle::new(&registry, &template).unwrap();
        let primary = handle.primary();
        assert_ne!(primary.key_id, 0);
        assert_eq!(primary.status, KeyStatus::Enabled);
        assert_eq!(primary.output_prefix_type, OutputPrefixType::Tink);
        assert_eq!(primary.key_data.value, vec![5u8; 16]);
    }

    #[test]
    fn unregistered_template_rejected() {
        let registry = Registry::new();
        let template = KeyTemplate {
            type_url: "constantkey.com".into(),
            value: Vec::new(),
            output_prefix_type: OutputPrefixType::Tink,
        };
        assert_eq!(
            KeysetHandle::new(&registry, &template).err().map(|e| e.code()),
            Some("unknown_key_type")
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn handles_share_constant_secret_but_not_key_ids() {
        let (registry, template) = registry_with_constant();
        let a = KeysetHandle::new(&registry, &template).unwrap();
        let b = KeysetHandle::new(&registry, &template).unwrap();
        assert_eq!(a.primary().key_data, b.primary().key_data);
        // Collisions are possible in principle but vanishingly unlikely.
        assert_ne!(a.primary().key_id, b.primary().key_id);
    }

    #[test]
    fn keyset_info_mirrors_primary() {
        let (registry, template) = registry_with_constant();
        let handle = KeysetHandle::new(&registry, &template).unwrap();
        let info = handle.keyset_info();
        assert_eq!(info.primary_key_id, handle.primary().key_id);
        assert_eq!(info.key_info.len(), 1);
        assert_eq!(info.key_info[0].type_url, "constantkey.com");
        assert_eq!(info.key_info[0].status, KeyStatus::Enabled);
    }

    #[test]
    fn debug_never_prints_key_bytes() {
        let (registry, template) = registry_with_constant();
        let handle = KeysetHandle::new(&registry, &template).unwrap();
        assert!(format!("{handle:?}").contains("REDACTED"));
    }
}
