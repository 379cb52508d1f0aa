//! Key manager registration and lookup.
//!
//! # Responsibilities
//!
//! - Map type URLs to [`KeyManager`] implementations.
//! - Turn a [`KeyTemplate`] into [`KeyData`] via the named manager.
//! - Turn serialized key bytes into a runtime [`Aead`] via the named manager.
//!
//! # Concurrency
//!
//! Registration is serialised by a writer mutex and publishes a fresh map
//! through `arc-swap`, so lookups never block and never observe a half-written
//! map. A [`Registry`] is an ordinary value: callers build one and pass it to
//! whatever creates handles. There is no process-wide instance.

pub mod constant;
pub mod manager;

pub use constant::{ConstantKeyManager, CONSTANT_KEY_TYPE_URL};
pub use manager::KeyManager;

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use arc_swap::ArcSwap;
use common::{
    protocol::{KeyData, KeyTemplate},
    KeysetError,
};
use tracing::{info, warn};

use crate::crypto::Aead;

/// Shared handle to a registered key manager.
pub type SharedKeyManager = Arc<dyn KeyManager + Send + Sync>;

/// Explicit map from type URL to key manager.
pub struct Registry {
    managers: ArcSwap<HashMap<String, SharedKeyManager>>,
    write_lock: Mutex<()>,
}

impl Registry {
    /// Create a new, empty [`Registry`].
    pub fn new() -> Self {
        Self {
            managers: ArcSwap::new(Arc::new(HashMap::new())),
            write_lock: Mutex::new(()),
        }
    }

    /// Register `manager` under its own type URL.
    ///
    /// # Errors
    ///
    /// Returns [`KeysetError::DuplicateKeyType`] if a manager is already
    /// registered under the same type URL. The registry is left unchanged.
    pub fn register<M>(&self, manager: M) -> Result<(), KeysetError>
    where
        M: KeyManager + Send + Sync + 'static,
    {
        self.register_shared(Arc::new(manager))
    }

    /// Register an already shared manager.
    pub fn register_shared(&self, manager: SharedKeyManager) -> Result<(), KeysetError> {
        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let type_url = manager.type_url().to_owned();
        let current = self.managers.load();
        if current.contains_key(&type_url) {
            warn!(type_url = %type_url, "key manager already registered");
            return Err(KeysetError::DuplicateKeyType(type_url));
        }

        let mut next = HashMap::clone(&current);
        next.insert(type_url.clone(), manager);
        self.managers.store(Arc::new(next));
        info!(type_url = %type_url, "key manager registered");
        Ok(())
    }

    /// Look up the manager for `type_url`.
    ///
    /// # Errors
    ///
    /// Returns [`KeysetError::UnknownKeyType`] if no registered manager
    /// supports `type_url`.
    pub fn get(&self, type_url: &str) -> Result<SharedKeyManager, KeysetError> {
        self.managers
            .load()
            .get(type_url)
            .filter(|m| m.does_support(type_url))
            .cloned()
            .ok_or_else(|| KeysetError::UnknownKeyType(type_url.to_owned()))
    }

    /// Whether a manager is registered under `type_url`.
    pub fn contains(&self, type_url: &str) -> bool {
        self.managers.load().contains_key(type_url)
    }

    /// Number of registered managers.
    pub fn len(&self) -> usize {
        self.managers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.load().is_empty()
    }

    /// Produce key data for `template` using the manager it names.
    pub fn new_key_data(&self, template: &KeyTemplate) -> Result<KeyData, KeysetError> {
        self.get(&template.type_url)?
            .new_key_data(&template.value)
    }

    /// Build the primitive for `serialized_key` using the manager for `type_url`.
    pub fn primitive(
        &self,
        type_url: &str,
        serialized_key: &[u8],
    ) -> Result<Arc<dyn Aead>, KeysetError> {
        self.get(type_url)?.primitive(serialized_key)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let managers = self.managers.load();
        let mut type_urls: Vec<&String> = managers.keys().collect();
        type_urls.sort();
        f.debug_struct("Registry")
            .field("type_urls", &type_urls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secret;
    use common::protocol::{KeyMaterialType, OutputPrefixType};
    use super::manager::MockKeyManager;

    fn constant(type_url: &str) -> ConstantKeyManager {
        ConstantKeyManager::new(type_url, Secret::new(&[0x11; 16]))
    }

    fn mock_named(type_url: &'static str) -> MockKeyManager {
        let mut mock = MockKeyManager::new();
        mock.expect_type_url().return_const(type_url.to_owned());
        mock.expect_does_support()
            .returning(move |url| url == type_url);
        mock
    }

    #[test]
    fn initially_empty() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn register_and_get() {
        let registry = Registry::new();
        registry.register(constant("constantkey.com")).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("constantkey.com"));
        assert_eq!(registry.get("constantkey.com").unwrap().type_url(), "constantkey.com");
    }

    #[test]
    fn duplicate_registration_rejected_and_registry_unchanged() {
        let registry = Registry::new();
        registry.register(constant("constantkey.com")).unwrap();
        let err = registry.register(constant("constantkey.com")).unwrap_err();
        assert_eq!(err, KeysetError::DuplicateKeyType("constantkey.com".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_type_url_rejected() {
        let registry = Registry::new();
        registry.register(constant("constantkey.com")).unwrap();
        assert_eq!(
            registry.get("unknown.example").err(),
            Some(KeysetError::UnknownKeyType("unknown.example".into()))
        );
    }

    #[test]
    fn new_key_data_for_unknown_template_does_not_mutate() {
        let registry = Registry::new();
        let template = KeyTemplate {
            type_url: "never-registered".into(),
            value: Vec::new(),
            output_prefix_type: OutputPrefixType::Tink,
        };
        assert_eq!(
            registry.new_key_data(&template),
            Err(KeysetError::UnknownKeyType("never-registered".into()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn new_key_data_delegates_template_value() {
        let mut mock = mock_named("mock.example");
        mock.expect_new_key_data()
            .withf(|format| format.to_vec() == b"params".to_vec())
            .times(1)
            .returning(|_| {
                Ok(KeyData {
                    type_url: "mock.example".into(),
                    value: vec![9; 16],
                    key_material_type: KeyMaterialType::Symmetric,
                })
            });

        let registry = Registry::new();
        registry.register(mock).unwrap();
        let template = KeyTemplate {
            type_url: "mock.example".into(),
            value: b"params".to_vec(),
            output_prefix_type: OutputPrefixType::Raw,
        };
        let data = registry.new_key_data(&template).unwrap();
        assert_eq!(data.value, vec![9; 16]);
    }

    #[test]
    fn manager_that_disowns_its_type_url_is_not_returned() {
        let mut mock = MockKeyManager::new();
        mock.expect_type_url().return_const("fickle.example".to_owned());
        mock.expect_does_support().returning(|_| false);

        let registry = Registry::new();
        registry.register(mock).unwrap();
        assert!(matches!(
            registry.get("fickle.example"),
            Err(KeysetError::UnknownKeyType(_))
        ));
    }

    #[test]
    fn primitive_errors_propagate() {
        let registry = Registry::new();
        registry.register(constant("constantkey.com")).unwrap();
        assert_eq!(
            registry.primitive("constantkey.com", &[0u8; 15]).err(),
            Some(KeysetError::InvalidKeyMaterial { got: 15 })
        );
    }

    #[test]
    fn concurrent_registration_admits_exactly_one() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.register(constant("constantkey.com")).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn debug_lists_type_urls() {
        let registry = Registry::new();
        registry.register(constant("b.example")).unwrap();
        registry.register(constant("a.example")).unwrap();
        assert_eq!(
            format!("{registry:?}"),
            r#"Registry { type_urls: ["a.example", "b.example"] }"#
        );
    }
}
