//! Pluggable key managers, keyset handles, and an AES-GCM envelope codec.
//!
//! Control flow:
//!
//! 1. build a [`Registry`] and register a [`KeyManager`] such as
//!    [`ConstantKeyManager`];
//! 2. realise a [`KeysetHandle`] from a template naming the manager;
//! 3. obtain a [`KeysetAead`] for the handle with [`aead::new`];
//! 4. call [`Aead::encrypt`] / [`Aead::decrypt`].
//!
//! ```text
//! envelope = prefix ‖ nonce (12) ‖ ciphertext ‖ tag (16)
//! ```

pub mod aead;
pub mod crypto;
pub mod handle;
pub mod registry;

pub use aead::{Aead, KeysetAead};
pub use handle::KeysetHandle;
pub use registry::{ConstantKeyManager, KeyManager, Registry, CONSTANT_KEY_TYPE_URL};
