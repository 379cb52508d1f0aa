//! [`Secret`]: owned raw key bytes that never leave memory in printable form.

use std::fmt;

/// Immutable raw key bytes.
///
/// The buffer is fixed at construction and overwritten with zeroes on drop.
/// `Debug` never prints the bytes; callers that genuinely need them (the
/// demo's hex dump, handing the key to a cipher) go through [`Secret::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Box<[u8]>);

impl Secret {
    /// Copy `bytes` into a new secret.
    pub fn new(bytes: &[u8]) -> Self {
        Self(bytes.to_vec().into_boxed_slice())
    }

    /// Borrow the raw key bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Secret {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material, not even in debug builds.
        write!(f, "Secret([REDACTED; {}])", self.0.len())
    }
}
