//! Common types, key descriptors, and errors shared across the keyset crates.

pub mod error;
pub mod protocol;

pub use error::KeysetError;
