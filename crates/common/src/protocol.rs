//! Key descriptors, templates, and keyset metadata exchanged between components.
//!
//! These types are serialised as JSON when a descriptor is exported for
//! inspection. Raw key bytes are base64 encoded on the wire and redacted from
//! every `Debug` rendering.

use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Key descriptor
// ---------------------------------------------------------------------------

/// What kind of key material a [`KeyData`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyMaterialType {
    Symmetric,
    AsymmetricPrivate,
    AsymmetricPublic,
    Remote,
}

/// A realised key: the type URL of the manager that understands it, the raw
/// key bytes, and the material type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyData {
    /// Type URL of the key manager that produced this key.
    pub type_url: String,
    /// Raw key bytes. Base64 on the wire.
    #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
    pub value: Vec<u8>,
    /// Material type tag.
    pub key_material_type: KeyMaterialType,
}

impl fmt::Debug for KeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        f.debug_struct("KeyData")
            .field("type_url", &self.type_url)
            .field("value", &"[REDACTED]")
            .field("key_material_type", &self.key_material_type)
            .finish()
    }
}

fn to_base64<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&STANDARD.encode(bytes))
}

fn from_base64<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(d)?;
    STANDARD.decode(encoded).map_err(serde::de::Error::custom)
}

// ---------------------------------------------------------------------------
// Key template
// ---------------------------------------------------------------------------

/// How ciphertexts produced by a key are prefixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputPrefixType {
    /// `0x01 ‖ key_id`.
    Tink,
    /// `0x00 ‖ key_id`.
    Legacy,
    /// No prefix.
    Raw,
    /// `0x00 ‖ key_id`.
    Crunchy,
}

impl FromStr for OutputPrefixType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tink" => Ok(Self::Tink),
            "legacy" => Ok(Self::Legacy),
            "raw" => Ok(Self::Raw),
            "crunchy" => Ok(Self::Crunchy),
            other => Err(format!("unknown output prefix type: {other}")),
        }
    }
}

/// Names the key manager to instantiate and carries its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTemplate {
    /// Type URL of the key manager.
    pub type_url: String,
    /// Serialized key format handed to the manager. Empty for constant keys.
    #[serde(default)]
    pub value: Vec<u8>,
    /// Output prefix mode for ciphertexts produced by the resulting key.
    pub output_prefix_type: OutputPrefixType,
}

// ---------------------------------------------------------------------------
// Keyset metadata
// ---------------------------------------------------------------------------

/// Lifecycle status of a key inside a keyset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyStatus {
    Enabled,
    Disabled,
}

/// Metadata about a single key. Contains no key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub type_url: String,
    pub status: KeyStatus,
    pub key_id: u32,
    pub output_prefix_type: OutputPrefixType,
}

/// Metadata about a keyset, safe to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetInfo {
    pub primary_key_id: u32,
    pub key_info: Vec<KeyInfo>,
}
