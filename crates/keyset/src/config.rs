//! Configuration loading and validation for the demo binary.
//!
//! All values are read from `CONSTKEY_*` environment variables at startup and
//! fall back to the values of the canonical demonstration.

use anyhow::{Context, Result};
use common::protocol::OutputPrefixType;
use serde::Deserialize;

use keyset::crypto::{Secret, KEY_SIZES};

/// Validated demo configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Plaintext to encrypt.
    #[serde(default = "default_message")]
    pub message: String,

    /// Hex-encoded constant secret (16, 24 or 32 bytes).
    #[serde(default = "default_key_hex")]
    pub key_hex: String,

    /// Type URL the constant-key manager registers under.
    #[serde(default = "default_type_url")]
    pub type_url: String,

    /// Output prefix mode: `tink`, `legacy`, `raw` or `crunchy`.
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Associated data bound to the ciphertext.
    #[serde(default)]
    pub associated_data: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_message() -> String {
    "This is a test".into()
}
fn default_key_hex() -> String {
    "0102030405060708090a0b0c0d0e0f10".into()
}
fn default_type_url() -> String {
    "constantkey.com".into()
}
fn default_output_prefix() -> String {
    "tink".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("CONSTKEY"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The decoded constant secret.
    pub fn secret(&self) -> Result<Secret> {
        let bytes = hex::decode(self.key_hex.trim()).context("CONSTKEY_KEY_HEX is not valid hex")?;
        Ok(Secret::from(bytes))
    }

    /// The parsed output prefix mode.
    pub fn output_prefix_type(&self) -> Result<OutputPrefixType> {
        self.output_prefix
            .parse()
            .map_err(|e: String| anyhow::anyhow!("CONSTKEY_OUTPUT_PREFIX: {e}"))
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.type_url.trim().is_empty() {
            anyhow::bail!("CONSTKEY_TYPE_URL must not be empty");
        }
        let secret = self.secret()?;
        if !KEY_SIZES.contains(&secret.len()) {
            anyhow::bail!(
                "CONSTKEY_KEY_HEX must decode to 16, 24 or 32 bytes, got {}",
                secret.len()
            );
        }
        self.output_prefix_type()?;
        Ok(())
    }
}
