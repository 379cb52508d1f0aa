//! `constkey-demo`: constant-key AEAD demonstration entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Register the constant-key manager in a fresh [`Registry`].
//! 4. Build a keyset handle from the constant-key template and its AEAD.
//! 5. Encrypt and decrypt the configured message, printing each envelope part.
//! 6. Open the same envelope with an independent AES-GCM implementation and
//!    check that both agree.

mod config;
mod telemetry;

use anyhow::{anyhow, Context, Result};
use keyset::{crypto::Envelope, Aead, ConstantKeyManager, KeysetHandle, Registry};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_128_GCM, AES_256_GCM};
use tracing::{info, warn};

use crate::config::Config;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "constkey-demo starting");

    // -----------------------------------------------------------------------
    // 3. Registry
    // -----------------------------------------------------------------------
    let secret = cfg.secret()?;
    let key_hex = hex::encode(secret.expose());
    let manager = ConstantKeyManager::new(cfg.type_url.clone(), secret);
    let template = manager.template_with_prefix(cfg.output_prefix_type()?);

    let registry = Registry::new();
    registry
        .register(manager)
        .context("failed to register constant-key manager")?;

    // -----------------------------------------------------------------------
    // 4. Keyset handle + AEAD
    // -----------------------------------------------------------------------
    let handle = KeysetHandle::new(&registry, &template).context("failed to build keyset handle")?;
    info!(
        keyset_info = %serde_json::to_string(&handle.keyset_info())?,
        "keyset ready"
    );
    let aead = keyset::aead::new(&registry, &handle).context("failed to build keyset AEAD")?;

    // -----------------------------------------------------------------------
    // 5. Round trip
    // -----------------------------------------------------------------------
    let ad = cfg.associated_data.as_bytes();
    let ct = aead
        .encrypt(cfg.message.as_bytes(), ad)
        .context("encryption failed")?;
    let pt = aead.decrypt(&ct, ad).context("decryption failed")?;
    let env = aead.split(&ct)?;

    println!("Message: {}", cfg.message);
    println!("Key: {key_hex} Cipher text: {}", hex::encode(&ct));
    println!(
        "Prefix: {} IV: {} CT: {}",
        hex::encode(env.prefix),
        hex::encode(env.nonce),
        hex::encode(env.sealed)
    );
    println!("Plain text: {}", String::from_utf8_lossy(&pt));

    // -----------------------------------------------------------------------
    // 6. Independent AES-GCM check
    // -----------------------------------------------------------------------
    println!("Decrypting the cipher text with plain AES-GCM and the key {key_hex}");
    let key = &handle.primary().key_data.value;
    match open_with_ring(key, &env, ad)? {
        Some(raw) => {
            if raw != pt {
                anyhow::bail!("plain AES-GCM recovered a different plaintext");
            }
            println!("Same key, same plaintext: {}", String::from_utf8_lossy(&raw));
        }
        None => warn!(key_len = key.len(), "no independent AES-GCM for this key size; skipped"),
    }

    Ok(())
}

/// Open `env`'s nonce and sealed bytes with ring, ignoring the prefix.
///
/// Returns `Ok(None)` for key sizes ring does not offer (AES-192).
fn open_with_ring(key: &[u8], env: &Envelope<'_>, ad: &[u8]) -> Result<Option<Vec<u8>>> {
    let algorithm = match key.len() {
        16 => &AES_128_GCM,
        32 => &AES_256_GCM,
        _ => return Ok(None),
    };
    let key = UnboundKey::new(algorithm, key).map_err(|_| anyhow!("ring rejected the key"))?;
    let key = LessSafeKey::new(key);
    let nonce = Nonce::try_assume_unique_for_key(env.nonce)
        .map_err(|_| anyhow!("nonce has the wrong length"))?;

    let mut in_out = env.sealed.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::from(ad), &mut in_out)
        .map_err(|_| anyhow!("plain AES-GCM failed to authenticate the envelope"))?;
    Ok(Some(plaintext.to_vec()))
}
