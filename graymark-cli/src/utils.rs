//! Common helpers shared across CLI commands.

use std::path::Path;

use anyhow::{bail, Context, Result};
use graymark_core::{KeyMaterial, KeyStore};

/// Default key store directory, relative to the working directory.
pub const DEFAULT_KEY_DIR: &str = "keys";

/// Load signing-capable key material.
///
/// With an explicit key file the material must hold private key bytes.
/// Without one, the default store is used and a symmetric master key is
/// created on first use.
pub fn load_signing_material(key: Option<&Path>) -> Result<KeyMaterial> {
    match key {
        Some(path) => {
            let material = KeyMaterial::load(path)
                .with_context(|| format!("Failed to read key file: {}", path.display()))?;
            if !material.can_sign() {
                bail!(
                    "{} holds a public key; generating needs the private key",
                    path.display()
                );
            }
            Ok(material)
        }
        None => {
            let store = KeyStore::new(DEFAULT_KEY_DIR);
            let master = store
                .load_or_create_master()
                .context("Failed to prepare default key store")?;
            Ok(KeyMaterial::Symmetric(master))
        }
    }
}

/// Load verification key material. Never creates keys.
pub fn load_verifying_material(key: Option<&Path>) -> Result<KeyMaterial> {
    match key {
        Some(path) => KeyMaterial::load(path)
            .with_context(|| format!("Failed to read key file: {}", path.display())),
        None => {
            let store = KeyStore::new(DEFAULT_KEY_DIR);
            let master = store.load_master().with_context(|| {
                format!(
                    "Failed to read key file: no key at {} (pass --key or run keygen)",
                    store.symmetric_key_path().display()
                )
            })?;
            Ok(KeyMaterial::Symmetric(master))
        }
    }
}
