//! Keygen command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use graymark_core::KeyStore;
use tracing::info;

use crate::KeyScheme;

/// Execute the keygen command.
pub fn execute(dir: &Path, scheme: KeyScheme, force: bool, quiet: bool) -> Result<()> {
    let store = KeyStore::new(dir);
    match scheme {
        KeyScheme::Ecdsa => {
            let (private_path, public_path) = store
                .generate_keypair(force)
                .context("Failed to generate key pair")?;
            info!(dir = %dir.display(), "Generated ECDSA P-256 key pair");

            if !quiet {
                println!();
                println!("{}", "ECDSA P-256 key pair generated!".green().bold());
                println!();
                println!("   {} {}", "Private key:".dimmed(), private_path.display());
                println!("   {} {}", "Public key:".dimmed(), public_path.display());
                println!();
                println!("   Keep the private key secret; share the public key with verifiers.");
            }
        }
        KeyScheme::Hmac => {
            let path = store
                .generate_master(force)
                .context("Failed to generate master key")?;
            info!(path = %path.display(), "Generated symmetric master key");

            if !quiet {
                println!();
                println!("{}", "Symmetric master key generated!".green().bold());
                println!();
                println!("   {} {}", "Key file:".dimmed(), path.display());
            }
        }
    }
    Ok(())
}
