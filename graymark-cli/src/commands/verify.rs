//! Verify command implementation.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use graymark_core::{read_composite_file, AuthenticatedBarcode, SignatureScheme, SymbolConfig, Verifier};
use tracing::{debug, info};

use crate::utils;

/// Execute the verify command.
pub fn execute(image: &Path, key: Option<&Path>, quiet: bool) -> Result<()> {
    let config = SymbolConfig::default();
    let decoded = read_composite_file(image, &config)
        .with_context(|| format!("Failed to read image: {}", image.display()))?;
    let Some((barcode, _matrix)) = decoded else {
        bail!("Failed to decode composite barcode from {}", image.display());
    };

    debug!(
        data_len = barcode.public_data().len(),
        signature_len = barcode.signature().len(),
        "Decoded composite barcode"
    );

    let material = utils::load_verifying_material(key)?;
    let verifier = Verifier::new(SignatureScheme::new(material), config);
    let authentic = verifier.verify(&barcode)?;

    if authentic {
        info!("Barcode verified as authentic");
        if !quiet {
            println!();
            println!("{}", "╔════════════════════════════════════════╗".green());
            println!(
                "{}",
                "║              AUTHENTIC                 ║".green().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".green());
            println!();
            print_payload(&barcode, true);
        }
        Ok(())
    } else {
        if !quiet {
            println!();
            println!("{}", "╔════════════════════════════════════════╗".red());
            println!(
                "{}",
                "║             NOT AUTHENTIC              ║".red().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".red());
            println!();
            print_payload(&barcode, false);
        }
        bail!("Barcode is NOT authentic")
    }
}

/// Show the decoded payload; the secret only accompanies an authentic
/// result.
fn print_payload(barcode: &AuthenticatedBarcode, include_secret: bool) {
    match barcode.identifier() {
        Some(identifier) => println!("   {} {}", "Public data:".dimmed(), identifier),
        None => println!("   {} {}", "Public data:".dimmed(), barcode.public_data()),
    }
    if include_secret {
        if let Some(secret) = barcode.secret() {
            if !secret.is_empty() {
                println!("   {} {}", "Secret message:".dimmed(), secret);
            }
        }
    }
}
