//! Universal read command implementation.
//!
//! Reads any barcode image: composite symbols get their layers split and,
//! when key material is available, verified; plain two-level symbols are
//! decoded as standard QR codes. Unlike `verify`, an inauthentic result is
//! reported but does not fail the command.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use graymark_core::{
    is_composite, read_composite, read_standard, AuthenticatedBarcode, SignatureScheme,
    SymbolConfig, Verifier,
};
use tracing::{debug, info, warn};

use crate::utils;

/// Execute the read command.
pub fn execute(image: &Path, key: Option<&Path>, quiet: bool) -> Result<()> {
    let img = image::open(image)
        .with_context(|| format!("Failed to read image: {}", image.display()))?
        .to_luma8();

    let config = SymbolConfig::default();
    if is_composite(&img) {
        debug!("More than two gray levels, treating as composite");
        if !quiet {
            println!("Detected composite barcode, decoding layers...");
        }

        let Some((barcode, _matrix)) = read_composite(&img, &config) else {
            bail!(
                "Failed to decode composite barcode from {}",
                image.display()
            );
        };

        match utils::load_verifying_material(key) {
            Ok(material) => {
                let verifier = Verifier::new(SignatureScheme::new(material), config);
                let authentic = verifier.verify(&barcode)?;
                if !quiet {
                    println!();
                    if authentic {
                        println!("{}", "Composite barcode AUTHENTICATED".green().bold());
                    } else {
                        println!(
                            "{}",
                            "Composite barcode is NOT authentic (or key mismatch)"
                                .red()
                                .bold()
                        );
                    }
                    print_payload(&barcode, authentic);
                }
            }
            Err(err) if key.is_none() => {
                warn!(error = %err, "No key material available, skipping verification");
                if !quiet {
                    println!();
                    println!(
                        "{}",
                        "Composite barcode decoded, authenticity not checked (no key)"
                            .yellow()
                            .bold()
                    );
                    print_payload(&barcode, false);
                }
            }
            Err(err) => return Err(err),
        }
    } else {
        debug!("Two gray levels, treating as standard");
        if !quiet {
            println!("Detected standard barcode, decoding...");
        }
        match read_standard(&img) {
            Some(content) => {
                info!(len = content.len(), "Decoded standard barcode");
                if !quiet {
                    println!();
                    println!("{}", "Standard barcode detected".green().bold());
                    println!("   {} {}", "Data:".dimmed(), content);
                }
            }
            None => bail!("No barcode found in {}", image.display()),
        }
    }

    Ok(())
}

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
