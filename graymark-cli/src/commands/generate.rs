//! Generate command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use graymark_core::{render_standard_qr, Generator, SignatureScheme, SymbolConfig};
use tracing::{debug, info};

use crate::utils;

/// Execute the generate command.
pub fn execute(
    data: &str,
    secret: &str,
    output: &Path,
    key: Option<&Path>,
    standard: bool,
    quiet: bool,
) -> Result<()> {
    let material = utils::load_signing_material(key)?;
    let scheme = SignatureScheme::new(material);
    let scheme_name = scheme.name();
    debug!(scheme = scheme_name, "Loaded signing material");

    let config = SymbolConfig::default();
    let generator = Generator::new(scheme, config);
    let generated = generator
        .create_barcode(data, secret)
        .context("Failed to create barcode")?;

    let composite_path = output.join("composite_barcode.png");
    generator
        .render_to_file(&generated, &composite_path)
        .with_context(|| {
            format!(
                "Failed to save composite barcode: {}",
                composite_path.display()
            )
        })?;

    let standard_path = if standard {
        let path = output.join("standard_barcode.png");
        let img = render_standard_qr(data, &config).context("Failed to render standard QR")?;
        img.save(&path)
            .with_context(|| format!("Failed to save standard barcode: {}", path.display()))?;
        info!(path = %path.display(), "Saved standard QR");
        Some(path)
    } else {
        None
    };

    info!(
        version = generated.version,
        signature_len = generated.barcode.signature().len(),
        "Barcode generated"
    );

    // Print success message (user-facing output)
    if !quiet {
        println!();
        println!("{}", "Composite barcode generated!".green().bold());
        println!();
        println!("   {} {}", "Saved:".dimmed(), composite_path.display());
        println!("   {} {}", "Scheme:".dimmed(), scheme_name);
        println!("   {} {}", "QR version:".dimmed(), generated.version);
        println!(
            "   {} {}",
            "Signature:".dimmed(),
            hex::encode(generated.barcode.signature())
        );
        if let Some(path) = standard_path {
            println!("   {} {}", "Standard QR:".dimmed(), path.display());
        }
    }

    Ok(())
}
