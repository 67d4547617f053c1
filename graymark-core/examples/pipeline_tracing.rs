//! Example demonstrating composite pipeline tracing instrumentation.
//!
//! Run with: cargo run -p graymark-core --example pipeline_tracing

use base64::{engine::general_purpose::STANDARD, Engine as _};
use graymark_core::{
    read_composite, Generator, KeyMaterial, MasterKey, SignatureScheme, SymbolConfig, Verifier,
};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Initialize tracing subscriber with debug level
    fmt()
        .with_env_filter(EnvFilter::new("graymark_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== Composite Pipeline Tracing Demo ===\n");

    let material = KeyMaterial::Symmetric(MasterKey::generate());
    let config = SymbolConfig::default();

    println!("Config: {:?}\n", config);

    let generator = Generator::new(SignatureScheme::new(material.clone()), config);
    let generated = match generator.create_barcode("Demo-0001", "inspection lot 42") {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Failed to create barcode: {}", e);
            return;
        }
    };

    let img = match generator.render(&generated) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Failed to render composite: {}", e);
            return;
        }
    };

    println!("\nReading the raster back from pixels...\n");

    let (recovered, _matrix) = match read_composite(&img, &config) {
        Some(found) => found,
        None => {
            eprintln!("Raster did not decode as a composite symbol");
            return;
        }
    };

    let verifier = Verifier::new(SignatureScheme::new(material), config);
    match verifier.verify(&recovered) {
        Ok(true) => {
            println!("\n✅ Authentic!");
            println!("   Version:   {}", generated.version);
            println!("   Raster:    {}x{} px", img.width(), img.height());
            println!("   Signature: {}", STANDARD.encode(recovered.signature()));
            println!(
                "   Secret:    {}",
                recovered.secret().as_deref().unwrap_or("<none>")
            );
        }
        Ok(false) => {
            println!("\n❌ Signature mismatch");
        }
        Err(e) => {
            println!("\n❌ Failed: {}", e);
        }
    }
}
