//! Graymark Core - dual-layer visually-bound barcode authentication
//!
//! This crate builds and verifies composite barcodes: two same-size QR
//! module layers, one carrying public data and one carrying a signature,
//! fused into a single four-level grayscale raster. The signature commits
//! to the data layer's rendered module matrix, so the symbol's visual form
//! is part of what gets authenticated.
//!
//! # Features
//!
//! - Composite symbols fusing data and signature layers into one raster
//! - Visual binding through a SHA-256 fingerprint of the module matrix
//! - HMAC-SHA256 and ECDSA P-256 signing behind one scheme interface
//! - Deterministic grayscale clustering to read symbols back from pixels
//! - Secure master-key zeroization on drop
//!
//! # Example
//!
//! ```no_run
//! use graymark_core::{
//!     Generator, KeyMaterial, MasterKey, SignatureScheme, SymbolConfig, Verifier,
//! };
//!
//! # fn example() -> graymark_core::Result<()> {
//! let material = KeyMaterial::Symmetric(MasterKey::generate());
//! let config = SymbolConfig::default();
//!
//! // Create and render a signed composite barcode
//! let generator = Generator::new(SignatureScheme::new(material.clone()), config);
//! let generated = generator.create_barcode("Product-123", "lot 42")?;
//! generator.render_to_file(&generated, "composite.png")?;
//!
//! // Read it back from pixels and verify
//! let (recovered, _matrix) = graymark_core::read_composite_file("composite.png", &config)?
//!     .expect("image should contain a composite symbol");
//! let verifier = Verifier::new(SignatureScheme::new(material), config);
//! assert!(verifier.verify(&recovered)?);
//! # Ok(())
//! # }
//! ```

pub mod barcode;
pub mod cluster;
pub mod composite;
pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
pub mod matrix;
pub mod payload;
pub mod sign;

// Re-export main types for convenience
pub use barcode::AuthenticatedBarcode;
pub use config::{ColorTable, SymbolConfig};
pub use engine::{
    is_composite, read_composite, read_composite_file, read_standard, render_standard_qr,
    GeneratedBarcode, Generator, Verifier,
};
pub use error::{GraymarkError, Result};
pub use keys::{KeyMaterial, KeyStore, MasterKey};
pub use matrix::ModuleMatrix;
pub use payload::Payload;
pub use sign::{matrix_fingerprint, SignatureScheme};

// Forced error-correction level type, re-exported for configuration.
pub use qrcodegen::QrCodeEcc;
