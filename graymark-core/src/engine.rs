//! Generation, reading, and verification facades.
//!
//! [`Generator`] turns an identifier and secret into a signed composite
//! raster. [`read_composite`] recovers the barcode from such a raster.
//! [`Verifier`] re-encodes the recovered public data at its own required
//! version and checks the signature against that re-rendered matrix, so it
//! never trusts module bits reconstructed from pixels.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::GrayImage;

use crate::barcode::AuthenticatedBarcode;
use crate::cluster;
use crate::composite;
use crate::config::SymbolConfig;
use crate::error::Result;
use crate::matrix::{self, ModuleMatrix};
use crate::payload::{self, Payload};
use crate::sign::SignatureScheme;

/// Output of [`Generator::create_barcode`]: the signed barcode plus the
/// exact data matrix and version it was signed against.
#[derive(Debug, Clone)]
pub struct GeneratedBarcode {
    pub barcode: AuthenticatedBarcode,
    pub data_matrix: ModuleMatrix,
    pub version: u8,
}

/// Creates signed dual-layer barcodes.
#[derive(Debug, Clone)]
pub struct Generator {
    scheme: SignatureScheme,
    config: SymbolConfig,
}

impl Generator {
    pub fn new(scheme: SignatureScheme, config: SymbolConfig) -> Self {
        Self { scheme, config }
    }

    /// Build and sign a barcode for `identifier` with an optional secret.
    ///
    /// The payload is padded until both layers need the same QR version,
    /// then the padded text is signed bound to its rendered matrix.
    pub fn create_barcode(&self, identifier: &str, secret: &str) -> Result<GeneratedBarcode> {
        let payload = Payload::new(identifier, secret);
        let (padded, version) =
            payload::aligned_public_text(&payload, self.scheme.signature_len(), &self.config)?;
        let data_matrix = matrix::encode_forced(&padded, version, &self.config)?;
        let signature = self.scheme.sign(&padded, &data_matrix)?;

        tracing::info!(
            identifier,
            version,
            scheme = self.scheme.name(),
            "Created signed barcode"
        );
        Ok(GeneratedBarcode {
            barcode: AuthenticatedBarcode::new(padded, signature),
            data_matrix,
            version,
        })
    }

    /// Render the composite grayscale raster for a generated barcode.
    ///
    /// The signature layer is the base64 signature encoded at the same
    /// forced version as the data layer, which is what makes the two
    /// matrices the same size.
    pub fn render(&self, generated: &GeneratedBarcode) -> Result<GrayImage> {
        let signature_b64 = STANDARD.encode(generated.barcode.signature());
        let sig_matrix = matrix::encode_forced(&signature_b64, generated.version, &self.config)?;
        composite::compose(&generated.data_matrix, &sig_matrix, &self.config)
    }

    /// Render the composite raster and write it to `path`, creating parent
    /// directories as needed.
    pub fn render_to_file(&self, generated: &GeneratedBarcode, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let img = self.render(generated)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        img.save(path)?;
        tracing::info!(path = %path.display(), "Saved composite barcode");
        Ok(())
    }
}

/// Verifies recovered barcodes against loaded key material.
#[derive(Debug, Clone)]
pub struct Verifier {
    scheme: SignatureScheme,
    config: SymbolConfig,
}

impl Verifier {
    pub fn new(scheme: SignatureScheme, config: SymbolConfig) -> Self {
        Self { scheme, config }
    }

    /// Check a barcode's signature against the matrix its public data
    /// re-encodes to.
    ///
    /// The required version is derived from the public data itself; the
    /// generator's padding guarantees this matches the version it signed.
    pub fn verify(&self, barcode: &AuthenticatedBarcode) -> Result<bool> {
        let public_data = barcode.public_data();
        let version = matrix::required_version(public_data, &self.config)?;
        let data_matrix = matrix::encode_forced(public_data, version, &self.config)?;

        let authentic = self
            .scheme
            .verify(public_data, &data_matrix, barcode.signature())?;
        if authentic {
            tracing::info!(version, "Barcode is authentic");
        } else {
            tracing::warn!(version, "Signature mismatch, barcode is not authentic");
        }
        Ok(authentic)
    }
}

/// Recover a barcode and its reconstructed data matrix from a composite
/// raster.
///
/// Returns `None` when the image does not decode as a dual-layer symbol:
/// color centers cannot be recovered, either layer fails QR decoding, or
/// the signature layer is not valid base64.
pub fn read_composite(
    img: &GrayImage,
    config: &SymbolConfig,
) -> Option<(AuthenticatedBarcode, ModuleMatrix)> {
    let centers = cluster::find_color_centers(img, config)?;
    let (data_matrix, sig_matrix) = composite::split_layers(img, &centers, config);

    let Some(public_data) = decode_layer(&data_matrix, config) else {
        tracing::warn!("Data layer did not decode");
        return None;
    };
    let Some(signature_b64) = decode_layer(&sig_matrix, config) else {
        tracing::warn!("Signature layer did not decode");
        return None;
    };
    let Ok(signature) = STANDARD.decode(&signature_b64) else {
        tracing::warn!("Signature layer is not valid base64");
        return None;
    };

    tracing::debug!(
        data_len = public_data.len(),
        signature_len = signature.len(),
        "Recovered dual-layer barcode"
    );
    Some((AuthenticatedBarcode::new(public_data, signature), data_matrix))
}

/// [`read_composite`] over an image file.
///
/// I/O and image decoding problems are errors; an image that simply does
/// not contain a readable composite symbol is `Ok(None)`.
pub fn read_composite_file(
    path: impl AsRef<Path>,
    config: &SymbolConfig,
) -> Result<Option<(AuthenticatedBarcode, ModuleMatrix)>> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Reading composite barcode");
    let img = image::open(path)?.to_luma8();
    Ok(read_composite(&img, config))
}

/// Decode one reconstructed layer as a QR symbol.
fn decode_layer(matrix: &ModuleMatrix, config: &SymbolConfig) -> Option<String> {
    let img = matrix.to_layer_image(config.scale);
    let mut prepared = rqrr::PreparedImage::prepare(img);
    let grids = prepared.detect_grids();
    let (_meta, content) = grids.first()?.decode().ok()?;
    Some(content)
}

/// Render `text` as a plain black-and-white QR raster.
pub fn render_standard_qr(text: &str, config: &SymbolConfig) -> Result<GrayImage> {
    let version = matrix::required_version(text, config)?;
    let matrix = matrix::encode_forced(text, version, config)?;
    Ok(matrix.to_layer_image(config.scale))
}

/// Decode a plain QR raster.
pub fn read_standard(img: &GrayImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare(img.clone());
    let grids = prepared.detect_grids();
    let (_meta, content) = grids.first()?.decode().ok()?;
    Some(content)
}

/// Whether an image carries more than two distinct gray levels.
///
/// Plain QR symbols are two-level; anything beyond that is treated as a
/// composite candidate.
pub fn is_composite(img: &GrayImage) -> bool {
    let mut seen = [false; 256];
    let mut distinct = 0usize;
    for pixel in img.pixels() {
        let v = pixel.0[0] as usize;
        if !seen[v] {
            seen[v] = true;
            distinct += 1;
            if distinct > 2 {
                return true;
            }
        }
    }
    false
}
