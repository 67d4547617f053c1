//! Module matrices and the QR engine wrapper.
//!
//! A [`ModuleMatrix`] is the bool grid of one barcode layer, quiet zone
//! included. The wrapper functions pin down the engine parameters the rest of
//! the crate depends on: the version is forced (never fitted), the
//! error-correction level and mask come from the shared [`SymbolConfig`], and
//! ECC boosting stays off so a re-encode of the same text is bit-identical.

use qrcodegen::{Mask, QrCode, QrSegment, Version};

use crate::config::SymbolConfig;
use crate::error::{GraymarkError, Result};

/// Bool grid of one symbol layer, row-major, quiet zone included.
///
/// `true` is a dark module. Both layers of one composite barcode always share
/// identical dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    height: usize,
    width: usize,
    bits: Vec<bool>,
}

impl ModuleMatrix {
    /// All-light matrix of the given dimensions.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            bits: vec![false; height * width],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// (height, width) in modules.
    pub fn dims(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, dark: bool) {
        self.bits[row * self.width + col] = dark;
    }

    /// Canonical byte serialization used for fingerprinting.
    ///
    /// Row-major, one byte per module, `0x01` dark / `0x00` light. The layout
    /// must be identical at sign and verify time.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        self.bits.iter().map(|&dark| dark as u8).collect()
    }

    /// Render the layer as a flat black/white image, one module per
    /// `scale x scale` block, for the symbol reader.
    pub fn to_layer_image(&self, scale: u32) -> image::GrayImage {
        let w = self.width as u32 * scale;
        let h = self.height as u32 * scale;
        image::GrayImage::from_fn(w, h, |x, y| {
            let dark = self.get((y / scale) as usize, (x / scale) as usize);
            image::Luma([if dark { 0u8 } else { 255u8 }])
        })
    }
}

/// Convert an engine symbol into a bordered module matrix.
fn with_quiet_zone(qr: &QrCode, quiet_zone: usize) -> ModuleMatrix {
    let size = qr.size() as usize;
    let dim = size + 2 * quiet_zone;
    let mut matrix = ModuleMatrix::new(dim, dim);
    for y in 0..size {
        for x in 0..size {
            // qrcodegen addresses modules as (x, y) = (column, row).
            matrix.set(y + quiet_zone, x + quiet_zone, qr.get_module(x as i32, y as i32));
        }
    }
    matrix
}

fn encode_in_range(text: &str, min: Version, max: Version, config: &SymbolConfig) -> Result<QrCode> {
    let segments = QrSegment::make_segments(text);
    QrCode::encode_segments_advanced(
        &segments,
        config.ec_level,
        min,
        max,
        Some(Mask::new(config.mask)),
        false,
    )
    .map_err(|e| GraymarkError::PayloadTooLarge(e.to_string()))
}

/// Smallest version that holds `text` at the forced error-correction level.
pub fn required_version(text: &str, config: &SymbolConfig) -> Result<u8> {
    let qr = encode_in_range(text, Version::MIN, Version::MAX, config)?;
    Ok(qr.version().value())
}

/// Encode `text` at exactly `version` under the forced parameters.
///
/// The returned matrix carries the configured quiet zone; its dimensions are
/// `17 + 4 * version + 2 * quiet_zone` on each side.
pub fn encode_forced(text: &str, version: u8, config: &SymbolConfig) -> Result<ModuleMatrix> {
    let forced = Version::new(version);
    let qr = encode_in_range(text, forced, forced, config)?;
    Ok(with_quiet_zone(&qr, config.quiet_zone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_version_short_text() {
        let config = SymbolConfig::default();
        assert_eq!(required_version("Short data", &config).unwrap(), 1);
    }

    #[test]
    fn test_required_version_grows_with_text() {
        let config = SymbolConfig::default();
        let small = required_version("abc", &config).unwrap();
        let large = required_version(&"abc".repeat(40), &config).unwrap();
        assert!(small < large);
    }

    #[test]
    fn test_encode_forced_dimensions() {
        let config = SymbolConfig::default();
        for version in [1u8, 3, 6] {
            let matrix = encode_forced("hello", version, &config).unwrap();
            let expected = 17 + 4 * version as usize + 2 * config.quiet_zone;
            assert_eq!(matrix.dims(), (expected, expected));
        }
    }

    #[test]
    fn test_quiet_zone_is_light() {
        let config = SymbolConfig::default();
        let matrix = encode_forced("hello", 2, &config).unwrap();
        let (h, w) = matrix.dims();
        for i in 0..w {
            assert!(!matrix.get(0, i));
            assert!(!matrix.get(h - 1, i));
        }
        for i in 0..h {
            assert!(!matrix.get(i, 0));
            assert!(!matrix.get(i, w - 1));
        }
        // Finder pattern corner sits just inside the quiet zone.
        assert!(matrix.get(config.quiet_zone, config.quiet_zone));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let config = SymbolConfig::default();
        let a = encode_forced("same input", 3, &config).unwrap();
        let b = encode_forced("same input", 3, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_canonical_bytes_layout() {
        let mut matrix = ModuleMatrix::new(2, 3);
        matrix.set(0, 1, true);
        matrix.set(1, 2, true);
        assert_eq!(matrix.to_canonical_bytes(), vec![0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_layer_image_scaling() {
        let mut matrix = ModuleMatrix::new(2, 2);
        matrix.set(0, 0, true);
        let img = matrix.to_layer_image(3);
        assert_eq!(img.dimensions(), (6, 6));
        assert_eq!(img.get_pixel(1, 1).0[0], 0);
        assert_eq!(img.get_pixel(4, 4).0[0], 255);
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let config = SymbolConfig::default();
        let huge = "x".repeat(5000);
        assert!(matches!(
            required_version(&huge, &config),
            Err(GraymarkError::PayloadTooLarge(_))
        ));
    }
}
