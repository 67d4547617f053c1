//! Fusing two module layers into one grayscale raster, and splitting a
//! raster back into layers.
//!
//! Each module becomes a `scale`-by-`scale` pixel block whose gray level is
//! chosen by the (data, signature) bit pair. Splitting reverses this with a
//! per-module median intensity classified against the four color centers
//! recovered by [`crate::cluster`].

use image::{GrayImage, Luma};

use crate::cluster;
use crate::config::{ColorTable, SymbolConfig};
use crate::error::{GraymarkError, Result};
use crate::matrix::ModuleMatrix;

/// Fuse the data and signature layers into a 4-level grayscale image.
///
/// Both layers must have identical dimensions; the engine guarantees this by
/// encoding them at the same version.
pub fn compose(data: &ModuleMatrix, sig: &ModuleMatrix, config: &SymbolConfig) -> Result<GrayImage> {
    if data.dims() != sig.dims() {
        return Err(GraymarkError::LayerMismatch {
            data_h: data.height(),
            data_w: data.width(),
            sig_h: sig.height(),
            sig_w: sig.width(),
        });
    }

    let scale = config.scale;
    let width = data.width() as u32 * scale;
    let height = data.height() as u32 * scale;

    let img = GrayImage::from_fn(width, height, |x, y| {
        let row = (y / scale) as usize;
        let col = (x / scale) as usize;
        Luma([config.colors.level_for(data.get(row, col), sig.get(row, col))])
    });

    tracing::debug!(
        modules = data.width(),
        px = width,
        "Composed dual-layer raster"
    );
    Ok(img)
}

/// Median gray level of the pixel block covering module `(row, col)`.
///
/// Even sample counts take the mean of the two middle values, matching the
/// usual statistical median.
pub(crate) fn module_median(img: &GrayImage, row: usize, col: usize, scale: u32) -> f32 {
    let x0 = col as u32 * scale;
    let y0 = row as u32 * scale;
    let mut samples: Vec<f32> = (y0..y0 + scale)
        .flat_map(|y| (x0..x0 + scale).map(move |x| (x, y)))
        .map(|(x, y)| img.get_pixel(x, y).0[0] as f32)
        .collect();
    samples.sort_by(f32::total_cmp);

    let n = samples.len();
    if n % 2 == 1 {
        samples[n / 2]
    } else {
        (samples[n / 2 - 1] + samples[n / 2]) / 2.0
    }
}

/// Rebuild the two boolean layers from a composite raster.
///
/// The module grid is inferred from the image dimensions and the configured
/// scale; trailing pixels that do not fill a whole module are ignored.
pub fn split_layers(
    img: &GrayImage,
    centers: &[f32; 4],
    config: &SymbolConfig,
) -> (ModuleMatrix, ModuleMatrix) {
    let scale = config.scale;
    let out_h = (img.height() / scale) as usize;
    let out_w = (img.width() / scale) as usize;

    let mut data = ModuleMatrix::new(out_h, out_w);
    let mut sig = ModuleMatrix::new(out_h, out_w);

    for row in 0..out_h {
        for col in 0..out_w {
            let median = module_median(img, row, col, scale);
            let rank = cluster::nearest_center(centers, median);
            let (data_bit, sig_bit) = ColorTable::bits_for_rank(rank);
            data.set(row, col, data_bit);
            sig.set(row, col, sig_bit);
        }
    }

    (data, sig)
}
