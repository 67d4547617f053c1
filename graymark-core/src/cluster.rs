//! Grayscale intensity clustering for layer recovery.
//!
//! A scanned composite never comes back with the exact palette it was
//! printed with, so the reader recovers the four gray levels from the image
//! itself: module medians are sampled on a sparse grid and clustered with a
//! deterministic 1-D Lloyd iteration seeded by evenly spaced centers over
//! the observed intensity range. No RNG is involved, so the same image
//! always yields the same centers.

use image::GrayImage;

use crate::composite;
use crate::config::SymbolConfig;

/// Number of gray levels in a composite symbol.
pub const NUM_LEVELS: usize = 4;

const MAX_ITERATIONS: usize = 50;
const CONVERGENCE_TOL: f32 = 1.0;
/// Minimum spacing between adjacent centers; anything tighter means the
/// image does not actually carry four levels.
const MIN_SEPARATION: f32 = 1.0;

/// Recover the four color centers from a composite image, sorted darkest
/// to brightest.
///
/// Samples every other module row and column. Returns `None` when there are
/// fewer samples than clusters or when the clusters collapse, which is what
/// happens on monochrome or plain two-level input.
pub fn find_color_centers(img: &GrayImage, config: &SymbolConfig) -> Option<[f32; NUM_LEVELS]> {
    let scale = config.scale;
    let out_h = (img.height() / scale) as usize;
    let out_w = (img.width() / scale) as usize;

    let mut samples = Vec::with_capacity(out_h.div_ceil(2) * out_w.div_ceil(2));
    for row in (0..out_h).step_by(2) {
        for col in (0..out_w).step_by(2) {
            samples.push(composite::module_median(img, row, col, scale));
        }
    }

    if samples.len() < NUM_LEVELS {
        tracing::warn!(samples = samples.len(), "Too few module samples to cluster");
        return None;
    }

    let centers = lloyd_1d(&samples)?;
    tracing::info!(
        centers = ?centers.map(|c| c.round() as i32),
        "Recovered color centers"
    );
    Some(centers)
}

/// One-dimensional Lloyd k-means with deterministic seeding.
///
/// Centers start evenly spaced across `[min, max]` of the samples. Empty
/// clusters keep their previous center. Returns `None` when any two
/// adjacent final centers sit closer than [`MIN_SEPARATION`].
fn lloyd_1d(samples: &[f32]) -> Option<[f32; NUM_LEVELS]> {
    let min = samples.iter().copied().fold(f32::INFINITY, f32::min);
    let max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut centers = [0f32; NUM_LEVELS];
    for (i, center) in centers.iter_mut().enumerate() {
        *center = min + (max - min) * i as f32 / (NUM_LEVELS - 1) as f32;
    }

    for _ in 0..MAX_ITERATIONS {
        let mut sums = [0f32; NUM_LEVELS];
        let mut counts = [0usize; NUM_LEVELS];
        for &sample in samples {
            let idx = nearest_center(&centers, sample);
            sums[idx] += sample;
            counts[idx] += 1;
        }

        let mut moved = 0f32;
        for i in 0..NUM_LEVELS {
            if counts[i] == 0 {
                continue;
            }
            let next = sums[i] / counts[i] as f32;
            moved = moved.max((next - centers[i]).abs());
            centers[i] = next;
        }
        if moved < CONVERGENCE_TOL {
            break;
        }
    }

    centers.sort_by(f32::total_cmp);
    if centers.windows(2).any(|pair| pair[1] - pair[0] < MIN_SEPARATION) {
        tracing::warn!(?centers, "Color centers collapsed");
        return None;
    }
    Some(centers)
}

/// Index of the center nearest to `value`; ties go to the lower (darker)
/// index.
pub(crate) fn nearest_center(centers: &[f32; NUM_LEVELS], value: f32) -> usize {
    let mut best = 0;
    let mut best_dist = (value - centers[0]).abs();
    for (i, &center) in centers.iter().enumerate().skip(1) {
        let dist = (value - center).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::compose;
    use crate::matrix::ModuleMatrix;
    use image::{GrayImage, Luma};

    #[test]
    fn test_nearest_center_tie_prefers_darker() {
        let centers = [0.0, 100.0, 200.0, 255.0];
        // 50 is equidistant from 0 and 100.
        assert_eq!(nearest_center(&centers, 50.0), 0);
        assert_eq!(nearest_center(&centers, 51.0), 1);
        assert_eq!(nearest_center(&centers, 250.0), 3);
    }

    #[test]
    fn test_lloyd_recovers_jittered_levels() {
        let mut samples = Vec::new();
        for level in [10.0f32, 90.0, 166.0, 250.0] {
            for jitter in [-10.0f32, -5.0, 0.0, 5.0, 10.0] {
                samples.push(level + jitter);
            }
        }
        let centers = lloyd_1d(&samples).unwrap();
        for (center, level) in centers.iter().zip([10.0f32, 90.0, 166.0, 250.0]) {
            assert!(
                (center - level).abs() <= 5.0,
                "center {center} too far from level {level}"
            );
        }
    }

    #[test]
    fn test_lloyd_collapses_on_uniform_samples() {
        assert!(lloyd_1d(&[128.0; 40]).is_none());
    }

    #[test]
    fn test_monochrome_image_yields_no_centers() {
        let img = GrayImage::from_pixel(80, 80, Luma([200u8]));
        let config = SymbolConfig::default();
        assert!(find_color_centers(&img, &config).is_none());
    }

    #[test]
    fn test_tiny_image_yields_no_centers() {
        // One module sampled is below the cluster count.
        let img = GrayImage::from_pixel(20, 20, Luma([0u8]));
        let config = SymbolConfig::default();
        assert!(find_color_centers(&img, &config).is_none());
    }

    #[test]
    fn test_centers_found_on_clean_composite() {
        // 4x4 module grid whose sampled positions cover all four levels.
        let mut data = ModuleMatrix::new(4, 4);
        let mut sig = ModuleMatrix::new(4, 4);
        data.set(0, 0, true);
        sig.set(0, 0, true); // black at sampled (0,0)
        data.set(0, 2, true); // light gray at sampled (0,2)
        sig.set(2, 0, true); // dark gray at sampled (2,0)
        // sampled (2,2) stays white

        let config = SymbolConfig::default().with_scale(4);
        let img = compose(&data, &sig, &config).unwrap();
        let centers = find_color_centers(&img, &config).unwrap();
        assert_eq!(centers, [0.0, 90.0, 166.0, 255.0]);
    }
}
