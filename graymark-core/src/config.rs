//! Shared symbol configuration.
//!
//! Both layers of a composite barcode must be produced and read back under
//! byte-for-byte identical parameters: error-correction level, mask pattern,
//! quiet zone, module scale, and the gray-level table. The whole set travels
//! as one immutable [`SymbolConfig`] value threaded explicitly through every
//! encode and decode call instead of living in per-component constants.

use qrcodegen::QrCodeEcc;

/// Gray levels for the four (data_bit, sig_bit) combinations.
///
/// The table must be strictly ordered dark-to-light as
/// `black < dark < light < white`, or the rank-based inverse mapping at
/// decode time swaps layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTable {
    /// (data = 0, sig = 0)
    pub white: u8,
    /// (data = 1, sig = 0)
    pub light: u8,
    /// (data = 0, sig = 1)
    pub dark: u8,
    /// (data = 1, sig = 1)
    pub black: u8,
}

impl ColorTable {
    /// Gray level for one module given both layer bits.
    pub fn level_for(&self, data: bool, sig: bool) -> u8 {
        match (data, sig) {
            (false, false) => self.white,
            (true, false) => self.light,
            (false, true) => self.dark,
            (true, true) => self.black,
        }
    }

    /// Inverse mapping: layer bits for a classification rank, darkest first.
    ///
    /// Rank 0 is the darkest cluster center, rank 3 the brightest. The order
    /// mirrors [`ColorTable::level_for`] exactly: 0 -> (1,1), 1 -> (0,1),
    /// 2 -> (1,0), 3 -> (0,0).
    pub fn bits_for_rank(rank: usize) -> (bool, bool) {
        match rank {
            0 => (true, true),
            1 => (false, true),
            2 => (true, false),
            _ => (false, false),
        }
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            white: 255,
            light: 166,
            dark: 90,
            black: 0,
        }
    }
}

/// Forced symbol parameters shared by the generator and the verifier.
#[derive(Debug, Clone, Copy)]
pub struct SymbolConfig {
    /// Error-correction level forced for both layers.
    pub ec_level: QrCodeEcc,
    /// Mask pattern forced for both layers. Must be in 0..=7; the QR
    /// engine rejects anything else.
    pub mask: u8,
    /// Quiet-zone width in modules on each side.
    pub quiet_zone: usize,
    /// Edge length of one rendered module in pixels. Must be at least 1;
    /// the read path divides pixel dimensions by this.
    pub scale: u32,
    /// Gray-level table for the composite raster.
    pub colors: ColorTable,
}

impl SymbolConfig {
    /// Replace the module scale, keeping everything else forced.
    ///
    /// Values below 1 are raised to 1.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            ec_level: QrCodeEcc::Medium,
            mask: 0,
            quiet_zone: 4,
            scale: 10,
            colors: ColorTable::default(),
        }
    }
}
