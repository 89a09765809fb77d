//! Stable glyph identity across re-segmentation passes
//!
//! Repeated translation may regroup pixels into new glyph objects. The
//! signature is a pure function of normalized geometric features, so the same
//! physical ink keeps the same signature whatever its current object identity.

/// Disambiguating signature derived from normalized geometric features
///
/// Dimensions are quantized to hundredths of an interline, which absorbs
/// rounding jitter between segmentation passes while keeping distinct glyphs
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphSignature {
    weight: usize,
    width: i32,
    height: i32,
}

impl GlyphSignature {
    /// Build a signature from weight and interline-normalized dimensions
    pub fn new(weight: usize, normalized_width: f64, normalized_height: f64) -> Self {
        Self {
            weight,
            width: (normalized_width * 100.0).round() as i32,
            height: (normalized_height * 100.0).round() as i32,
        }
    }

    /// Foreground pixel count the signature was derived from
    pub const fn weight(&self) -> usize {
        self.weight
    }
}
