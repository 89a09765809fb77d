//! Read-only pixel access over a binarized page image
//!
//! The raster is the boundary with the acquisition/preprocessing pipeline:
//! interpretation only ever reads intensities and foreground tests from it.

use std::path::Path;

use ndarray::Array2;
use num_traits::ToPrimitive;

use crate::io::configuration::{BACKGROUND, FOREGROUND_THRESHOLD};
use crate::io::error::{OmrError, Result};

/// Read-only pixel access with a foreground threshold
///
/// Implementations must be safe for concurrent read-only access: feature
/// extraction may probe the raster from several systems at once.
pub trait PixelSource: Sync {
    /// Width of the raster in pixels
    fn width(&self) -> usize;

    /// Height of the raster in pixels
    fn height(&self) -> usize;

    /// Intensity at the given position, 0 (black) to 255 (white)
    ///
    /// Out-of-bounds positions read as background.
    fn intensity(&self, x: usize, y: usize) -> u8;

    /// Intensities at or below this value are foreground
    fn foreground_threshold(&self) -> u8;

    /// Foreground test at the given position
    fn is_foreground(&self, x: usize, y: usize) -> bool {
        self.intensity(x, y) <= self.foreground_threshold()
    }
}

/// Plain rectangular intensity buffer
///
/// An efficient [`PixelSource`] both for writing (by the segmentation
/// collaborator and by tests) and for reading.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    data: Array2<u8>,
    threshold: u8,
}

impl PixelBuffer {
    /// Create a background-filled buffer of the given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: Array2::from_elem((height, width), BACKGROUND),
            threshold: FOREGROUND_THRESHOLD,
        }
    }

    /// Load a page image from a PNG file, converted to 8-bit grayscale
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a valid image.
    pub fn from_png_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let img = image::open(&path_buf).map_err(|e| OmrError::ImageLoad {
            path: path_buf,
            source: e,
        })?;
        let luma = img.to_luma8();

        let (width, height) = (luma.width() as usize, luma.height() as usize);
        let mut buffer = Self::new(width, height);
        for (x, y, pixel) in luma.enumerate_pixels() {
            buffer.set_pixel(x as usize, y as usize, pixel.0.first().copied().unwrap_or(0));
        }
        Ok(buffer)
    }

    /// Build a buffer from a generic numeric sample grid
    ///
    /// Samples are clamped into the 0..=255 intensity range; rows map to the
    /// vertical axis as in the backing array.
    pub fn from_samples<T: ToPrimitive>(samples: &Array2<T>) -> Self {
        let (height, width) = samples.dim();
        let mut buffer = Self::new(width, height);
        for ((row, col), sample) in samples.indexed_iter() {
            let value = sample.to_i64().unwrap_or(i64::from(BACKGROUND));
            buffer.set_pixel(col, row, value.clamp(0, 255) as u8);
        }
        buffer
    }

    /// Write one intensity value; positions outside the buffer are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        if let Some(cell) = self.data.get_mut((y, x)) {
            *cell = value;
        }
    }

    /// Override the foreground threshold
    pub const fn set_foreground_threshold(&mut self, threshold: u8) {
        self.threshold = threshold;
    }

    /// Stamp a filled rectangle of foreground pixels
    ///
    /// Convenience for building synthetic pages in tests and demos.
    pub fn fill_rect(&mut self, min: [i32; 2], max: [i32; 2]) {
        for y in min[1]..=max[1] {
            for x in min[0]..=max[0] {
                if x >= 0 && y >= 0 {
                    self.set_pixel(x as usize, y as usize, 0);
                }
            }
        }
    }
}

impl PixelSource for PixelBuffer {
    fn width(&self) -> usize {
        self.data.ncols()
    }

    fn height(&self) -> usize {
        self.data.nrows()
    }

    fn intensity(&self, x: usize, y: usize) -> u8 {
        self.data.get((y, x)).copied().unwrap_or(BACKGROUND)
    }

    fn foreground_threshold(&self) -> u8 {
        self.threshold
    }
}

/// Collect the foreground points of a raster region, in absolute coordinates
///
/// This is the bridge used when a glyph is (re)built from a raster area, e.g.
/// when segmentation hands over a region instead of an explicit point list.
pub fn foreground_points<S: PixelSource + ?Sized>(
    source: &S,
    min: [i32; 2],
    max: [i32; 2],
) -> Vec<[i32; 2]> {
    let mut points = Vec::new();
    for y in min[1].max(0)..=max[1] {
        for x in min[0].max(0)..=max[0] {
            if source.is_foreground(x as usize, y as usize) {
                points.push([x, y]);
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_initialization() {
        let buffer = PixelBuffer::new(4, 3);
        assert_eq!(buffer.width(), 4);
        assert_eq!(buffer.height(), 3);
        assert!(!buffer.is_foreground(0, 0));
        assert_eq!(buffer.intensity(3, 2), BACKGROUND);
    }

    #[test]
    fn test_out_of_bounds_reads_background() {
        let buffer = PixelBuffer::new(2, 2);
        assert_eq!(buffer.intensity(99, 99), BACKGROUND);
        assert!(!buffer.is_foreground(99, 99));
    }

    #[test]
    fn test_foreground_points_of_region() {
        let mut buffer = PixelBuffer::new(8, 8);
        buffer.fill_rect([2, 2], [3, 3]);
        let points = foreground_points(&buffer, [0, 0], [7, 7]);
        assert_eq!(points, vec![[2, 2], [3, 2], [2, 3], [3, 3]]);
    }

    #[test]
    fn test_from_samples_clamps() {
        let samples = ndarray::arr2(&[[-10i64, 0], [300, 128]]);
        let buffer = PixelBuffer::from_samples(&samples);
        assert_eq!(buffer.intensity(0, 0), 0);
        assert_eq!(buffer.intensity(0, 1), 255);
        assert_eq!(buffer.intensity(1, 1), 128);
    }
}
