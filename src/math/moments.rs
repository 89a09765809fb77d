//! Statistical shape moments of a pixel cloud
//!
//! Central moments are normalized by pixel weight and by powers of the
//! interline, so values are comparable between glyphs of different staves
//! and different scan resolutions.

/// Central shape moments up to order three, interline-normalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricMoments {
    /// Mass center abscissa
    pub mean_x: f64,
    /// Mass center ordinate
    pub mean_y: f64,
    /// Normalized second-order moment in x
    pub n20: f64,
    /// Normalized second-order cross moment
    pub n11: f64,
    /// Normalized second-order moment in y
    pub n02: f64,
    /// Normalized third-order moment in x
    pub n30: f64,
    /// Normalized third-order mixed moment (x squared, y)
    pub n21: f64,
    /// Normalized third-order mixed moment (x, y squared)
    pub n12: f64,
    /// Normalized third-order moment in y
    pub n03: f64,
}

impl GeometricMoments {
    /// Compute moments of a non-empty point cloud
    ///
    /// Returns `None` for an empty cloud or a non-positive interline.
    pub fn compute(points: &[[i32; 2]], interline: u32) -> Option<Self> {
        if points.is_empty() || interline == 0 {
            return None;
        }

        let weight = points.len() as f64;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        for &[x, y] in points {
            sum_x += f64::from(x);
            sum_y += f64::from(y);
        }
        let mean_x = sum_x / weight;
        let mean_y = sum_y / weight;

        let mut mu = [0.0f64; 7];
        for &[x, y] in points {
            let dx = f64::from(x) - mean_x;
            let dy = f64::from(y) - mean_y;
            if let Some(m) = mu.get_mut(0) {
                *m += dx * dx;
            }
            if let Some(m) = mu.get_mut(1) {
                *m += dx * dy;
            }
            if let Some(m) = mu.get_mut(2) {
                *m += dy * dy;
            }
            if let Some(m) = mu.get_mut(3) {
                *m += dx * dx * dx;
            }
            if let Some(m) = mu.get_mut(4) {
                *m += dx * dx * dy;
            }
            if let Some(m) = mu.get_mut(5) {
                *m += dx * dy * dy;
            }
            if let Some(m) = mu.get_mut(6) {
                *m += dy * dy * dy;
            }
        }

        let il = f64::from(interline);
        let norm2 = weight * il * il;
        let norm3 = norm2 * il;

        let at = |idx: usize| mu.get(idx).copied().unwrap_or(0.0);

        Some(Self {
            mean_x,
            mean_y,
            n20: at(0) / norm2,
            n11: at(1) / norm2,
            n02: at(2) / norm2,
            n30: at(3) / norm3,
            n21: at(4) / norm3,
            n12: at(5) / norm3,
            n03: at(6) / norm3,
        })
    }
}
