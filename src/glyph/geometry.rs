//! Lazily computed geometric features of a glyph
//!
//! Every feature here is a pure function of the glyph's pixel membership and
//! its interline context. The bundle is recomputed as a whole on first access
//! after invalidation rather than tracking per-field staleness.

use crate::math::circle::Circle;
use crate::math::moments::GeometricMoments;
use crate::spatial::BoundingBox;

/// Computed feature bundle for one glyph
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Foreground pixel count
    pub weight: usize,
    /// Mass center, rounded to pixels
    pub centroid: [i32; 2],
    /// Center of the bounding rectangle
    pub area_center: [i32; 2],
    /// Weight divided by bounding-box area
    pub density: f64,
    /// Width as an interline fraction
    pub normalized_width: f64,
    /// Height as an interline fraction
    pub normalized_height: f64,
    /// Weight as an interline-square fraction
    pub normalized_weight: f64,
    /// Central shape moments
    pub moments: GeometricMoments,
    /// Approximating circle, if one has been fitted
    pub circle: Option<Circle>,
}

impl Geometry {
    /// Compute the full feature bundle for a pixel membership
    ///
    /// Returns `None` for an empty membership or a non-positive interline;
    /// the caller maps that to the empty-glyph contract violation.
    pub fn compute(points: &[[i32; 2]], interline: u32) -> Option<Self> {
        let bounds = BoundingBox::of_points(points)?;
        let moments = GeometricMoments::compute(points, interline)?;

        let weight = points.len();
        let il = f64::from(interline);
        let centroid = [
            moments.mean_x.round() as i32,
            moments.mean_y.round() as i32,
        ];

        Some(Self {
            weight,
            centroid,
            area_center: bounds.center(),
            density: weight as f64 / bounds.area() as f64,
            normalized_width: f64::from(bounds.width()) / il,
            normalized_height: f64::from(bounds.height()) / il,
            normalized_weight: weight as f64 / (il * il),
            moments,
            circle: None,
        })
    }

    /// Shift every point-valued feature by the given vector
    ///
    /// Normalized dimensions, density and central moments are translation
    /// invariant and stay untouched; only absolute-coordinate features move.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.centroid = [self.centroid[0] + dx, self.centroid[1] + dy];
        self.area_center = [self.area_center[0] + dx, self.area_center[1] + dy];
        self.moments.mean_x += f64::from(dx);
        self.moments.mean_y += f64::from(dy);
        if let Some(circle) = &mut self.circle {
            circle.center_x += f64::from(dx);
            circle.center_y += f64::from(dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_of_square_block() {
        // 4x4 block anchored at (10, 20), interline 4
        let mut points = Vec::new();
        for y in 20..24 {
            for x in 10..14 {
                points.push([x, y]);
            }
        }
        let geometry = Geometry::compute(&points, 4);
        assert!(geometry.is_some_and(|g| {
            g.weight == 16
                && g.area_center == [11, 21]
                && (g.density - 1.0).abs() < f64::EPSILON
                && (g.normalized_width - 1.0).abs() < f64::EPSILON
                && (g.normalized_weight - 1.0).abs() < f64::EPSILON
        }));
    }

    #[test]
    fn test_shift_moves_points_only() {
        // 3x3 block with an integral centroid at (1, 1)
        let mut points = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                points.push([x, y]);
            }
        }
        let shifted = Geometry::compute(&points, 2).map(|mut g| {
            let density = g.density;
            let n20 = g.moments.n20;
            g.shift(5, -3);
            (g, density, n20)
        });
        assert!(shifted.is_some_and(|(g, density, n20)| {
            g.centroid == [6, -2]
                && g.area_center == [6, -2]
                && (g.density - density).abs() < f64::EPSILON
                && (g.moments.n20 - n20).abs() < f64::EPSILON
        }));
    }
}
