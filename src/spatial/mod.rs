//! Absolute-coordinate geometry primitives shared across the crate

/// Stick/line crossing points with stable orderings
pub mod intersection;

pub use intersection::{StickIntersection, sticks_of};

/// Axis-aligned bounding box with inclusive bounds
///
/// Coordinates are absolute page pixels, `[x, y]` order. A box with
/// `min == max` covers exactly one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// Minimum coordinates (inclusive)
    pub min: [i32; 2],
    /// Maximum coordinates (inclusive)
    pub max: [i32; 2],
}

impl BoundingBox {
    /// Create a box from its inclusive corners
    pub const fn new(min: [i32; 2], max: [i32; 2]) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every given point, or `None` for no points
    pub fn of_points(points: &[[i32; 2]]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self::new(*first, *first);
        for &[x, y] in points {
            bbox.min[0] = bbox.min[0].min(x);
            bbox.min[1] = bbox.min[1].min(y);
            bbox.max[0] = bbox.max[0].max(x);
            bbox.max[1] = bbox.max[1].max(y);
        }
        Some(bbox)
    }

    /// Check if a position is within the bounds
    pub const fn contains(&self, pos: [i32; 2]) -> bool {
        pos[0] >= self.min[0]
            && pos[0] <= self.max[0]
            && pos[1] >= self.min[1]
            && pos[1] <= self.max[1]
    }

    /// Check if two boxes share at least one pixel
    pub const fn intersects(&self, other: &Self) -> bool {
        self.min[0] <= other.max[0]
            && other.min[0] <= self.max[0]
            && self.min[1] <= other.max[1]
            && other.min[1] <= self.max[1]
    }

    /// Grow the box by `dx` pixels horizontally and `dy` vertically, both sides
    pub const fn grow(&self, dx: i32, dy: i32) -> Self {
        Self {
            min: [self.min[0] - dx, self.min[1] - dy],
            max: [self.max[0] + dx, self.max[1] + dy],
        }
    }

    /// Shift the box by the given vector
    pub const fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            min: [self.min[0] + dx, self.min[1] + dy],
            max: [self.max[0] + dx, self.max[1] + dy],
        }
    }

    /// Width in pixels (at least 1)
    pub const fn width(&self) -> i32 {
        self.max[0] - self.min[0] + 1
    }

    /// Height in pixels (at least 1)
    pub const fn height(&self) -> i32 {
        self.max[1] - self.min[1] + 1
    }

    /// Area in pixels
    pub const fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Geometric center, rounded toward the origin corner
    pub const fn center(&self) -> [i32; 2] {
        [
            self.min[0] + (self.max[0] - self.min[0]) / 2,
            self.min[1] + (self.max[1] - self.min[1]) / 2,
        ]
    }
}

/// Squared Euclidean distance between two points, as `f64`
pub fn distance_sq(a: [i32; 2], b: [i32; 2]) -> f64 {
    let dx = f64::from(a[0] - b[0]);
    let dy = f64::from(a[1] - b[1]);
    dx.mul_add(dx, dy * dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_points_and_contains() {
        let bbox = BoundingBox::of_points(&[[3, 4], [1, 9], [5, 2]]);
        assert_eq!(bbox, Some(BoundingBox::new([1, 2], [5, 9])));
        let bbox = bbox.map_or_else(|| BoundingBox::new([0, 0], [0, 0]), |b| b);
        assert!(bbox.contains([1, 2]));
        assert!(bbox.contains([5, 9]));
        assert!(!bbox.contains([6, 9]));
    }

    #[test]
    fn test_grow_and_intersects() {
        let a = BoundingBox::new([0, 0], [2, 2]);
        let b = BoundingBox::new([4, 0], [6, 2]);
        assert!(!a.intersects(&b));
        assert!(a.grow(2, 0).intersects(&b));
        assert!(b.intersects(&a.grow(2, 0)));
    }

    #[test]
    fn test_empty_points() {
        assert_eq!(BoundingBox::of_points(&[]), None);
    }
}
