//! Confidence-bearing shape hypotheses

use std::cmp::Ordering;

use crate::glyph::geometry::Geometry;
use crate::glyph::shape::Shape;

/// Who produced an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The external shape classifier
    Classifier,
    /// An algorithmic heuristic (pattern validator, compound repair)
    Algorithm,
}

/// A shape hypothesis with a confidence grade in `[0, 1]`
///
/// Grade ordering is total; a higher grade is more trusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// The hypothesized shape
    pub shape: Shape,
    /// Confidence grade, 0 (worthless) to 1 (certain)
    pub grade: f64,
    /// Origin of the hypothesis
    pub origin: Origin,
}

impl Evaluation {
    /// Create an evaluation, clamping the grade into `[0, 1]`
    pub fn new(shape: Shape, grade: f64, origin: Origin) -> Self {
        Self {
            shape,
            grade: grade.clamp(0.0, 1.0),
            origin,
        }
    }

    /// Total ordering on grade (higher grade sorts last)
    pub fn compare_grade(&self, other: &Self) -> Ordering {
        self.grade.total_cmp(&other.grade)
    }
}

/// The external shape classifier, specified at its boundary only
///
/// The classifier returns its best hypothesis for the given geometric
/// features, or `None` if no hypothesis reaches the caller's grade floor.
pub trait Classifier {
    /// Best shape hypothesis at or above `min_grade`, if any
    fn evaluate(&self, geometry: &Geometry, min_grade: f64) -> Option<Evaluation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_is_clamped() {
        let eval = Evaluation::new(Shape::Dot, 1.7, Origin::Classifier);
        assert!((eval.grade - 1.0).abs() < f64::EPSILON);
        let eval = Evaluation::new(Shape::Dot, -0.3, Origin::Algorithm);
        assert!(eval.grade.abs() < f64::EPSILON);
    }

    #[test]
    fn test_grade_ordering_is_total() {
        let low = Evaluation::new(Shape::Dot, 0.2, Origin::Classifier);
        let high = Evaluation::new(Shape::Staccato, 0.9, Origin::Classifier);
        assert_eq!(low.compare_grade(&high), Ordering::Less);
        assert_eq!(high.compare_grade(&low), Ordering::Greater);
        assert_eq!(low.compare_grade(&low), Ordering::Equal);
    }
}
