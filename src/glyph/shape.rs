//! Closed shape vocabulary and shape-set taxonomy
//!
//! Shape sets are fixed-size bit sets over the vocabulary, built once at
//! startup and passed by reference into validators; they are never mutated
//! afterwards.

use std::sync::OnceLock;

use bitvec::prelude::{BitVec, bitvec};

/// Symbolic label for a glyph's musical meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Filled note head (quarter and shorter)
    NoteheadBlack,
    /// Hollow note head (half note)
    NoteheadVoid,
    /// Whole note
    WholeNote,
    /// Breve note
    BreveNote,
    /// Vertical note stem
    Stem,
    /// Ledger line chunk outside the staff
    Ledger,
    /// Dot of undetermined role
    Dot,
    /// Dot augmenting the duration of a chord
    AugmentationDot,
    /// Dot pair marking a repeat barline
    RepeatDots,
    /// Staccato articulation dot
    Staccato,
    /// Thin barline
    ThinBarline,
    /// Thick barline
    ThickBarline,
    /// Whole rest
    WholeRest,
    /// Half rest
    HalfRest,
    /// Quarter rest
    QuarterRest,
}

impl Shape {
    /// Every shape of the vocabulary, in declaration order
    pub const ALL: [Self; 15] = [
        Self::NoteheadBlack,
        Self::NoteheadVoid,
        Self::WholeNote,
        Self::BreveNote,
        Self::Stem,
        Self::Ledger,
        Self::Dot,
        Self::AugmentationDot,
        Self::RepeatDots,
        Self::Staccato,
        Self::ThinBarline,
        Self::ThickBarline,
        Self::WholeRest,
        Self::HalfRest,
        Self::QuarterRest,
    ];

    /// Size of the vocabulary
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this shape in the vocabulary
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this shape is a rest of any duration
    pub const fn is_rest(self) -> bool {
        matches!(self, Self::WholeRest | Self::HalfRest | Self::QuarterRest)
    }

    /// Whether this shape is specifically a whole (or breve-length) rest
    pub const fn is_whole_rest(self) -> bool {
        matches!(self, Self::WholeRest)
    }

    /// Whether this shape is a barline
    pub const fn is_barline(self) -> bool {
        matches!(self, Self::ThinBarline | Self::ThickBarline)
    }

    /// Whether this shape is one of the dot roles (or the undetermined dot)
    pub const fn is_dot_variant(self) -> bool {
        matches!(
            self,
            Self::Dot | Self::AugmentationDot | Self::RepeatDots | Self::Staccato
        )
    }
}

/// Fixed-size bit set over the shape vocabulary
///
/// Provides O(1) membership testing for neighbor vocabularies and
/// admissibility filters.
#[derive(Debug, Clone)]
pub struct ShapeSet {
    bits: BitVec,
}

impl ShapeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            bits: bitvec![0; Shape::COUNT],
        }
    }

    /// Create a set from the given shapes
    pub fn of(shapes: &[Shape]) -> Self {
        let mut set = Self::new();
        for &shape in shapes {
            set.insert(shape);
        }
        set
    }

    /// Insert a shape
    pub fn insert(&mut self, shape: Shape) {
        self.bits.set(shape.index(), true);
    }

    /// Test shape membership
    pub fn contains(&self, shape: Shape) -> bool {
        self.bits.get(shape.index()).as_deref() == Some(&true)
    }

    /// Create a new set containing the union
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.bits |= &other.bits;
        result
    }

    /// Count shapes in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Test if no shapes are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Extract the member shapes, in vocabulary order
    pub fn to_vec(&self) -> Vec<Shape> {
        self.bits
            .iter_ones()
            .filter_map(|index| Shape::ALL.get(index).copied())
            .collect()
    }
}

impl Default for ShapeSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide immutable shape taxonomy
///
/// Built once and shared by reference; validators pick their neighbor
/// vocabularies from here instead of rebuilding sets per run.
#[derive(Debug)]
pub struct ShapeTables {
    /// Plain notes (whole and breve, drawn without stems)
    pub notes: ShapeSet,
    /// Stemmed note heads
    pub note_heads: ShapeSet,
    /// Rests of any duration
    pub rests: ShapeSet,
    /// Shapes acceptable as the touching neighbor of a valid ledger
    pub ledger_neighbors: ShapeSet,
    /// Shapes that survive re-segmentation passes unchanged
    pub persistent: ShapeSet,
}

impl ShapeTables {
    fn build() -> Self {
        let notes = ShapeSet::of(&[Shape::WholeNote, Shape::BreveNote]);
        let note_heads = ShapeSet::of(&[Shape::NoteheadBlack, Shape::NoteheadVoid]);
        let rests = ShapeSet::of(&[Shape::WholeRest, Shape::HalfRest, Shape::QuarterRest]);
        let ledger_neighbors = notes.union(&note_heads);
        let persistent = ShapeSet::of(&[Shape::ThinBarline, Shape::ThickBarline]);

        Self {
            notes,
            note_heads,
            rests,
            ledger_neighbors,
            persistent,
        }
    }

    /// The shared taxonomy instance
    pub fn global() -> &'static Self {
        static TABLES: OnceLock<ShapeTables> = OnceLock::new();
        TABLES.get_or_init(Self::build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_indices_are_dense() {
        for (position, shape) in Shape::ALL.iter().enumerate() {
            assert_eq!(shape.index(), position);
        }
    }

    #[test]
    fn test_ledger_neighbors_cover_notes_and_heads() {
        let tables = ShapeTables::global();
        assert!(tables.ledger_neighbors.contains(Shape::NoteheadBlack));
        assert!(tables.ledger_neighbors.contains(Shape::WholeNote));
        assert!(!tables.ledger_neighbors.contains(Shape::Stem));
        assert_eq!(tables.ledger_neighbors.count(), 4);
    }

    #[test]
    fn test_set_union_and_to_vec() {
        let a = ShapeSet::of(&[Shape::Dot]);
        let b = ShapeSet::of(&[Shape::Staccato, Shape::Dot]);
        let union = a.union(&b);
        assert_eq!(union.to_vec(), vec![Shape::Dot, Shape::Staccato]);
        assert!(ShapeSet::new().is_empty());
    }
}
