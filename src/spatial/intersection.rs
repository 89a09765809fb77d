//! Crossing points of linear glyphs ("sticks") against reference lines
//!
//! A typical instance is a vertical barline stick crossing a horizontal staff
//! line. Intersections carry the owning stick by identifier so that a stick
//! later absorbed into a compound still resolves to its surviving ancestor.

use std::cmp::Ordering;

use crate::glyph::{GlyphArena, GlyphId};

/// Intersection point of a stick with a crossing line
#[derive(Debug, Clone, Copy)]
pub struct StickIntersection {
    /// Abscissa where the stick intersects the line
    pub x: f64,
    /// Ordinate where the stick intersects the line
    pub y: f64,
    /// The stick glyph, possibly merged away since
    stick: GlyphId,
}

impl StickIntersection {
    /// Record an intersection at an absolute location for the given stick
    pub const fn new(x: f64, y: f64, stick: GlyphId) -> Self {
        Self { x, y, stick }
    }

    /// The stick as registered at intersection time
    pub const fn stick(&self) -> GlyphId {
        self.stick
    }

    /// The stick resolved through any compound merge chain
    pub fn stick_ancestor(&self, arena: &GlyphArena) -> GlyphId {
        arena.ancestor_of(self.stick)
    }

    /// Strict weak ordering on increasing abscissa, ordinate as tie-break
    pub fn by_abscissa(a: &Self, b: &Self) -> Ordering {
        a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
    }

    /// Strict weak ordering on increasing ordinate, abscissa as tie-break
    pub fn by_ordinate(a: &Self, b: &Self) -> Ordering {
        a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x))
    }
}

impl PartialEq for StickIntersection {
    fn eq(&self, other: &Self) -> bool {
        Self::by_abscissa(self, other) == Ordering::Equal
    }
}

impl Eq for StickIntersection {}

impl PartialOrd for StickIntersection {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StickIntersection {
    /// Default ordering: abscissa first, then ordinate
    fn cmp(&self, other: &Self) -> Ordering {
        Self::by_abscissa(self, other)
    }
}

/// Convert a sequence of intersections to their ancestor sticks, in order
pub fn sticks_of<'a, I>(intersections: I, arena: &GlyphArena) -> Vec<GlyphId>
where
    I: IntoIterator<Item = &'a StickIntersection>,
{
    intersections
        .into_iter()
        .map(|crossing| crossing.stick_ancestor(arena))
        .collect()
}
