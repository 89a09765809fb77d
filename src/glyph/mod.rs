//! Glyph model: pixel regions, classification state, and the owning arena

/// Confidence-bearing shape hypotheses and the classifier boundary
pub mod evaluation;
/// Lazily computed geometric feature bundle
pub mod geometry;
/// Closed shape vocabulary and shape sets
pub mod shape;
/// Stable identity across re-segmentation
pub mod signature;

/// Compound glyph construction
pub mod compound;

pub use evaluation::{Classifier, Evaluation, Origin};
pub use geometry::Geometry;
pub use shape::{Shape, ShapeSet, ShapeTables};
pub use signature::GlyphSignature;

use log::trace;

use crate::io::configuration::MAX_MERGE_DEPTH;
use crate::io::error::{OmrError, Result};
use crate::raster::{PixelSource, foreground_points};
use crate::spatial::BoundingBox;

/// Arena index identifying a glyph
pub type GlyphId = usize;

/// Link from a glyph to the score entity that owns its semantic meaning
///
/// References are index-based so they survive entity rebuilds and never form
/// live pointer chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationRef {
    /// Translated into (part of) a chord
    Chord {
        /// Measure index within the system
        measure: usize,
        /// Chord index within the measure
        chord: usize,
    },
    /// Attached to a measure's trailing barline
    Barline {
        /// Measure index within the system
        measure: usize,
    },
    /// Translated into an articulation mark
    Articulation {
        /// Measure index within the system
        measure: usize,
        /// Articulation index within the measure
        index: usize,
    },
}

/// A connected region of foreground pixels, the atomic recognition unit
///
/// Pixel membership is immutable by convention once registered; the mutating
/// entry points ([`Glyph::translate`]) invalidate every cached feature, so
/// geometric getters always reflect the current membership.
#[derive(Debug, Clone)]
pub struct Glyph {
    id: GlyphId,
    pixels: Vec<[i32; 2]>,
    interline: u32,
    virtual_location: Option<[i32; 2]>,
    shape: Option<Shape>,
    evaluation: Option<Evaluation>,
    translation: Option<TranslationRef>,
    part_of: Option<GlyphId>,
    registered_signature: Option<GlyphSignature>,
    // Feature caches; `invalidate` clears both together
    bounds_cache: Option<BoundingBox>,
    geometry_cache: Option<Geometry>,
}

impl Glyph {
    fn new(id: GlyphId, pixels: Vec<[i32; 2]>, interline: u32) -> Self {
        Self {
            id,
            pixels,
            interline,
            virtual_location: None,
            shape: None,
            evaluation: None,
            translation: None,
            part_of: None,
            registered_signature: None,
            bounds_cache: None,
            geometry_cache: None,
        }
    }

    /// Arena identifier
    pub const fn id(&self) -> GlyphId {
        self.id
    }

    /// Interline of the glyph's staff context
    pub const fn interline(&self) -> u32 {
        self.interline
    }

    /// Absolute foreground points (empty for virtual glyphs)
    pub fn pixels(&self) -> &[[i32; 2]] {
        &self.pixels
    }

    /// Whether this glyph carries no physical pixels
    pub const fn is_virtual(&self) -> bool {
        self.virtual_location.is_some()
    }

    /// Currently assigned shape, if classified
    pub const fn shape(&self) -> Option<Shape> {
        self.shape
    }

    /// Assign or clear the shape without confidence information
    pub const fn set_shape(&mut self, shape: Option<Shape>) {
        self.shape = shape;
        if shape.is_none() {
            self.evaluation = None;
        }
    }

    /// Best evaluation backing the current shape, if any
    pub const fn evaluation(&self) -> Option<Evaluation> {
        self.evaluation
    }

    /// Assign a shape together with its evaluation
    pub const fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.shape = Some(evaluation.shape);
        self.evaluation = Some(evaluation);
    }

    /// Current translation target, if the glyph has been translated
    pub const fn translation(&self) -> Option<TranslationRef> {
        self.translation
    }

    /// Record the owning score entity
    pub const fn set_translation(&mut self, translation: TranslationRef) {
        self.translation = Some(translation);
    }

    /// Forget the owning score entity (cleanup step)
    pub const fn clear_translation(&mut self) {
        self.translation = None;
    }

    /// The compound this glyph has been absorbed into, if any
    pub const fn part_of(&self) -> Option<GlyphId> {
        self.part_of
    }

    /// Signature remembered at registration time, if any
    pub const fn registered_signature(&self) -> Option<GlyphSignature> {
        self.registered_signature
    }

    /// Remember the registration signature
    pub const fn set_registered_signature(&mut self, signature: GlyphSignature) {
        self.registered_signature = Some(signature);
    }

    /// Absolute bounding box, cached after first computation
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::EmptyGlyph`] for a non-virtual glyph without
    /// pixels (a segmentation contract violation).
    pub fn bounds(&mut self) -> Result<BoundingBox> {
        if let Some(bounds) = self.bounds_cache {
            return Ok(bounds);
        }
        let bounds = if let Some(location) = self.virtual_location {
            BoundingBox::new(location, location)
        } else {
            BoundingBox::of_points(&self.pixels).ok_or(OmrError::EmptyGlyph { glyph: self.id })?
        };
        self.bounds_cache = Some(bounds);
        Ok(bounds)
    }

    /// Full geometric feature bundle, cached after first computation
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::EmptyGlyph`] when the glyph owns no pixels;
    /// virtual glyphs have a location but no geometry.
    pub fn geometry(&mut self) -> Result<&Geometry> {
        if self.geometry_cache.is_none() {
            let computed = Geometry::compute(&self.pixels, self.interline)
                .ok_or(OmrError::EmptyGlyph { glyph: self.id })?;
            self.geometry_cache = Some(computed);
        }
        self.geometry_cache
            .as_ref()
            .ok_or(OmrError::EmptyGlyph { glyph: self.id })
    }

    /// Fit and cache an approximating circle
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::EmptyGlyph`] when the glyph owns no pixels. A
    /// cloud that admits no circle (collinear, too small) yields `Ok(None)`.
    pub fn fit_circle(&mut self) -> Result<Option<crate::math::circle::Circle>> {
        let circle = crate::math::circle::Circle::fit(&self.pixels);
        self.geometry()?;
        if let Some(geometry) = self.geometry_cache.as_mut() {
            geometry.circle = circle;
        }
        Ok(circle)
    }

    /// Reference location: virtual anchor, or the area center otherwise
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::EmptyGlyph`] for a pixel-less non-virtual glyph.
    pub fn location(&mut self) -> Result<[i32; 2]> {
        if let Some(location) = self.virtual_location {
            return Ok(location);
        }
        Ok(self.bounds()?.center())
    }

    /// Current signature derived from normalized features
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::EmptyGlyph`] when the glyph owns no pixels.
    pub fn signature(&mut self) -> Result<GlyphSignature> {
        let geometry = self.geometry()?;
        Ok(GlyphSignature::new(
            geometry.weight,
            geometry.normalized_width,
            geometry.normalized_height,
        ))
    }

    /// Shift the glyph by the given vector
    ///
    /// Cached point-valued features are shifted rather than recomputed;
    /// translation-invariant features stay valid as they are.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        for point in &mut self.pixels {
            point[0] += dx;
            point[1] += dy;
        }
        if let Some(location) = &mut self.virtual_location {
            location[0] += dx;
            location[1] += dy;
        }
        if let Some(geometry) = &mut self.geometry_cache {
            geometry.shift(dx, dy);
        }
        self.bounds_cache = self.bounds_cache.map(|bounds| bounds.translated(dx, dy));
    }

    /// Whether the glyph intersects the given absolute rectangle
    ///
    /// Bounding boxes are used as a prefilter, then actual pixel membership
    /// decides. Virtual glyphs intersect when their anchor is contained.
    pub fn intersects(&mut self, rectangle: &BoundingBox) -> bool {
        let Ok(bounds) = self.bounds() else {
            return false;
        };
        if !bounds.intersects(rectangle) {
            return false;
        }
        if let Some(location) = self.virtual_location {
            return rectangle.contains(location);
        }
        self.pixels.iter().any(|&point| rectangle.contains(point))
    }

    /// Whether this glyph physically touches another (8-adjacency)
    pub fn touches(&self, other: &Self) -> bool {
        let (Some(a), Some(b)) = (
            BoundingBox::of_points(&self.pixels),
            BoundingBox::of_points(&other.pixels),
        ) else {
            return false;
        };
        if !a.grow(1, 1).intersects(&b) {
            return false;
        }
        let membership: std::collections::HashSet<[i32; 2]> =
            other.pixels.iter().copied().collect();
        self.pixels.iter().any(|&[x, y]| {
            (-1..=1).any(|dy| {
                (-1..=1).any(|dx| (dx, dy) != (0, 0) && membership.contains(&[x + dx, y + dy]))
            })
        })
    }

    /// Rightmost point at the vertical center, the trailing edge of a stick
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::EmptyGlyph`] when the glyph owns no pixels.
    pub fn stop_point(&mut self) -> Result<[i32; 2]> {
        let bounds = self.bounds()?;
        Ok([bounds.max[0], bounds.center()[1]])
    }
}

/// Id-indexed owner of every glyph on a page
///
/// Compound construction records membership through `part_of` back-references;
/// [`GlyphArena::ancestor_of`] resolves any merge chain to the surviving
/// glyph, union-find style, with a depth guard against corrupt chains.
#[derive(Debug, Default)]
pub struct GlyphArena {
    glyphs: Vec<Glyph>,
}

impl GlyphArena {
    /// Create an empty arena
    pub const fn new() -> Self {
        Self { glyphs: Vec::new() }
    }

    /// Register a glyph from an explicit pixel membership
    pub fn register(&mut self, pixels: Vec<[i32; 2]>, interline: u32) -> GlyphId {
        let id = self.glyphs.len();
        self.glyphs.push(Glyph::new(id, pixels, interline));
        id
    }

    /// Register a virtual glyph carrying only a reference location
    pub fn register_virtual(&mut self, location: [i32; 2], interline: u32) -> GlyphId {
        let id = self.register(Vec::new(), interline);
        if let Some(glyph) = self.glyphs.get_mut(id) {
            glyph.virtual_location = Some(location);
        }
        id
    }

    /// Register a glyph from the foreground pixels of a raster region
    pub fn register_from_raster<S: PixelSource + ?Sized>(
        &mut self,
        source: &S,
        min: [i32; 2],
        max: [i32; 2],
        interline: u32,
    ) -> GlyphId {
        self.register(foreground_points(source, min, max), interline)
    }

    /// Number of glyphs ever registered
    pub const fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether no glyph has been registered
    pub const fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Shared access to a glyph
    pub fn get(&self, id: GlyphId) -> Option<&Glyph> {
        self.glyphs.get(id)
    }

    /// Exclusive access to a glyph
    pub fn get_mut(&mut self, id: GlyphId) -> Option<&mut Glyph> {
        self.glyphs.get_mut(id)
    }

    /// Resolve a glyph through any compound merge chain
    ///
    /// Returns the identifier of the surviving ancestor; a glyph that was
    /// never absorbed resolves to itself. Walks at most
    /// [`MAX_MERGE_DEPTH`] links, so a corrupt cyclic chain terminates at an
    /// arbitrary but stable member.
    pub fn ancestor_of(&self, id: GlyphId) -> GlyphId {
        let mut current = id;
        for _ in 0..MAX_MERGE_DEPTH {
            match self.glyphs.get(current).and_then(Glyph::part_of) {
                Some(parent) if parent != current => current = parent,
                _ => return current,
            }
        }
        current
    }

    /// Merge member glyphs into a newly registered compound
    ///
    /// The compound owns the union of the members' pixels; every member gets
    /// a `part_of` back-reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::UnknownGlyph`] if a member id does not resolve,
    /// and [`OmrError::InvalidParameter`] for an empty member list.
    pub fn merge(&mut self, members: &[GlyphId], interline: u32) -> Result<GlyphId> {
        if members.is_empty() {
            return Err(crate::io::error::invalid_parameter(
                "members",
                &"[]",
                &"a compound needs at least one member",
            ));
        }

        let mut pixels = Vec::new();
        for &member in members {
            let glyph = self
                .glyphs
                .get(member)
                .ok_or(OmrError::UnknownGlyph { glyph: member })?;
            pixels.extend_from_slice(&glyph.pixels);
        }
        pixels.sort_unstable();
        pixels.dedup();

        let compound = self.register(pixels, interline);
        for &member in members {
            if let Some(glyph) = self.glyphs.get_mut(member) {
                glyph.part_of = Some(compound);
            }
        }
        trace!("compound #{compound} built from {members:?}");
        Ok(compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestor_resolution_through_merge_chain() {
        let mut arena = GlyphArena::new();
        let a = arena.register(vec![[0, 0]], 10);
        let b = arena.register(vec![[1, 0]], 10);
        let ab = arena.merge(&[a, b], 10);
        assert!(ab.is_ok_and(|ab| {
            let c = arena.register(vec![[2, 0]], 10);
            arena
                .merge(&[ab, c], 10)
                .is_ok_and(|abc| arena.ancestor_of(a) == abc && arena.ancestor_of(abc) == abc)
        }));
    }

    #[test]
    fn test_virtual_glyph_location() {
        let mut arena = GlyphArena::new();
        let id = arena.register_virtual([40, 50], 10);
        let glyph = arena.get_mut(id);
        assert!(glyph.is_some_and(|g| {
            g.is_virtual() && g.location().is_ok_and(|loc| loc == [40, 50])
        }));
    }

    #[test]
    fn test_empty_glyph_geometry_is_contract_violation() {
        let mut arena = GlyphArena::new();
        let id = arena.register(Vec::new(), 10);
        let failed = arena
            .get_mut(id)
            .is_some_and(|g| matches!(g.geometry(), Err(OmrError::EmptyGlyph { glyph }) if glyph == id));
        assert!(failed);
    }

    #[test]
    fn test_touching_detection() {
        let mut arena = GlyphArena::new();
        let a = arena.register(vec![[0, 0], [1, 0]], 10);
        let b = arena.register(vec![[2, 1]], 10);
        let c = arena.register(vec![[5, 5]], 10);
        let (a, b, c) = (arena.get(a), arena.get(b), arena.get(c));
        assert!(match (a, b, c) {
            (Some(a), Some(b), Some(c)) => a.touches(b) && !a.touches(c),
            _ => false,
        });
    }
}
