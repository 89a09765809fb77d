//! Compound glyph construction
//!
//! A compound merges a seed glyph with nearby candidates to reach a better
//! classification. The adapter supplies everything role-specific: the search
//! region, the admissible target shapes, the grade floor, and a suitability
//! filter over candidates.

use log::debug;

use crate::glyph::evaluation::{Classifier, Evaluation, Origin};
use crate::glyph::geometry::Geometry;
use crate::glyph::shape::Shape;
use crate::glyph::{GlyphArena, GlyphId};
use crate::io::error::{OmrError, Result};
use crate::spatial::BoundingBox;

/// Role-specific policy for one compound search
pub trait CompoundAdapter {
    /// Absolute search region around the seed
    ///
    /// # Errors
    ///
    /// Propagates geometry failures of the seed glyph.
    fn reference_box(&self, arena: &mut GlyphArena, seed: GlyphId) -> Result<BoundingBox>;

    /// Whether a classified compound of this shape is acceptable
    fn is_shape_admissible(&self, shape: Shape) -> bool;

    /// Grade floor a compound evaluation must reach
    fn min_grade(&self) -> f64;

    /// Whether a pool glyph may participate at all
    fn is_candidate_suitable(&self, arena: &GlyphArena, candidate: GlyphId) -> bool;

    /// Rewrite the winning evaluation before it is committed
    ///
    /// The default stamps the algorithmic origin, since the grade no longer
    /// comes straight from the classifier.
    fn chosen_evaluation(&self, evaluation: Evaluation) -> Evaluation {
        Evaluation::new(evaluation.shape, evaluation.grade, Origin::Algorithm)
    }
}

/// Try to build a compound around a seed glyph
///
/// Every suitable pool glyph intersecting the adapter's reference box is
/// tried; the candidate whose (optionally seed-merged) pixel union classifies
/// best above the grade floor wins. With `include_seed` the winner is merged
/// with the seed into a new arena glyph; without it the winning candidate is
/// simply re-evaluated in place. Returns the resulting glyph, or `None` when
/// no candidate qualifies; absence of neighbors is expected, not an error.
///
/// # Errors
///
/// Returns an error if the seed is unknown or its geometry cannot be
/// computed.
pub fn build_compound(
    arena: &mut GlyphArena,
    classifier: &dyn Classifier,
    seed: GlyphId,
    include_seed: bool,
    pool: &[GlyphId],
    adapter: &dyn CompoundAdapter,
) -> Result<Option<GlyphId>> {
    let region = adapter.reference_box(arena, seed)?;
    let interline = arena
        .get(seed)
        .ok_or(OmrError::UnknownGlyph { glyph: seed })?
        .interline();

    let mut best: Option<(GlyphId, Evaluation)> = None;

    for &candidate in pool {
        if candidate == seed || arena.ancestor_of(candidate) != candidate {
            continue;
        }
        if !adapter.is_candidate_suitable(arena, candidate) {
            continue;
        }
        let Some(glyph) = arena.get_mut(candidate) else {
            continue;
        };
        if glyph.is_virtual() || !glyph.intersects(&region) {
            continue;
        }

        let trial = trial_points(arena, seed, candidate, include_seed);
        let Some(geometry) = Geometry::compute(&trial, interline) else {
            continue;
        };
        let Some(evaluation) = classifier.evaluate(&geometry, adapter.min_grade()) else {
            continue;
        };
        if !adapter.is_shape_admissible(evaluation.shape) {
            continue;
        }

        let better = best
            .as_ref()
            .is_none_or(|(_, held)| held.compare_grade(&evaluation).is_lt());
        if better {
            best = Some((candidate, evaluation));
        }
    }

    let Some((winner, evaluation)) = best else {
        return Ok(None);
    };
    let chosen = adapter.chosen_evaluation(evaluation);

    let result = if include_seed {
        let compound = arena.merge(&[seed, winner], interline)?;
        if let Some(glyph) = arena.get_mut(compound) {
            glyph.set_evaluation(chosen);
        }
        compound
    } else {
        if let Some(glyph) = arena.get_mut(winner) {
            glyph.set_evaluation(chosen);
        }
        winner
    };

    debug!(
        "compound for seed #{seed}: glyph #{result} as {:?} (grade {:.2})",
        chosen.shape, chosen.grade
    );
    Ok(Some(result))
}

fn trial_points(
    arena: &GlyphArena,
    seed: GlyphId,
    candidate: GlyphId,
    include_seed: bool,
) -> Vec<[i32; 2]> {
    let mut points = Vec::new();
    if include_seed {
        if let Some(glyph) = arena.get(seed) {
            points.extend_from_slice(glyph.pixels());
        }
    }
    if let Some(glyph) = arena.get(candidate) {
        points.extend_from_slice(glyph.pixels());
    }
    points.sort_unstable();
    points.dedup();
    points
}
