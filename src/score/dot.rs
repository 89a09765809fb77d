//! Dot role resolution
//!
//! A dot-shaped glyph can be an augmentation dot, part of a repeat sign, or a
//! staccato mark. Each shape-compatible hypothesis is scored against nearby
//! score entities; the closest one wins and commits its side effect. A dot
//! with no viable hypothesis is a recoverable, measure-level error.
//!
//! Known limitation: double-dot augmentation is not handled; a winning
//! augmentation always contributes a single dot.

use std::cmp::Ordering;

use log::debug;

use crate::glyph::{GlyphArena, GlyphId, Shape, TranslationRef};
use crate::io::configuration::{
    MAX_AUGMENTATION_DOT_DX, MAX_AUGMENTATION_DOT_DY, MAX_REPEAT_DOT_DX, MAX_REPEAT_DOT_DY,
    MAX_STACCATO_DOT_DX, MAX_STACCATO_DOT_DY,
};
use crate::io::error::{OmrError, Result};
use crate::score::{Articulation, ErrorSink, Measure, Scale, StaffInfo, Step};
use crate::spatial::distance_sq;

/// A scored interpretation of one dot glyph
///
/// Ordered by distance first; the role rank and target indices only break
/// exact ties, keeping selection deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    dist: f64,
    role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Augmentation { chord: usize },
    Repeat { measure: usize },
    Staccato { chord: usize },
}

impl Role {
    const fn rank(self) -> u8 {
        match self {
            Self::Augmentation { .. } => 0,
            Self::Repeat { .. } => 1,
            Self::Staccato { .. } => 2,
        }
    }

    const fn target_shape(self) -> Shape {
        match self {
            Self::Augmentation { .. } => Shape::AugmentationDot,
            Self::Repeat { .. } => Shape::RepeatDots,
            Self::Staccato { .. } => Shape::Staccato,
        }
    }
}

impl Candidate {
    fn compare(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.role.rank().cmp(&other.role.rank()))
    }
}

/// Find and commit the best interpretation for a dot glyph
///
/// `index` designates the containing measure inside `measures`; `dot_center`
/// is the absolute location of the dot. On success the glyph is re-tagged
/// with the winning role's canonical shape and linked to the owning entity.
/// When no hypothesis is produced, a "Dot unassigned" error is recorded and
/// the glyph stays untranslated.
///
/// # Errors
///
/// Returns [`OmrError::UnknownMeasure`] for an out-of-range measure index and
/// [`OmrError::UnknownGlyph`] for an unregistered glyph.
pub fn populate_dot(
    arena: &mut GlyphArena,
    glyph_id: GlyphId,
    measures: &mut [Measure],
    index: usize,
    dot_center: [i32; 2],
    scale: Scale,
    errors: &mut ErrorSink,
) -> Result<()> {
    let shape = arena
        .get(glyph_id)
        .ok_or(OmrError::UnknownGlyph { glyph: glyph_id })?
        .shape()
        .unwrap_or(Shape::Dot);
    let measure = measures.get(index).ok_or(OmrError::UnknownMeasure {
        index,
        measure_count: measures.len(),
    })?;

    let mut candidates: Vec<Candidate> = Vec::with_capacity(3);

    if matches!(shape, Shape::Dot | Shape::AugmentationDot) {
        if let Some(aug) = try_augmentation(shape, measure, dot_center, scale) {
            candidates.push(aug);
        }
    }
    if matches!(shape, Shape::Dot | Shape::RepeatDots) {
        if let Some(rep) = try_repeat(shape, measures, index, dot_center, scale) {
            candidates.push(rep);
        }
    }
    if matches!(shape, Shape::Dot | Shape::Staccato) {
        if let Some(sta) = try_staccato(shape, measures.get(index), dot_center, scale) {
            candidates.push(sta);
        }
    }

    candidates.sort_by(Candidate::compare);
    let Some(winner) = candidates.first().copied() else {
        errors.report(Step::Translation, Some(glyph_id), "Dot unassigned");
        return Ok(());
    };
    debug!(
        "dot #{glyph_id}: {:?} at distance {:.1}",
        winner.role, winner.dist
    );

    // Re-tag with the winning role's canonical shape
    if let Some(glyph) = arena.get_mut(glyph_id) {
        if glyph.shape() != Some(winner.role.target_shape()) {
            glyph.set_shape(Some(winner.role.target_shape()));
        }
    }

    commit(arena, glyph_id, measures, index, dot_center, winner.role)
}

/// Augmentation hypothesis: the dot sits right of a note's right-center
///
/// A glyph already tagged as a combining augmentation dot waives the
/// positive-abscissa requirement but keeps the vertical filter.
fn try_augmentation(
    shape: Shape,
    measure: &Measure,
    dot_center: [i32; 2],
    scale: Scale,
) -> Option<Candidate> {
    let max_dx = scale.to_pixels(MAX_AUGMENTATION_DOT_DX);
    let max_dy = scale.to_pixels(MAX_AUGMENTATION_DOT_DY);
    let mut best: Option<Candidate> = None;

    for (chord_idx, chord) in measure.chords.iter().enumerate() {
        for note in &chord.notes {
            if note.is_rest() {
                continue;
            }
            let reference = note.center_right();
            let dx = dot_center[0] - reference[0];
            let dy = dot_center[1] - reference[1];

            let accepted = if shape == Shape::AugmentationDot {
                dy.abs() <= max_dy
            } else {
                dx > 0 && dx <= max_dx && dy.abs() <= max_dy
            };
            if !accepted {
                continue;
            }

            let candidate = Candidate {
                dist: distance_sq(dot_center, reference),
                role: Role::Augmentation { chord: chord_idx },
            };
            if best.is_none_or(|held| candidate.compare(&held).is_lt()) {
                best = Some(candidate);
            }
        }
    }
    best
}

/// Repeat hypothesis: the dot pairs with a repeat barline
///
/// The dot must sit near pitch position ±1 (the two inner staff spaces).
/// The current measure's trailing barline is checked to the dot's right,
/// then the previous measure's trailing barline to its left.
fn try_repeat(
    shape: Shape,
    measures: &[Measure],
    index: usize,
    dot_center: [i32; 2],
    scale: Scale,
) -> Option<Candidate> {
    let measure = measures.get(index)?;

    // Vertical pitch position within the staff: close to +1 or -1
    let staff = StaffInfo::new(measure.staff_mid_y, scale.interline());
    let pitch = staff.pitch_position(dot_center[1]);
    let pitch_dif = (pitch.abs() - 1.0).abs();
    if pitch_dif > 2.0 * MAX_REPEAT_DOT_DY {
        return None;
    }

    let max_dx = scale.to_pixels(MAX_REPEAT_DOT_DX);

    if let Some(barline) = &measure.barline {
        let dx = barline.left_x - dot_center[0];
        if shape == Shape::RepeatDots || (dx > 0 && dx <= max_dx) {
            return Some(Candidate {
                dist: f64::from(dx) * f64::from(dx),
                role: Role::Repeat { measure: index },
            });
        }
    }

    // Symmetric check against the previous measure's trailing edge
    if index > 0 {
        let previous = index - 1;
        if let Some(barline) = measures.get(previous).and_then(|m| m.barline.as_ref()) {
            let dx = dot_center[0] - barline.right_x;
            if dx > 0 && dx <= max_dx {
                return Some(Candidate {
                    dist: f64::from(dx) * f64::from(dx),
                    role: Role::Repeat { measure: previous },
                });
            }
        }
    }

    None
}

/// Staccato hypothesis: the dot hugs a note's geometric center
///
/// A glyph already tagged staccato accepts any non-rest note (tolerances
/// waived).
fn try_staccato(
    shape: Shape,
    measure: Option<&Measure>,
    dot_center: [i32; 2],
    scale: Scale,
) -> Option<Candidate> {
    let measure = measure?;
    let max_dx = scale.to_pixels(MAX_STACCATO_DOT_DX);
    let max_dy = scale.to_pixels(MAX_STACCATO_DOT_DY);
    let mut best: Option<Candidate> = None;

    for (chord_idx, chord) in measure.chords.iter().enumerate() {
        for note in &chord.notes {
            if note.is_rest() {
                continue;
            }
            let reference = note.center();
            let dx = dot_center[0] - reference[0];
            let dy = dot_center[1] - reference[1];

            let accepted =
                shape == Shape::Staccato || (dx.abs() <= max_dx && dy.abs() <= max_dy);
            if !accepted {
                continue;
            }

            let candidate = Candidate {
                dist: distance_sq(dot_center, reference),
                role: Role::Staccato { chord: chord_idx },
            };
            if best.is_none_or(|held| candidate.compare(&held).is_lt()) {
                best = Some(candidate);
            }
        }
    }
    best
}

fn commit(
    arena: &mut GlyphArena,
    glyph_id: GlyphId,
    measures: &mut [Measure],
    index: usize,
    dot_center: [i32; 2],
    role: Role,
) -> Result<()> {
    let measure_count = measures.len();
    match role {
        Role::Augmentation { chord } => {
            let measure = measures.get_mut(index).ok_or(OmrError::UnknownMeasure {
                index,
                measure_count,
            })?;
            if let Some(chord_entity) = measure.chords.get_mut(chord) {
                chord_entity.dots += 1;
                chord_entity.add_glyph(glyph_id);
            }
            if let Some(glyph) = arena.get_mut(glyph_id) {
                glyph.set_translation(TranslationRef::Chord {
                    measure: index,
                    chord,
                });
            }
        }
        Role::Repeat { measure } => {
            if let Some(barline) = measures
                .get_mut(measure)
                .and_then(|m| m.barline.as_mut())
            {
                barline.add_glyph(glyph_id);
            }
            if let Some(glyph) = arena.get_mut(glyph_id) {
                glyph.set_translation(TranslationRef::Barline { measure });
            }
        }
        Role::Staccato { chord } => {
            let measure = measures.get_mut(index).ok_or(OmrError::UnknownMeasure {
                index,
                measure_count,
            })?;
            let articulation_index = measure.articulations.len();
            measure.articulations.push(Articulation {
                shape: Shape::Staccato,
                glyph: glyph_id,
                chord,
                location: dot_center,
            });
            if let Some(glyph) = arena.get_mut(glyph_id) {
                glyph.set_translation(TranslationRef::Articulation {
                    measure: index,
                    index: articulation_index,
                });
            }
        }
    }
    Ok(())
}
