//! Glyph-to-score translation
//!
//! Translation rebuilds a system's score entities from its classified glyphs.
//! Each system iterates clean, translate, check until the checks stop
//! modifying the interpretation or the iteration cap is reached; reaching the
//! cap is a normal stop, not a failure. A cross-system epilog then assigns
//! page-wide measure numbers.

use log::{debug, info};

use crate::glyph::{GlyphArena, GlyphId, Shape, ShapeTables, TranslationRef};
use crate::io::configuration::{CHORD_GROUP_DX, MAX_SCORE_ITERATIONS};
use crate::io::error::Result;
use crate::score::checker::check_system;
use crate::score::dot::populate_dot;
use crate::score::{Barline, Chord, Measure, Note, Page, Step, SystemInfo};
use crate::spatial::{StickIntersection, sticks_of};

/// Tear down a system's score entities and glyph translation links
///
/// Entities are rebuilt from scratch by the next translation pass, so a
/// clean system holds no stale index-based references.
pub fn clean_system(arena: &mut GlyphArena, system: &mut SystemInfo) {
    system.measures.clear();
    for &id in &system.glyphs {
        if let Some(glyph) = arena.get_mut(id) {
            glyph.clear_translation();
        }
    }
}

/// Build a system's measures, chords and dot roles from its glyphs
///
/// Barlines are ordered by their crossing with the reference staff line and
/// turned into measures closed by a trailing barline; notes fall into the
/// measure covering their center and group into chords by abscissa
/// proximity; dot glyphs are resolved last, left to right. Notes beyond the
/// last barline fall into the last measure.
///
/// # Errors
///
/// Propagates glyph geometry failures; unresolvable dots are recorded as
/// system errors instead.
pub fn translate_system(arena: &mut GlyphArena, system: &mut SystemInfo) -> Result<()> {
    let scale = system.scale();
    let staff_mid_y = system.staves.first().map_or(0, |staff| staff.mid_y);

    // Barlines, ordered by their crossing with the middle staff line
    let mut crossings: Vec<StickIntersection> = Vec::new();
    for &id in &system.glyphs {
        let Some(glyph) = arena.get_mut(id) else {
            continue;
        };
        if glyph.shape().is_some_and(Shape::is_barline) {
            let bounds = glyph.bounds()?;
            crossings.push(StickIntersection::new(
                f64::from(bounds.center()[0]),
                f64::from(staff_mid_y),
                id,
            ));
        }
    }
    crossings.sort_by(StickIntersection::by_abscissa);
    let mut barlines = sticks_of(&crossings, arena);
    barlines.dedup();

    let mut left_x = leftmost_abscissa(arena, &system.glyphs);
    for (index, &id) in barlines.iter().enumerate() {
        let Some(glyph) = arena.get_mut(id) else {
            continue;
        };
        let bounds = glyph.bounds()?;
        glyph.set_translation(TranslationRef::Barline { measure: index });
        system.measures.push(Measure {
            number: index + 1,
            left_x,
            barline: Some(Barline {
                glyph: id,
                left_x: bounds.min[0],
                right_x: bounds.max[0],
                glyphs: Vec::new(),
            }),
            chords: Vec::new(),
            articulations: Vec::new(),
            staff_mid_y,
        });
        left_x = bounds.max[0] + 1;
    }

    // Note-bearing glyphs, gathered per measure
    let mut notes_per_measure: Vec<Vec<Note>> = Vec::new();
    notes_per_measure.resize_with(system.measures.len().max(1), Vec::new);
    let mut any_note = false;
    for &id in &system.glyphs {
        let Some(glyph) = arena.get_mut(id) else {
            continue;
        };
        let Some(shape) = glyph.shape() else {
            continue;
        };
        if !is_note_shape(shape) {
            continue;
        }
        let bounds = glyph.bounds()?;
        let note = Note { glyph: id, shape, bounds };
        let index = measure_index(&system.measures, note.center()[0]);
        if let Some(bucket) = notes_per_measure.get_mut(index) {
            bucket.push(note);
            any_note = true;
        }
    }

    if system.measures.is_empty() {
        if !any_note {
            // No structure to attach to; dots are still accounted for
            for &id in &system.glyphs {
                let is_dot = arena
                    .get(id)
                    .is_some_and(|g| g.shape().is_some_and(Shape::is_dot_variant));
                if is_dot {
                    system.errors.report(Step::Translation, Some(id), "Dot unassigned");
                }
            }
            return Ok(());
        }
        // Barline-less system: one open measure covers everything
        system.measures.push(Measure {
            number: 1,
            left_x,
            barline: None,
            chords: Vec::new(),
            articulations: Vec::new(),
            staff_mid_y,
        });
    }

    let tolerance = scale.to_pixels(CHORD_GROUP_DX);
    for (index, mut notes) in notes_per_measure.into_iter().enumerate() {
        notes.sort_by(|a, b| {
            let (ca, cb) = (a.center(), b.center());
            ca[0].cmp(&cb[0]).then_with(|| ca[1].cmp(&cb[1]))
        });
        let Some(measure) = system.measures.get_mut(index) else {
            continue;
        };
        for note in notes {
            let same_chord = measure.chords.last().is_some_and(|chord| {
                chord
                    .notes
                    .last()
                    .is_some_and(|held| (note.center()[0] - held.center()[0]).abs() <= tolerance)
            });
            if !same_chord {
                measure.chords.push(Chord::default());
            }
            let chord_index = measure.chords.len() - 1;
            if let Some(chord) = measure.chords.last_mut() {
                chord.notes.push(note);
            }
            if let Some(glyph) = arena.get_mut(note.glyph) {
                glyph.set_translation(TranslationRef::Chord {
                    measure: index,
                    chord: chord_index,
                });
            }
        }
    }

    // Dots last, left to right, against the now complete structure
    let mut dots: Vec<(i32, GlyphId, [i32; 2])> = Vec::new();
    for &id in &system.glyphs {
        let Some(glyph) = arena.get_mut(id) else {
            continue;
        };
        if glyph.shape().is_some_and(Shape::is_dot_variant) {
            let center = glyph.location()?;
            dots.push((center[0], id, center));
        }
    }
    dots.sort_unstable();
    for (_, id, center) in dots {
        let index = measure_index(&system.measures, center[0]);
        populate_dot(
            arena,
            id,
            &mut system.measures,
            index,
            center,
            scale,
            &mut system.errors,
        )?;
    }

    debug!(
        "system {}: {} measures, {} translation errors",
        system.id,
        system.measures.len(),
        system.errors.count_for(Step::Translation)
    );
    Ok(())
}

/// Translate every system of a page and number its measures
///
/// Inactive glyphs are purged once per system up front. Each system then
/// iterates clean, translate, check up to [`MAX_SCORE_ITERATIONS`] times,
/// stopping early once a pass leaves the interpretation unchanged. The
/// epilog finally assigns continuous measure numbers across systems.
///
/// # Errors
///
/// Stops at and propagates the first system whose translation fails.
pub fn translate_page(page: &mut Page) -> Result<()> {
    translate_page_with(page, check_system)
}

/// Translate a page with a caller-supplied consistency check
///
/// The check runs after each translation pass and returns whether it
/// modified the interpretation; [`translate_page`] wires in the standard
/// [`check_system`]. Exhausting [`MAX_SCORE_ITERATIONS`] with a check that
/// still reports modifications is a normal stop, keeping the best structure
/// built so far.
///
/// # Errors
///
/// Stops at and propagates the first system whose translation fails.
pub fn translate_page_with<F>(page: &mut Page, mut check: F) -> Result<()>
where
    F: FnMut(&mut GlyphArena, &mut SystemInfo) -> bool,
{
    for system in &mut page.systems {
        let removed = system.remove_inactive_glyphs(&page.arena);
        if removed > 0 {
            debug!("system {}: purged {removed} inactive glyphs", system.id);
        }
    }

    for system in &mut page.systems {
        let mut modified = true;
        let mut iteration = 0;
        while modified {
            iteration += 1;
            if iteration > MAX_SCORE_ITERATIONS {
                info!(
                    "system {}: stopping after {MAX_SCORE_ITERATIONS} iterations",
                    system.id
                );
                break;
            }
            system.errors.clear_step(Step::Translation);
            clean_system(&mut page.arena, system);
            translate_system(&mut page.arena, system)?;
            modified = check(&mut page.arena, system);
        }
    }

    translate_final(page);
    Ok(())
}

/// Cross-system epilog: continuous measure numbering over the whole page
///
/// Runs once on behalf of every system; a page without measures is left
/// untouched.
pub fn translate_final(page: &mut Page) {
    let mut number = 1;
    for system in &mut page.systems {
        for measure in &mut system.measures {
            measure.number = number;
            number += 1;
        }
    }
}

fn is_note_shape(shape: Shape) -> bool {
    let tables = ShapeTables::global();
    tables.notes.contains(shape)
        || tables.note_heads.contains(shape)
        || tables.rests.contains(shape)
}

/// Index of the measure covering an abscissa, clamping to the last measure
fn measure_index(measures: &[Measure], x: i32) -> usize {
    measures
        .iter()
        .position(|measure| measure.right_x().is_none_or(|right| x <= right))
        .unwrap_or(measures.len().saturating_sub(1))
}

fn leftmost_abscissa(arena: &mut GlyphArena, glyphs: &[GlyphId]) -> i32 {
    let mut left: Option<i32> = None;
    for &id in glyphs {
        if let Some(glyph) = arena.get_mut(id) {
            if let Ok(bounds) = glyph.bounds() {
                left = Some(left.map_or(bounds.min[0], |held| held.min(bounds.min[0])));
            }
        }
    }
    left.unwrap_or(0)
}
