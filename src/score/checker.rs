//! Consistency checks over a freshly translated system
//!
//! Each check either repairs the glyph interpretation (forcing another
//! translation iteration) or records a recoverable error and moves on. The
//! repair path only ever removes information, so repeated runs converge.

use log::debug;

use crate::glyph::{GlyphArena, GlyphId, Shape};
use crate::score::{Step, SystemInfo};

/// Run every structural check on a translated system
///
/// Returns `true` when a check modified the glyph interpretation, meaning
/// the system must be cleaned and translated again.
pub fn check_system(arena: &mut GlyphArena, system: &mut SystemInfo) -> bool {
    let mut modified = false;
    let mut demotions: Vec<GlyphId> = Vec::new();

    // A repeat sign needs two dots; a lone one is a misread
    for measure in &system.measures {
        if let Some(barline) = &measure.barline {
            let repeat_dots: Vec<GlyphId> = barline
                .glyphs
                .iter()
                .copied()
                .filter(|&id| {
                    arena
                        .get(id)
                        .is_some_and(|g| g.shape() == Some(Shape::RepeatDots))
                })
                .collect();
            if repeat_dots.len() == 1 {
                demotions.extend(repeat_dots);
            }
        }
    }
    for glyph_id in demotions {
        if let Some(glyph) = arena.get_mut(glyph_id) {
            glyph.set_shape(None);
        }
        system.errors.report(
            Step::Translation,
            Some(glyph_id),
            "Single repeat dot on a barline",
        );
        modified = true;
    }

    // Augmentation beyond a single dot is out of scope; clamp and report
    for (measure_idx, measure) in system.measures.iter_mut().enumerate() {
        for chord in &mut measure.chords {
            if chord.dots > 1 {
                debug!(
                    "measure {measure_idx}: clamping {} augmentation dots",
                    chord.dots
                );
                chord.dots = 1;
                system.errors.report(
                    Step::Translation,
                    None,
                    format!("Multiple augmentation dots in measure {measure_idx}"),
                );
            }
        }
    }

    modified
}
