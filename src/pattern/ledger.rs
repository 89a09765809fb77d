//! Ledger plausibility validation
//!
//! A short horizontal stick is only a ledger if it serves a note: it must
//! touch a stem or a note-bearing glyph, be part of a full-width line, or
//! gain a note neighbor through compound re-evaluation. Sticks that fail all
//! three are demoted back to unclassified.

use log::debug;

use crate::glyph::compound::{CompoundAdapter, build_compound};
use crate::glyph::{Classifier, GlyphArena, GlyphId, Shape, ShapeTables};
use crate::io::configuration::{INTER_CHUNK_DX, INTER_CHUNK_DY, LEDGER_NOTE_MIN_GRADE};
use crate::io::error::{OmrError, Result};
use crate::pattern::GlyphPattern;
use crate::score::{Scale, SystemInfo};
use crate::spatial::BoundingBox;

/// Collaborator deciding whether a stick spans a full staff-width line
///
/// Full-width horizontal lines are legitimate even without a note neighbor;
/// only the component that built the system's line network can tell them
/// apart from stray ledger chunks.
pub trait LineBuilder {
    /// Whether the glyph is part of a staff-spanning horizontal line
    fn is_full_ledger(&self, arena: &GlyphArena, glyph: GlyphId) -> bool;
}

/// Validator demoting ledger sticks that serve no note
pub struct LedgerValidator<'a> {
    classifier: &'a dyn Classifier,
    line_builder: &'a dyn LineBuilder,
}

impl<'a> LedgerValidator<'a> {
    /// Create a validator over the given classifier and line network
    pub const fn new(
        classifier: &'a dyn Classifier,
        line_builder: &'a dyn LineBuilder,
    ) -> Self {
        Self {
            classifier,
            line_builder,
        }
    }

    fn has_note_neighbor(arena: &GlyphArena, pool: &[GlyphId], ledger: GlyphId) -> bool {
        let Some(ledger_glyph) = arena.get(ledger) else {
            return false;
        };
        let neighbors = &ShapeTables::global().ledger_neighbors;
        pool.iter().any(|&other| {
            if other == ledger || arena.ancestor_of(other) != other {
                return false;
            }
            arena.get(other).is_some_and(|glyph| {
                glyph.shape().is_some_and(|shape| {
                    shape == Shape::Stem || neighbors.contains(shape)
                }) && ledger_glyph.touches(glyph)
            })
        })
    }
}

impl GlyphPattern for LedgerValidator<'_> {
    fn name(&self) -> &'static str {
        "ledger"
    }

    fn run(&mut self, arena: &mut GlyphArena, system: &mut SystemInfo) -> Result<usize> {
        let pool = system.glyphs.clone();
        let mut modified = 0;

        for staff in &mut system.staves {
            let scale = Scale::new(staff.interline);
            let rows: Vec<i32> = staff.ledger_map.keys().copied().collect();

            for row in rows {
                let ids: Vec<GlyphId> = staff
                    .ledger_map
                    .get(&row)
                    .map(|set| set.iter().copied().collect())
                    .unwrap_or_default();

                for id in ids {
                    // Absorbed or retagged entries are stale bookkeeping
                    let still_ledger = arena.ancestor_of(id) == id
                        && arena
                            .get(id)
                            .is_some_and(|g| g.shape() == Some(Shape::Ledger));
                    if !still_ledger {
                        if let Some(set) = staff.ledger_map.get_mut(&row) {
                            set.remove(&id);
                        }
                        continue;
                    }

                    if Self::has_note_neighbor(arena, &pool, id) {
                        continue;
                    }
                    if self.line_builder.is_full_ledger(arena, id) {
                        continue;
                    }

                    let excluded = staff
                        .ledger_map
                        .get(&row)
                        .cloned()
                        .unwrap_or_default();
                    let adapter = LedgerAdapter { scale, excluded };
                    let repaired =
                        build_compound(arena, self.classifier, id, false, &pool, &adapter)?;
                    if repaired.is_some() {
                        continue;
                    }

                    debug!("demoting isolated ledger #{id} on row {row}");
                    if let Some(glyph) = arena.get_mut(id) {
                        glyph.set_shape(None);
                    }
                    if let Some(set) = staff.ledger_map.get_mut(&row) {
                        set.remove(&id);
                    }
                    modified += 1;
                }

                if staff
                    .ledger_map
                    .get(&row)
                    .is_some_and(std::collections::BTreeSet::is_empty)
                {
                    staff.ledger_map.remove(&row);
                }
            }
        }

        Ok(modified)
    }
}

/// Compound policy hunting for a note next to a lone ledger
struct LedgerAdapter {
    scale: Scale,
    excluded: std::collections::BTreeSet<GlyphId>,
}

impl CompoundAdapter for LedgerAdapter {
    fn reference_box(&self, arena: &mut GlyphArena, seed: GlyphId) -> Result<BoundingBox> {
        let stop = arena
            .get_mut(seed)
            .ok_or(OmrError::UnknownGlyph { glyph: seed })?
            .stop_point()?;
        Ok(BoundingBox::new(stop, stop).grow(
            self.scale.to_pixels(INTER_CHUNK_DX),
            self.scale.to_pixels(INTER_CHUNK_DY),
        ))
    }

    fn is_shape_admissible(&self, shape: Shape) -> bool {
        ShapeTables::global().ledger_neighbors.contains(shape)
    }

    fn min_grade(&self) -> f64 {
        LEDGER_NOTE_MIN_GRADE
    }

    fn is_candidate_suitable(&self, arena: &GlyphArena, candidate: GlyphId) -> bool {
        if self.excluded.contains(&candidate) {
            return false;
        }
        // Barlines and other persistent shapes never fold into a note
        !arena.get(candidate).is_some_and(|glyph| {
            glyph
                .shape()
                .is_some_and(|shape| ShapeTables::global().persistent.contains(shape))
        })
    }
}
