//! Score structural entities and per-system state
//!
//! Entities are rebuilt from scratch at the start of every translation
//! iteration and refined during it; only a converged structure is retained.
//! All cross-entity references are index-based (measure/chord/articulation
//! indices within a system) so a rebuild can never leave dangling pointers.

/// Consistency checks over a freshly translated system
pub mod checker;
/// Dot role resolution
pub mod dot;

use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::glyph::{GlyphArena, GlyphId, Shape};
use crate::spatial::BoundingBox;

/// Physical scale of a staff context
///
/// Converts interline fractions (the unit of every geometric tolerance) to
/// pixel distances.
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    interline: u32,
}

impl Scale {
    /// Create a scale from the staff interline (clamped to at least 1 pixel)
    pub const fn new(interline: u32) -> Self {
        Self {
            interline: if interline == 0 { 1 } else { interline },
        }
    }

    /// The interline in pixels
    pub const fn interline(&self) -> u32 {
        self.interline
    }

    /// Convert an interline fraction to a pixel distance, rounded
    pub fn to_pixels(&self, fraction: f64) -> i32 {
        (fraction * f64::from(self.interline)).round() as i32
    }
}

/// One staff of a system: vertical placement plus the ledger bookkeeping
#[derive(Debug)]
pub struct StaffInfo {
    /// Ordinate of the middle staff line
    pub mid_y: i32,
    /// Staff interline in pixels
    pub interline: u32,
    /// Candidate ledgers per row index (+1 below the staff, -1 above, ...)
    pub ledger_map: BTreeMap<i32, BTreeSet<GlyphId>>,
}

impl StaffInfo {
    /// Create a staff at the given middle-line ordinate
    pub const fn new(mid_y: i32, interline: u32) -> Self {
        Self {
            mid_y,
            interline,
            ledger_map: BTreeMap::new(),
        }
    }

    /// Vertical position in staff-line units (0 = middle line, +2 = line below)
    pub fn pitch_position(&self, y: i32) -> f64 {
        f64::from(y - self.mid_y) / (f64::from(self.interline) / 2.0)
    }

    /// Record a candidate ledger glyph on the given row
    pub fn add_ledger(&mut self, row: i32, glyph: GlyphId) {
        self.ledger_map.entry(row).or_default().insert(glyph);
    }
}

/// A pitched or rest symbol inside a chord
#[derive(Debug, Clone, Copy)]
pub struct Note {
    /// Translating glyph
    pub glyph: GlyphId,
    /// Shape the note was built from
    pub shape: Shape,
    /// Absolute bounds of the translating glyph
    pub bounds: BoundingBox,
}

impl Note {
    /// Whether this note is a rest of any duration
    pub const fn is_rest(&self) -> bool {
        self.shape.is_rest()
    }

    /// Whether this note is specifically a whole rest
    pub const fn is_whole_rest(&self) -> bool {
        self.shape.is_whole_rest()
    }

    /// Geometric center of the note
    pub const fn center(&self) -> [i32; 2] {
        self.bounds.center()
    }

    /// Right-center reference point (augmentation dots attach here)
    pub const fn center_right(&self) -> [i32; 2] {
        [self.bounds.max[0], self.bounds.center()[1]]
    }
}

/// A group of simultaneous notes with an augmentation dot count
#[derive(Debug, Default)]
pub struct Chord {
    /// Member notes, top to bottom
    pub notes: Vec<Note>,
    /// Number of committed augmentation dots
    pub dots: u32,
    /// Glyphs owned by this chord beyond the note glyphs (e.g. dots)
    pub glyphs: Vec<GlyphId>,
}

impl Chord {
    /// Attach an auxiliary glyph (an augmentation dot) to this chord
    pub fn add_glyph(&mut self, glyph: GlyphId) {
        self.glyphs.push(glyph);
    }
}

/// A vertical measure separator with physical extents
#[derive(Debug)]
pub struct Barline {
    /// Translating glyph
    pub glyph: GlyphId,
    /// Leftmost abscissa of the barline ink
    pub left_x: i32,
    /// Rightmost abscissa of the barline ink
    pub right_x: i32,
    /// Auxiliary glyphs accumulated on the barline (e.g. repeat dots)
    pub glyphs: Vec<GlyphId>,
}

impl Barline {
    /// Attach an auxiliary glyph (a repeat dot) to this barline
    pub fn add_glyph(&mut self, glyph: GlyphId) {
        self.glyphs.push(glyph);
    }
}

/// An articulation mark tying a glyph, a chord and a location together
#[derive(Debug, Clone, Copy)]
pub struct Articulation {
    /// Articulation shape (staccato for now)
    pub shape: Shape,
    /// Translating glyph
    pub glyph: GlyphId,
    /// Index of the articulated chord within the measure
    pub chord: usize,
    /// Absolute location of the mark
    pub location: [i32; 2],
}

/// An ordered slice of a system between two barlines
#[derive(Debug)]
pub struct Measure {
    /// Page-wide measure number, assigned by the cross-system epilog
    pub number: usize,
    /// Leftmost abscissa covered by the measure
    pub left_x: i32,
    /// Trailing barline, if the measure is closed by one
    pub barline: Option<Barline>,
    /// Member chords, left to right
    pub chords: Vec<Chord>,
    /// Articulation marks committed in this measure
    pub articulations: Vec<Articulation>,
    /// Ordinate of the middle line of the measure's staff
    pub staff_mid_y: i32,
}

impl Measure {
    /// Rightmost abscissa: the trailing barline's right edge, if closed
    pub fn right_x(&self) -> Option<i32> {
        self.barline.as_ref().map(|barline| barline.right_x)
    }
}

/// Processing step an error was recorded by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Pattern validation (pre-translation corrective pass)
    Patterns,
    /// Glyph-to-score translation
    Translation,
}

/// One recoverable error recorded against a system
#[derive(Debug)]
pub struct ErrorRecord {
    /// Step that recorded the error
    pub step: Step,
    /// Offending glyph, when the error is glyph-scoped
    pub glyph: Option<GlyphId>,
    /// Human-readable description
    pub message: String,
}

/// Per-system, step-scoped error sink
///
/// System-scoped by construction, so parallel system processing needs no
/// shared sink.
#[derive(Debug, Default)]
pub struct ErrorSink {
    records: Vec<ErrorRecord>,
}

impl ErrorSink {
    /// Record an error against an optional glyph
    pub fn report(&mut self, step: Step, glyph: Option<GlyphId>, message: impl Into<String>) {
        let message = message.into();
        warn!("{step:?}: {message} (glyph {glyph:?})");
        self.records.push(ErrorRecord {
            step,
            glyph,
            message,
        });
    }

    /// Drop the records of one step, preserving every other step's records
    pub fn clear_step(&mut self, step: Step) {
        self.records.retain(|record| record.step != step);
    }

    /// All records, in report order
    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Number of records for one step
    pub fn count_for(&self, step: Step) -> usize {
        self.records
            .iter()
            .filter(|record| record.step == step)
            .count()
    }
}

/// One detected staff system, the unit of independent translation
#[derive(Debug)]
pub struct SystemInfo {
    /// System index on the page
    pub id: usize,
    scale: Scale,
    /// Active glyph working set
    pub glyphs: Vec<GlyphId>,
    /// Member staves, top to bottom
    pub staves: Vec<StaffInfo>,
    /// Derived measures, rebuilt on every translation iteration
    pub measures: Vec<Measure>,
    /// System-scoped error sink
    pub errors: ErrorSink,
}

impl SystemInfo {
    /// Create an empty system with the given physical scale
    pub const fn new(id: usize, scale: Scale) -> Self {
        Self {
            id,
            scale,
            glyphs: Vec::new(),
            staves: Vec::new(),
            measures: Vec::new(),
            errors: ErrorSink {
                records: Vec::new(),
            },
        }
    }

    /// The system's physical scale
    pub const fn scale(&self) -> Scale {
        self.scale
    }

    /// Add a glyph to the working set
    pub fn add_glyph(&mut self, glyph: GlyphId) {
        self.glyphs.push(glyph);
    }

    /// Purge glyphs that are no longer active
    ///
    /// A glyph absorbed into a compound is replaced by its ancestor; glyphs
    /// left without a shape (demoted by a validator) are dropped. Returns the
    /// number of entries removed.
    pub fn remove_inactive_glyphs(&mut self, arena: &GlyphArena) -> usize {
        let before = self.glyphs.len();
        let mut seen = BTreeSet::new();
        let mut active = Vec::with_capacity(before);
        for &id in &self.glyphs {
            let ancestor = arena.ancestor_of(id);
            if !seen.insert(ancestor) {
                continue;
            }
            if arena.get(ancestor).is_some_and(|g| g.shape().is_some()) {
                active.push(ancestor);
            }
        }
        self.glyphs = active;
        before - self.glyphs.len()
    }
}

/// A full page: the glyph arena plus its detected systems
#[derive(Debug, Default)]
pub struct Page {
    /// Owner of every glyph on the page
    pub arena: GlyphArena,
    /// Detected systems, top to bottom
    pub systems: Vec<SystemInfo>,
}

impl Page {
    /// Create an empty page
    pub const fn new() -> Self {
        Self {
            arena: GlyphArena::new(),
            systems: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_conversion_rounds() {
        let scale = Scale::new(16);
        assert_eq!(scale.to_pixels(1.5), 24);
        assert_eq!(scale.to_pixels(0.2), 3);
        assert_eq!(Scale::new(0).interline(), 1);
    }

    #[test]
    fn test_pitch_position_is_signed_half_interlines() {
        let staff = StaffInfo::new(100, 16);
        assert!((staff.pitch_position(100)).abs() < f64::EPSILON);
        assert!((staff.pitch_position(108) - 1.0).abs() < f64::EPSILON);
        assert!((staff.pitch_position(84) + 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_note_flags_and_reference_points() {
        let head = Note {
            glyph: 0,
            shape: Shape::NoteheadBlack,
            bounds: BoundingBox::new([10, 20], [19, 29]),
        };
        assert!(!head.is_rest());
        assert_eq!(head.center(), [14, 24]);
        assert_eq!(head.center_right(), [19, 24]);

        let rest = Note {
            glyph: 1,
            shape: Shape::WholeRest,
            bounds: BoundingBox::new([0, 0], [3, 3]),
        };
        assert!(rest.is_rest());
        assert!(rest.is_whole_rest());
    }

    #[test]
    fn test_error_sink_is_step_scoped() {
        let mut sink = ErrorSink::default();
        sink.report(Step::Patterns, Some(3), "ledger demoted");
        sink.report(Step::Translation, None, "dot unassigned");
        sink.report(Step::Translation, Some(5), "dot unassigned");
        assert_eq!(sink.count_for(Step::Translation), 2);

        sink.clear_step(Step::Translation);
        assert_eq!(sink.count_for(Step::Translation), 0);
        assert_eq!(sink.count_for(Step::Patterns), 1);
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_inactive_purge_keeps_shaped_ancestors() {
        let mut arena = GlyphArena::new();
        let a = arena.register(vec![[0, 0]], 10);
        let b = arena.register(vec![[1, 0]], 10);
        let shapeless = arena.register(vec![[9, 9]], 10);
        let merged = arena.merge(&[a, b], 10);
        assert!(merged.is_ok_and(|merged| {
            if let Some(glyph) = arena.get_mut(merged) {
                glyph.set_shape(Some(Shape::NoteheadBlack));
            }
            let mut system = SystemInfo::new(0, Scale::new(10));
            system.add_glyph(a);
            system.add_glyph(b);
            system.add_glyph(shapeless);
            let removed = system.remove_inactive_glyphs(&arena);
            removed == 2 && system.glyphs == vec![merged]
        }));
    }
}
