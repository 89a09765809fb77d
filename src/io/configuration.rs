//! Tuning constants for glyph interpretation and translation
//!
//! All geometric tolerances are expressed as interline fractions and converted
//! to pixels through [`crate::score::Scale`] at the point of use.

/// Maximum number of clean/translate/check iterations per system
pub const MAX_SCORE_ITERATIONS: usize = 2;

// Dot role resolution tolerances
/// Maximum dx between a note right edge and an augmentation dot
pub const MAX_AUGMENTATION_DOT_DX: f64 = 1.7;
/// Maximum absolute dy between a note right edge and an augmentation dot
pub const MAX_AUGMENTATION_DOT_DY: f64 = 1.0;
/// Margin for the vertical position of a dot against a repeat barline
pub const MAX_REPEAT_DOT_DY: f64 = 0.5;
/// Maximum dx between a dot and the edge of a repeat barline
pub const MAX_REPEAT_DOT_DX: f64 = 1.5;
/// Maximum dx between a note center and a staccato dot
pub const MAX_STACCATO_DOT_DX: f64 = 0.5;
/// Maximum absolute dy between a note center and a staccato dot
pub const MAX_STACCATO_DOT_DY: f64 = 3.0;

// Ledger validation tolerances
/// Maximum horizontal distance between ledger chunks
pub const INTER_CHUNK_DX: f64 = 1.5;
/// Maximum vertical distance between ledger chunks
pub const INTER_CHUNK_DY: f64 = 0.2;
/// Minimum classifier grade for a ledger/note compound repair
pub const LEDGER_NOTE_MIN_GRADE: f64 = 0.3;

// Chord assembly
/// Maximum dx between note glyph centers grouped into one chord
pub const CHORD_GROUP_DX: f64 = 0.5;

// Raster defaults
/// Intensity value used for background pixels in fresh buffers
pub const BACKGROUND: u8 = 255;
/// Default foreground threshold: intensities at or below are foreground
pub const FOREGROUND_THRESHOLD: u8 = 140;

// Safety limit for ancestor resolution over corrupt merge chains
/// Maximum length of a compound membership chain
pub const MAX_MERGE_DEPTH: usize = 64;
