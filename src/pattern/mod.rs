//! Corrective pattern validators
//!
//! A validator inspects one system for a specific misclassification pattern
//! and repairs or demotes the glyphs involved. Validators run as a suite
//! between classification and translation; each reports how many glyphs it
//! modified so the caller knows whether the working set must be purged again.

/// Ledger plausibility validation
pub mod ledger;

use log::info;

use crate::glyph::GlyphArena;
use crate::io::error::Result;
use crate::score::{Step, SystemInfo};

/// A corrective pass over one system's glyph interpretation
pub trait GlyphPattern {
    /// Stable name used in logs
    fn name(&self) -> &'static str;

    /// Inspect the system and repair or demote offending glyphs
    ///
    /// Returns the number of glyphs modified.
    ///
    /// # Errors
    ///
    /// Propagates glyph access and geometry failures.
    fn run(&mut self, arena: &mut GlyphArena, system: &mut SystemInfo) -> Result<usize>;
}

/// Run a suite of validators over one system
///
/// Previous pattern-step errors are dropped first, then each validator runs
/// once in order. Returns the total number of glyph modifications.
///
/// # Errors
///
/// Stops at and propagates the first validator failure.
pub fn run_patterns(
    arena: &mut GlyphArena,
    system: &mut SystemInfo,
    patterns: &mut [&mut dyn GlyphPattern],
) -> Result<usize> {
    system.errors.clear_step(Step::Patterns);

    let mut total = 0;
    for pattern in patterns {
        let modified = pattern.run(arena, system)?;
        if modified > 0 {
            info!(
                "system {}: pattern {} modified {modified} glyphs",
                system.id,
                pattern.name()
            );
        }
        total += modified;
    }
    Ok(total)
}
