//! Glyph interpretation and iterative score assembly for optical music
//! recognition
//!
//! The crate turns classified pixel regions (glyphs) into score structure.
//! A [`score::Page`] owns every glyph in a [`glyph::GlyphArena`] plus its
//! detected systems; corrective [`pattern`] validators repair or demote
//! implausible glyphs, then [`translate::translate_page`] iterates each
//! system through clean, translate and check passes until the
//! interpretation converges, and finally numbers measures across systems.
//!
//! Glyph features ([`glyph::Geometry`]) are pure functions of pixel
//! membership, computed lazily and invalidated as a bundle; ambiguous dots
//! compete for augmentation, repeat and staccato roles by squared distance
//! ([`score::dot`]). Recoverable inconsistencies land in per-system error
//! sinks instead of aborting the page.

#![forbid(unsafe_code)]

pub mod glyph;
pub mod io;
pub mod math;
pub mod pattern;
pub mod raster;
pub mod score;
pub mod spatial;
pub mod translate;

pub use io::error::{OmrError, Result};
