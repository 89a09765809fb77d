//! Error handling and crate-wide tuning constants

/// Tuning constants (tolerances, iteration caps, raster defaults)
pub mod configuration;
/// Error taxonomy and result alias
pub mod error;
