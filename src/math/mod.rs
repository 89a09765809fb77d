//! Mathematical utilities for shape description

/// Least-squares circle approximation
pub mod circle;
/// Statistical shape moments
pub mod moments;
