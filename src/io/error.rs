//! Error types for glyph interpretation and score assembly

use std::fmt;
use std::path::PathBuf;

use crate::glyph::GlyphId;

/// Main error type for all interpretation operations
#[derive(Debug)]
pub enum OmrError {
    /// Failed to load a page raster from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Geometry requested for a glyph with no pixel membership
    ///
    /// A non-virtual glyph must own at least one foreground pixel; an empty
    /// membership is a contract violation by the segmentation collaborator.
    /// Fatal for that glyph's processing only, never for the system.
    EmptyGlyph {
        /// Identifier of the offending glyph
        glyph: GlyphId,
    },

    /// A glyph identifier does not resolve inside the arena
    UnknownGlyph {
        /// The unresolved identifier
        glyph: GlyphId,
    },

    /// A measure index does not resolve inside its system
    UnknownMeasure {
        /// The unresolved measure index
        index: usize,
        /// Number of measures currently held by the system
        measure_count: usize,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for OmrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::EmptyGlyph { glyph } => {
                write!(f, "Glyph #{glyph} has no pixel membership")
            }
            Self::UnknownGlyph { glyph } => {
                write!(f, "Glyph #{glyph} is not registered in the arena")
            }
            Self::UnknownMeasure {
                index,
                measure_count,
            } => {
                write!(
                    f,
                    "Measure index {index} is out of bounds (system holds {measure_count})"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for OmrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for interpretation results
pub type Result<T> = std::result::Result<T, OmrError>;

impl From<image::ImageError> for OmrError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for OmrError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> OmrError {
    OmrError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_empty_glyph() {
        let err = OmrError::EmptyGlyph { glyph: 17 };
        assert_eq!(err.to_string(), "Glyph #17 has no pixel membership");
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let err = invalid_parameter("interline", &0, &"must be positive");
        match err {
            OmrError::InvalidParameter {
                parameter, value, ..
            } => {
                assert_eq!(parameter, "interline");
                assert_eq!(value, "0");
            }
            _ => unreachable!("Expected InvalidParameter error type"),
        }
    }
}
