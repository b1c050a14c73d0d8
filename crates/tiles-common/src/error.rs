//! Error types shared across the tiling pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TilesError.
pub type TilesResult<T> = Result<T, TilesError>;

/// Primary error type for tiling operations.
#[derive(Debug, Error)]
pub enum TilesError {
    /// A required input array file does not exist.
    ///
    /// Fatal for surface/upper-air fields; attention layers are skipped
    /// with a warning instead.
    #[error("missing input file: {0}")]
    MissingInput(PathBuf),

    /// Non-positive chunk size, empty time label, or similar bad
    /// configuration. Never silently clamped.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A requested attention-layer index falls outside the network.
    #[error("layer index {index} out of range (network has {total} layers)")]
    LayerIndexOutOfRange { index: usize, total: usize },

    /// An array does not have the shape the operation requires.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Directory creation or file read/write failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Inventory serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TilesError {
    /// Create an Io error tagged with the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this error should skip the current attention layer
    /// rather than abort the whole (date, time) unit.
    pub fn is_layer_skippable(&self) -> bool {
        matches!(
            self,
            TilesError::MissingInput(_) | TilesError::ShapeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_path() {
        let err = TilesError::io(
            "/data/bin/2018-01-01",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/data/bin/2018-01-01"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_layer_skippable() {
        assert!(TilesError::MissingInput(PathBuf::from("x.npy")).is_layer_skippable());
        assert!(TilesError::shape_mismatch("5-D", "3-D").is_layer_skippable());
        assert!(!TilesError::InvalidConfiguration("chunk 0".into()).is_layer_skippable());
        assert!(!TilesError::LayerIndexOutOfRange { index: 16, total: 16 }.is_layer_skippable());
    }
}
