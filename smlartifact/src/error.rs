//! Error types for artifact generation

use std::path::PathBuf;
use thiserror::Error;

/// Result type for smlartifact operations
pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Errors raised while generating or managing SmartLink artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Metadata or slugs rejected before any side effect
    #[error("Invalid input, missing or unusable fields: {}", .missing_fields.join(", "))]
    InvalidInput { missing_fields: Vec<&'static str> },

    /// Write, mkdir or unlink failure
    #[error("Filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact requested for reading does not exist
    #[error("Artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The template renderer refused the context
    #[error("Render error: {0}")]
    Render(String),
}

impl ArtifactError {
    pub fn invalid_input(missing_fields: Vec<&'static str>) -> Self {
        Self::InvalidInput { missing_fields }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
