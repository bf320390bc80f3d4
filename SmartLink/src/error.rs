//! Pipeline error type

use smlartifact::ArtifactError;
use smlresolver::ResolveError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error of a pipeline operation. Stage errors pass through unchanged.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Error category, for callers mapping failures onto their own responses
/// (HTTP statuses, exit codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    UpstreamUnavailable,
    MalformedResponse,
    Filesystem,
    NotFound,
    /// Renderer or HTTP client setup failure
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Resolve(ResolveError::InvalidInput(_)) => ErrorKind::InvalidInput,
            Error::Resolve(ResolveError::UpstreamUnavailable { .. }) => ErrorKind::UpstreamUnavailable,
            Error::Resolve(ResolveError::MalformedResponse(_)) => ErrorKind::MalformedResponse,
            Error::Resolve(ResolveError::Http(_)) => ErrorKind::Internal,
            Error::Artifact(ArtifactError::InvalidInput { .. }) => ErrorKind::InvalidInput,
            Error::Artifact(ArtifactError::Filesystem { .. }) => ErrorKind::Filesystem,
            Error::Artifact(ArtifactError::NotFound(_)) => ErrorKind::NotFound,
            Error::Artifact(ArtifactError::Render(_)) => ErrorKind::Internal,
        }
    }
}
