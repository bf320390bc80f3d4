//! Error types for metadata resolution

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that can occur while resolving a source URL
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Empty or malformed source URL, or an unusable country code.
    /// Never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport failure, timeout or non-2xx status on every attempt
    #[error("Resolution provider unavailable after {attempts} attempt(s): {reason}")]
    UpstreamUnavailable { attempts: u32, reason: String },

    /// 2xx response whose payload is not usable (bad JSON, no main entity)
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ResolveError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ResolveError::InvalidInput(_))
    }

    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(self, ResolveError::UpstreamUnavailable { .. })
    }
}
