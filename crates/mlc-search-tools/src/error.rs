//! Search error types.

use mlc_protocol::ErrorKind;
use thiserror::Error;

/// Errors that can occur during internet search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search API authentication failed: {message}")]
    Auth { message: String },

    #[error("search API throttled: {message}")]
    Throttled { message: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("search request timed out")]
    Timeout,

    #[error("search API error: {message}")]
    Api { message: String },
}

impl SearchError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// Classification for the tool outcome surfaced to the agent.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::AccessDenied,
            Self::Throttled { .. } => ErrorKind::Throttled,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Timeout => ErrorKind::Timeout,
            Self::Api { .. } => ErrorKind::Other,
        }
    }
}

/// Convenience alias for search results.
pub type SearchResult<T> = Result<T, SearchError>;
