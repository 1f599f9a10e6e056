//! Workspace error types.

use mlc_protocol::ErrorKind;
use thiserror::Error;

/// Errors that can occur during workspace file operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The resolved path escapes the sandbox root. Fatal to this one
    /// call only; the run continues.
    #[error("path escapes the sandbox root: {path}")]
    SandboxViolation { path: String },

    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("invalid pattern: {message}")]
    Pattern { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl WorkspaceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Classification for the tool outcome surfaced to the agent.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SandboxViolation { .. } => ErrorKind::SandboxViolation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument { .. } | Self::Pattern { .. } => ErrorKind::InvalidArgument,
            Self::Io { .. } => ErrorKind::Other,
        }
    }
}

/// Convenience alias for workspace results.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
