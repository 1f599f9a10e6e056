//! AWS tool error types.

use mlc_protocol::ErrorKind;
use thiserror::Error;

/// Errors that can occur during AWS data-access operations.
///
/// Upstream SDK failures are classified into these variants at the
/// `SdkAwsApi` boundary — raw transport wording never leaks past it.
#[derive(Debug, Error)]
pub enum AwsToolError {
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    #[error("resource not found: {resource}")]
    NotFound { resource: String },

    #[error("throttled: {message}")]
    Throttled { message: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("AWS API error: {message}")]
    Api { message: String },
}

impl AwsToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether the failure is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// Classification for the tool outcome surfaced to the agent.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Throttled { .. } => ErrorKind::Throttled,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Api { .. } => ErrorKind::Other,
        }
    }
}

/// Convenience alias for AWS tool results.
pub type AwsResult<T> = Result<T, AwsToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability_matches_kind() {
        let throttled = AwsToolError::Throttled {
            message: "rate exceeded".into(),
        };
        assert!(throttled.is_retryable());
        assert!(throttled.kind().is_retryable());

        let denied = AwsToolError::AccessDenied {
            message: "no sagemaker:ListEndpoints".into(),
        };
        assert!(!denied.is_retryable());
        assert_eq!(denied.kind(), ErrorKind::AccessDenied);
    }
}
