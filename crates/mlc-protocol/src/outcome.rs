//! Tool invocation outcomes and the error-kind taxonomy.

use serde::{Deserialize, Serialize};

/// Classification of a tool failure.
///
/// The calling agent routes on this: `Throttled` is the only retryable
/// kind; `AccessDenied` is fatal to the operation; `NotFound` is a
/// finding, not a failure of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or invalid credentials, or the caller lacks permission.
    AccessDenied,
    /// The named resource does not exist.
    NotFound,
    /// Rate limit / throttling from the upstream API.
    Throttled,
    /// Malformed or out-of-range arguments. Never reaches the network.
    InvalidArgument,
    /// A workspace path escaped the sandbox root.
    SandboxViolation,
    /// The operation exceeded its time bound.
    Timeout,
    /// Anything else.
    Other,
}

impl ErrorKind {
    /// Whether a failure of this kind is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::NotFound => "not_found",
            Self::Throttled => "throttled",
            Self::InvalidArgument => "invalid_argument",
            Self::SandboxViolation => "sandbox_violation",
            Self::Timeout => "timeout",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of executing one tool call.
///
/// Every tool returns this fixed shape — never a raw passthrough of the
/// upstream API response — so the calling agent and the tests can rely
/// on stable field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Tool name that produced this outcome.
    pub tool_name: String,
    /// Whether the tool execution succeeded.
    pub success: bool,
    /// Structured result data (JSON) with the tool's documented key set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Error message if success is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error classification if success is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ToolOutcome {
    pub fn success(
        tool_name: impl Into<String>,
        data: serde_json::Value,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            data: Some(data),
            summary: Some(summary.into()),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(
        tool_name: impl Into<String>,
        kind: ErrorKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            data: None,
            summary: None,
            error: Some(error.into()),
            error_kind: Some(kind),
        }
    }
}
