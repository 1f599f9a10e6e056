//! Model providers — the seam between the driver loop and the
//! foundation-model endpoint.
//!
//! Two real providers (Bedrock Converse, OpenAI-compatible chat
//! completions) plus a scripted one for tests.

pub mod bedrock;
pub mod openai;
pub mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mlc_protocol::ToolOutcome;

pub use bedrock::BedrockModel;
pub use openai::OpenAiModel;
pub use scripted::ScriptedModel;

/// Errors from a model provider.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model authentication failed: {message}")]
    Auth { message: String },

    #[error("model endpoint throttled: {message}")]
    Throttled { message: String },

    #[error("model request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("model API error: {message}")]
    Api { message: String },
}

impl ModelError {
    /// Transient failures the driver may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. } | Self::Timeout { .. })
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call ID, echoed back with the result.
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A declared capability passed to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments.
    pub schema: serde_json::Value,
}

/// One entry in the running conversation.
#[derive(Debug, Clone)]
pub enum AgentMessage {
    User(String),
    Assistant {
        text: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    /// Outcomes for a batch of tool calls, keyed by call ID.
    ToolResults(Vec<ToolResultMessage>),
}

/// One tool outcome fed back to the model.
#[derive(Debug, Clone)]
pub struct ToolResultMessage {
    pub call_id: String,
    pub outcome: ToolOutcome,
}

/// One model turn: final text, requested tool calls, or both.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// A conversational model endpoint with tool use.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one model turn over the conversation so far.
    async fn converse(
        &self,
        system_prompt: &str,
        messages: &[AgentMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelReply, ModelError>;

    /// Model identifier for logging and the run report.
    fn model_id(&self) -> &str;
}
