//! AWS Bedrock provider — Converse API with tool use.
//!
//! Model-agnostic: the Converse API works with Claude, Nova, and other
//! tool-capable Bedrock models without per-model request shapes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ConverseOutput, InferenceConfiguration, Message,
    SystemContentBlock, Tool, ToolConfiguration, ToolInputSchema, ToolResultBlock,
    ToolResultContentBlock, ToolResultStatus, ToolSpecification, ToolUseBlock,
};
use aws_smithy_types::{Document, Number};
use tokio::time::timeout;

use super::{AgentMessage, ModelClient, ModelError, ModelReply, ToolCall, ToolSpec};
use crate::config::InferenceParams;

/// Configuration for the Bedrock provider.
#[derive(Debug, Clone)]
pub struct BedrockModelConfig {
    /// Bedrock model ID (e.g., "us.anthropic.claude-sonnet-4-20250514-v1:0").
    pub model_id: String,
    pub inference: InferenceParams,
    /// Per-request timeout. Deep turns with large contexts are slow.
    pub request_timeout: Duration,
}

/// Bedrock Converse API provider.
pub struct BedrockModel {
    client: BedrockClient,
    config: BedrockModelConfig,
}

impl BedrockModel {
    /// Create a provider with a pre-built Bedrock client.
    pub fn new(client: BedrockClient, config: BedrockModelConfig) -> Self {
        if config.inference.prompt_caching {
            tracing::info!(model_id = %config.model_id, "prompt caching requested");
        }
        Self { client, config }
    }
}

#[async_trait]
impl ModelClient for BedrockModel {
    async fn converse(
        &self,
        system_prompt: &str,
        messages: &[AgentMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelReply, ModelError> {
        let result = timeout(
            self.config.request_timeout,
            self.call_converse(system_prompt, messages, tools),
        )
        .await;

        match result {
            Ok(reply) => reply,
            Err(_) => Err(ModelError::Timeout {
                seconds: self.config.request_timeout.as_secs(),
            }),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

impl BedrockModel {
    async fn call_converse(
        &self,
        system_prompt: &str,
        messages: &[AgentMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelReply, ModelError> {
        let inference = InferenceConfiguration::builder()
            .temperature(self.config.inference.temperature)
            .max_tokens(self.config.inference.max_tokens)
            .top_p(self.config.inference.top_p)
            .build();

        let tool_config = build_tool_config(tools)?;

        let mut request = self
            .client
            .converse()
            .model_id(&self.config.model_id)
            .system(SystemContentBlock::Text(system_prompt.to_string()))
            .inference_config(inference)
            .tool_config(tool_config);
        for message in messages {
            request = request.messages(to_bedrock_message(message)?);
        }

        let response = request.send().await.map_err(classify)?;

        let Some(ConverseOutput::Message(msg)) = response.output() else {
            return Err(ModelError::Api {
                message: "no message in converse response".into(),
            });
        };

        let mut reply = ModelReply::default();
        let mut text_parts = Vec::new();
        for block in msg.content() {
            match block {
                ContentBlock::Text(t) => text_parts.push(t.clone()),
                ContentBlock::ToolUse(tool_use) => reply.tool_calls.push(ToolCall {
                    id: tool_use.tool_use_id().to_string(),
                    name: tool_use.name().to_string(),
                    arguments: document_to_json(tool_use.input()),
                }),
                _ => {}
            }
        }
        if !text_parts.is_empty() {
            reply.text = Some(text_parts.join("\n"));
        }
        Ok(reply)
    }
}

// ── Request construction ──────────────────────────────────────

fn build_tool_config(tools: &[ToolSpec]) -> Result<ToolConfiguration, ModelError> {
    let mut builder = ToolConfiguration::builder();
    for spec in tools {
        let specification = ToolSpecification::builder()
            .name(&spec.name)
            .description(&spec.description)
            .input_schema(ToolInputSchema::Json(json_to_document(&spec.schema)))
            .build()
            .map_err(|e| ModelError::Api {
                message: format!("failed to build tool spec '{}': {e}", spec.name),
            })?;
        builder = builder.tools(Tool::ToolSpec(specification));
    }
    builder.build().map_err(|e| ModelError::Api {
        message: format!("failed to build tool configuration: {e}"),
    })
}

fn to_bedrock_message(message: &AgentMessage) -> Result<Message, ModelError> {
    let builder = match message {
        AgentMessage::User(text) => Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(text.clone())),
        AgentMessage::Assistant { text, tool_calls } => {
            let mut b = Message::builder().role(ConversationRole::Assistant);
            if let Some(t) = text {
                b = b.content(ContentBlock::Text(t.clone()));
            }
            for call in tool_calls {
                let block = ToolUseBlock::builder()
                    .tool_use_id(&call.id)
                    .name(&call.name)
                    .input(json_to_document(&call.arguments))
                    .build()
                    .map_err(|e| ModelError::Api {
                        message: format!("failed to build tool use block: {e}"),
                    })?;
                b = b.content(ContentBlock::ToolUse(block));
            }
            b
        }
        AgentMessage::ToolResults(results) => {
            let mut b = Message::builder().role(ConversationRole::User);
            for result in results {
                let payload = serde_json::to_value(&result.outcome).unwrap_or_default();
                let status = if result.outcome.success {
                    ToolResultStatus::Success
                } else {
                    ToolResultStatus::Error
                };
                let block = ToolResultBlock::builder()
                    .tool_use_id(&result.call_id)
                    .content(ToolResultContentBlock::Json(json_to_document(&payload)))
                    .status(status)
                    .build()
                    .map_err(|e| ModelError::Api {
                        message: format!("failed to build tool result block: {e}"),
                    })?;
                b = b.content(ContentBlock::ToolResult(block));
            }
            b
        }
    };
    builder.build().map_err(|e| ModelError::Api {
        message: format!("failed to build message: {e}"),
    })
}

// ── Document conversion ───────────────────────────────────────

/// JSON value → smithy Document (tool schemas and arguments).
pub(crate) fn json_to_document(value: &serde_json::Value) -> Document {
    match value {
        serde_json::Value::Null => Document::Null,
        serde_json::Value::Bool(b) => Document::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(Number::NegInt(i))
            } else {
                Document::Number(Number::Float(n.as_f64().unwrap_or(0.0)))
            }
        }
        serde_json::Value::String(s) => Document::String(s.clone()),
        serde_json::Value::Array(items) => {
            Document::Array(items.iter().map(json_to_document).collect())
        }
        serde_json::Value::Object(map) => {
            let converted: HashMap<String, Document> = map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_document(v)))
                .collect();
            Document::Object(converted)
        }
    }
}

/// Smithy Document → JSON value (tool arguments from the model).
pub(crate) fn document_to_json(doc: &Document) -> serde_json::Value {
    match doc {
        Document::Null => serde_json::Value::Null,
        Document::Bool(b) => serde_json::Value::Bool(*b),
        Document::Number(Number::PosInt(u)) => serde_json::json!(u),
        Document::Number(Number::NegInt(i)) => serde_json::json!(i),
        Document::Number(Number::Float(f)) => serde_json::json!(f),
        Document::String(s) => serde_json::Value::String(s.clone()),
        Document::Array(items) => {
            serde_json::Value::Array(items.iter().map(document_to_json).collect())
        }
        Document::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_to_json(v)))
                .collect(),
        ),
    }
}

/// Classify a Bedrock SDK failure.
fn classify<E, R>(err: SdkError<E, R>) -> ModelError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().unwrap_or_default();
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("bedrock converse failed: {err}"));
    if code.contains("Throttl") || code == "TooManyRequestsException" {
        ModelError::Throttled { message }
    } else if code.contains("AccessDenied")
        || code.contains("Unauthorized")
        || code.contains("ExpiredToken")
        || code == "UnrecognizedClientException"
    {
        ModelError::Auth { message }
    } else {
        ModelError::Api { message }
    }
}
