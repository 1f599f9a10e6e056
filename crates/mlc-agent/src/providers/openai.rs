//! OpenAI-compatible provider — chat completions with function tools.
//!
//! Works against api.openai.com or any endpoint speaking the same wire
//! format; the base URL is injectable so tests run against a mock
//! server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AgentMessage, ModelClient, ModelError, ModelReply, ToolCall, ToolSpec};
use crate::config::InferenceParams;

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAiModelConfig {
    /// Model name (e.g., "gpt-4o").
    pub model_id: String,
    pub inference: InferenceParams,
    /// Per-request timeout. Deep turns with large contexts are slow.
    pub request_timeout: Duration,
    /// API base URL, default "https://api.openai.com".
    pub base_url: String,
}

impl OpenAiModelConfig {
    pub fn new(model_id: impl Into<String>, inference: InferenceParams) -> Self {
        Self {
            model_id: model_id.into(),
            inference,
            request_timeout: Duration::from_secs(12_000),
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

// ── Wire types ────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: i32,
    top_p: f32,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireCallFunction,
}

#[derive(Serialize, Deserialize)]
struct WireCallFunction {
    name: String,
    /// JSON-encoded argument object.
    arguments: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

/// OpenAI-compatible chat completions provider.
pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: String,
    config: OpenAiModelConfig,
}

impl OpenAiModel {
    pub fn new(api_key: impl Into<String>, config: OpenAiModelConfig) -> Result<Self, ModelError> {
        if config.inference.prompt_caching {
            tracing::info!(model_id = %config.model_id, "prompt caching requested");
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ModelError::Api {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiModel {
    async fn converse(
        &self,
        system_prompt: &str,
        messages: &[AgentMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelReply, ModelError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let mut wire_messages = vec![WireMessage {
            role: "system",
            content: Some(system_prompt.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }];
        for message in messages {
            append_wire_messages(&mut wire_messages, message);
        }

        let body = ChatRequest {
            model: &self.config.model_id,
            temperature: self.config.inference.temperature,
            max_tokens: self.config.inference.max_tokens,
            top_p: self.config.inference.top_p,
            messages: wire_messages,
            tools: tools
                .iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.schema,
                    },
                })
                .collect(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        seconds: self.config.request_timeout.as_secs(),
                    }
                } else {
                    ModelError::Api {
                        message: format!("chat request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ModelError::Auth {
                message: format!("model API returned {status}"),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ModelError::Throttled {
                message: "model API rate limit exceeded".into(),
            });
        }
        if !status.is_success() {
            return Err(ModelError::Api {
                message: format!("model API returned {status}"),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| ModelError::Api {
            message: format!("failed to parse chat response: {e}"),
        })?;
        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(ModelError::Api {
                message: "chat response has no choices".into(),
            });
        };

        let mut reply = ModelReply {
            text: choice.message.content.filter(|c| !c.is_empty()),
            tool_calls: Vec::new(),
        };
        for call in choice.message.tool_calls {
            let arguments =
                serde_json::from_str(&call.function.arguments).map_err(|e| ModelError::Api {
                    message: format!(
                        "tool call '{}' has malformed arguments: {e}",
                        call.function.name
                    ),
                })?;
            reply.tool_calls.push(ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            });
        }
        Ok(reply)
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

fn append_wire_messages(out: &mut Vec<WireMessage>, message: &AgentMessage) {
    match message {
        AgentMessage::User(text) => out.push(WireMessage {
            role: "user",
            content: Some(text.clone()),
            tool_calls: None,
            tool_call_id: None,
        }),
        AgentMessage::Assistant { text, tool_calls } => {
            let wire_calls = (!tool_calls.is_empty()).then(|| {
                tool_calls
                    .iter()
                    .map(|c| WireToolCall {
                        id: c.id.clone(),
                        kind: "function".to_string(),
                        function: WireCallFunction {
                            name: c.name.clone(),
                            arguments: c.arguments.to_string(),
                        },
                    })
                    .collect()
            });
            out.push(WireMessage {
                role: "assistant",
                content: text.clone(),
                tool_calls: wire_calls,
                tool_call_id: None,
            });
        }
        AgentMessage::ToolResults(results) => {
            for result in results {
                let content = serde_json::to_string(&result.outcome).unwrap_or_default();
                out.push(WireMessage {
                    role: "tool",
                    content: Some(content),
                    tool_calls: None,
                    tool_call_id: Some(result.call_id.clone()),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_for(server: &MockServer) -> OpenAiModel {
        let mut config = OpenAiModelConfig::new("gpt-4o", InferenceParams::default());
        config.base_url = server.uri();
        config.request_timeout = Duration::from_secs(2);
        OpenAiModel::new("sk-test", config).unwrap()
    }

    fn chat_body(message: serde_json::Value) -> serde_json::Value {
        json!({"choices": [{"message": message}]})
    }

    #[tokio::test]
    async fn final_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(
                json!({"role": "assistant", "content": "# Executive Summary\nAll quiet."}),
            )))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let reply = model
            .converse("system", &[AgentMessage::User("analyze".into())], &[])
            .await
            .unwrap();
        assert!(reply.tool_calls.is_empty());
        assert!(reply.text.unwrap().starts_with("# Executive Summary"));
    }

    #[tokio::test]
    async fn tool_call_arguments_are_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_abc",
                    "type": "function",
                    "function": {
                        "name": "list_training_jobs",
                        "arguments": "{\"days\": 30}"
                    }
                }]
            }))))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let reply = model
            .converse("system", &[AgentMessage::User("analyze".into())], &[])
            .await
            .unwrap();
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name, "list_training_jobs");
        assert_eq!(reply.tool_calls[0].arguments["days"], 30);
    }

    #[tokio::test]
    async fn unauthorized_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model
            .converse("system", &[AgentMessage::User("q".into())], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Auth { .. }));
    }

    #[tokio::test]
    async fn rate_limit_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model
            .converse("system", &[AgentMessage::User("q".into())], &[])
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn malformed_tool_arguments_surface_as_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(json!({
                "role": "assistant",
                "tool_calls": [{
                    "id": "call_bad",
                    "type": "function",
                    "function": {"name": "read_file", "arguments": "{not json"}
                }]
            }))))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model
            .converse("system", &[AgentMessage::User("q".into())], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Api { .. }));
    }
}
