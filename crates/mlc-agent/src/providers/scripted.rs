//! Scripted model provider for tests — replays queued replies.
//!
//! Same role as the mock backends in the tool crates: lets driver and
//! e2e tests exercise the full loop without a model endpoint.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AgentMessage, ModelClient, ModelError, ModelReply, ToolCall, ToolSpec};

/// A model that replays queued replies (FIFO) and records requests.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
    /// Message counts seen per turn, for assertions.
    turns: Mutex<Vec<usize>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            turns: Mutex::new(Vec::new()),
        }
    }

    /// Queue a turn that requests tool calls.
    pub fn push_tool_calls(&self, calls: Vec<ToolCall>) {
        self.replies.lock().unwrap().push_back(Ok(ModelReply {
            text: None,
            tool_calls: calls,
        }));
    }

    /// Queue a final-text turn.
    pub fn push_text(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(ModelReply {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }));
    }

    /// Queue an error turn.
    pub fn push_error(&self, err: ModelError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    /// Number of converse calls made so far.
    pub fn turn_count(&self) -> usize {
        self.turns.lock().unwrap().len()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn converse(
        &self,
        _system_prompt: &str,
        messages: &[AgentMessage],
        _tools: &[ToolSpec],
    ) -> Result<ModelReply, ModelError> {
        self.turns.lock().unwrap().push(messages.len());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelError::Api {
                    message: "scripted model has no more replies".into(),
                })
            })
    }

    fn model_id(&self) -> &str {
        "scripted-test-model"
    }
}
