//! Shared fixtures for agent integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use marketeer_agent::ToolTrait;
use marketeer_provider::{ChatParams, ChatResponse, Provider, ProviderError, ToolCall};

mock! {
    pub Provider {}

    #[async_trait]
    impl Provider for Provider {
        async fn chat(&self, params: ChatParams) -> Result<ChatResponse, ProviderError>;
        fn default_model(&self) -> String;
        fn is_configured(&self) -> bool;
    }
}

/// Mock with the model lookup stubbed out
pub fn mock_provider() -> MockProvider {
    let mut mock = MockProvider::new();
    mock.expect_default_model()
        .return_const("qwen-max".to_string());
    mock.expect_is_configured().return_const(true);
    mock
}

pub fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

pub fn tool_reply(calls: Vec<ToolCall>) -> Result<ChatResponse, ProviderError> {
    Ok(ChatResponse::with_tool_calls(calls))
}

/// Records every invocation and answers with a fixed text
pub struct RecordingTool {
    name: String,
    reply: String,
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTool {
    pub fn new(name: &str, reply: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: reply.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ToolTrait for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Records its arguments"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"note": {"type": "string"}},
            "required": []
        })
    }

    async fn execute(
        &self,
        args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.calls.lock().unwrap().push(args);
        Ok(self.reply.clone())
    }
}

/// Always fails with the given message
pub struct FailingTool {
    pub message: String,
}

#[async_trait]
impl ToolTrait for FailingTool {
    fn name(&self) -> &str {
        "flaky"
    }

    fn description(&self) -> &str {
        "Fails every time"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(
        &self,
        _args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Err(self.message.clone().into())
    }
}
