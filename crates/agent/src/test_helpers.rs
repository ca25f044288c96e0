//! Scripted providers and tools shared by the agent tests.

use async_trait::async_trait;
use concierge_core::error::{ProviderError, ToolError};
use concierge_core::message::{Message, MessageToolCall};
use concierge_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use concierge_core::tool::{Tool, ToolOutput};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A mock provider that plays back a script of replies.
///
/// Each call to `complete` pops the next entry. Once the script is spent it
/// answers with `fallback` when one is set, and panics otherwise.
pub struct SequentialMockProvider {
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    fallback: Option<ProviderError>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(responses: Vec<ProviderResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    pub fn single_text(text: &str) -> Self {
        Self::replies(vec![make_text_response(text)])
    }

    /// Fails every call with `error`.
    pub fn always(error: ProviderError) -> Self {
        Self {
            fallback: Some(error),
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request seen so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(error) => Err(error.clone()),
            None => panic!("SequentialMockProvider: no more responses (call #{call})"),
        }
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_with_tools("", tool_calls),
        ..make_text_response("")
    }
}

pub fn make_tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

pub fn overflow() -> ProviderError {
    ProviderError::ApiError {
        status_code: 400,
        message: "This model's maximum context length is 128000 tokens".into(),
    }
}

type Handler = Box<dyn Fn(serde_json::Value) -> Result<ToolOutput, ToolError> + Send + Sync>;

/// A tool whose behaviour is a closure over its arguments.
pub struct FnTool {
    name: &'static str,
    handler: Handler,
}

impl FnTool {
    pub fn new(
        name: &'static str,
        handler: impl Fn(serde_json::Value) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "test tool"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        (self.handler)(arguments)
    }
}

/// A provider whose calls never complete.
#[derive(Default)]
pub struct StalledProvider {
    calls: Mutex<usize>,
}

impl StalledProvider {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Provider for StalledProvider {
    fn name(&self) -> &str {
        "stalled_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        std::future::pending().await
    }
}

/// A tool that never answers within any sane timeout.
pub struct StalledTool;

#[async_trait]
impl Tool for StalledTool {
    fn name(&self) -> &str {
        "stalled"
    }

    fn description(&self) -> &str {
        "sleeps for an hour"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(ToolOutput::Text("finally".into()))
    }
}
