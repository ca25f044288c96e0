//! The tool dispatch loop.
//!
//! Call the model with the history and the tool catalog. If it asks for
//! tools, run them, append one tool message per request and call it again.
//! Stop when it answers with plain text or the round cap is hit.

use chrono::Utc;
use concierge_core::error::{ProviderError, ToolError};
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::message::{Message, MessageToolCall};
use concierge_core::provider::{Provider, ProviderRequest};
use concierge_core::tool::{ToolOutput, ToolRegistry};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::context::token::{estimate_messages_tokens, estimate_tools_tokens};

/// Final answer when the model keeps asking for tools past the round cap.
pub const MAX_ROUNDS_REPLY: &str = "I've reached the maximum number of tool rounds for this request. \
     Please refine your request or provide further guidance.";

/// Result of one completed dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// The model's closing text.
    pub text: String,

    /// The first successful tool payload of the whole loop, if any.
    pub structured: Option<Value>,

    /// Model calls made.
    pub rounds: u32,
}

/// Drives model calls and tool execution for one request.
pub struct DispatchLoop {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    max_rounds: u32,
    model_timeout: Duration,
    tool_timeout: Duration,
    event_bus: Arc<EventBus>,
}

/// What one tool request turned into.
struct Executed {
    content: String,
    structured: Option<Value>,
}

impl DispatchLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_rounds: 10,
            model_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(30),
            event_bus,
        }
    }

    /// Cap on model calls per dispatch.
    pub fn with_max_rounds(mut self, max: u32) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the loop over `messages`, appending the assistant tool requests and
    /// tool results as it goes. The closing text is returned, not appended.
    pub async fn run(&self, messages: &mut Vec<Message>) -> Result<DispatchOutcome, ProviderError> {
        let tools = self.tools.definitions().to_vec();
        let tool_tokens = estimate_tools_tokens(&tools);
        let mut structured: Option<Value> = None;
        let mut round = 0;

        loop {
            round += 1;

            if round > self.max_rounds {
                warn!(
                    rounds = self.max_rounds,
                    "Max tool rounds reached, forcing text response"
                );
                return Ok(DispatchOutcome {
                    text: MAX_ROUNDS_REPLY.into(),
                    structured,
                    rounds: self.max_rounds,
                });
            }

            debug!(
                round,
                messages = messages.len(),
                estimated_tokens = estimate_messages_tokens(messages) + tool_tokens,
                "Calling model"
            );

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tools.clone(),
            };

            let response = tokio::time::timeout(self.model_timeout, self.provider.complete(request))
                .await
                .map_err(|_| {
                    ProviderError::Timeout(format!(
                        "model call exceeded {}s",
                        self.model_timeout.as_secs()
                    ))
                })??;

            if response.message.tool_calls.is_empty() {
                info!(rounds = round, structured = structured.is_some(), "Dispatch complete");
                return Ok(DispatchOutcome {
                    text: response.message.content,
                    structured,
                    rounds: round,
                });
            }

            let calls = response.message.tool_calls.clone();
            debug!(tool_count = calls.len(), "Executing tool calls");
            messages.push(response.message);

            let results = join_all(calls.iter().map(|call| self.execute(call))).await;
            for (call, executed) in calls.iter().zip(results) {
                if structured.is_none() {
                    structured = executed.structured;
                }
                messages.push(Message::tool_result(&call.id, executed.content));
            }
        }
    }

    async fn execute(&self, call: &MessageToolCall) -> Executed {
        let start = Instant::now();
        let result = self.invoke(call).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: call.name.clone(),
            success: matches!(&result, Ok(output) if output.is_success()),
            duration_ms,
            timestamp: Utc::now(),
        });

        match result {
            Ok(output) => {
                debug!(tool = %call.name, duration_ms, success = output.is_success(), "Tool finished");
                Executed {
                    content: output.render(),
                    structured: output.structured(),
                }
            }
            Err(message) => {
                warn!(tool = %call.name, error = %message, "Tool call failed");
                Executed {
                    content: serde_json::json!({ "error": message }).to_string(),
                    structured: None,
                }
            }
        }
    }

    async fn invoke(&self, call: &MessageToolCall) -> Result<ToolOutput, String> {
        let Some(tool) = self.tools.get(&call.name) else {
            return Err(format!("Unknown function: {}", call.name));
        };
        let arguments = parse_call_arguments(&call.arguments).map_err(|e| e.to_string())?;

        match tokio::time::timeout(self.tool_timeout, tool.execute(arguments)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(ToolError::Timeout {
                tool_name: call.name.clone(),
                timeout_secs: self.tool_timeout.as_secs(),
            }
            .to_string()),
        }
    }
}

/// Decode the model's raw argument string. An empty string means no
/// arguments.
fn parse_call_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}
