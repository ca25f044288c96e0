//! Tool trait: the abstraction over the assistant's booking capabilities.
//!
//! Tools are what let the model act: search availability, browse the hotel
//! catalog, look up a property. Each tool parses its own typed input and
//! answers with a [`ToolOutput`], which is rendered to text for the model.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// The typed result of a tool execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// A structured success payload. Rendered with `"success": true`.
    Success(serde_json::Map<String, serde_json::Value>),

    /// A domain-level failure the model should relay or recover from.
    Failure { code: String, message: String },

    /// Free text with no structure.
    Text(String),
}

impl ToolOutput {
    /// Build a success payload. Non-object values are wrapped under `data`.
    pub fn success(payload: serde_json::Value) -> Self {
        match payload {
            serde_json::Value::Object(map) => ToolOutput::Success(map),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".into(), other);
                ToolOutput::Success(map)
            }
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        ToolOutput::Failure {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutput::Success(_))
    }

    /// The payload as the caller sees it, with `success: true` merged in.
    /// `None` for anything but a success.
    pub fn structured(&self) -> Option<serde_json::Value> {
        match self {
            ToolOutput::Success(payload) => {
                let mut map = payload.clone();
                map.insert("success".into(), serde_json::Value::Bool(true));
                Some(serde_json::Value::Object(map))
            }
            _ => None,
        }
    }

    /// Text content of the tool message fed back to the model.
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Success(_) => {
                let value = self.structured().unwrap_or_default();
                serde_json::to_string_pretty(&value).unwrap_or_default()
            }
            ToolOutput::Failure { code, message } => {
                let value = serde_json::json!({
                    "success": false,
                    "error": { "code": code, "message": message }
                });
                serde_json::to_string_pretty(&value).unwrap_or_default()
            }
            ToolOutput::Text(text) => text.clone(),
        }
    }
}

/// Deserialize tool arguments into the tool's typed input.
pub fn parse_arguments<T: DeserializeOwned>(arguments: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// The core Tool trait.
///
/// Tools are registered in the [`ToolRegistry`] and made available to the
/// dispatch loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "search_accommodation").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// An ordered registry of available tools.
///
/// The model-facing catalog is built once at registration time, so the
/// dispatch loop never re-derives schemas per call.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name in place.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let definition = tool.to_definition();
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => {
                self.tools[idx] = tool;
                self.definitions[idx] = definition;
            }
            None => {
                self.tools.push(tool);
                self.definitions.push(definition);
            }
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// The tool catalog, in registration order.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
