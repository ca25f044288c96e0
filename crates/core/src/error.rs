//! Error types for the Concierge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Concierge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error means the model rejected the input as too large.
    pub fn is_context_overflow(&self) -> bool {
        matches!(self, Error::Provider(e) if e.is_context_overflow())
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Message fragments the upstream model APIs use when the prompt is too long.
const CONTEXT_OVERFLOW_MARKERS: &[&str] = &[
    "maximum context length",
    "too many tokens",
    "context_length_exceeded",
];

/// Returns true when `message` reads like a context-window rejection.
pub fn mentions_context_overflow(message: &str) -> bool {
    let lower = message.to_lowercase();
    CONTEXT_OVERFLOW_MARKERS.iter().any(|m| lower.contains(m))
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Input exceeds the model's context window: {0}")]
    ContextOverflow(String),

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether the model refused the request because the history is too long.
    ///
    /// Besides the dedicated variant, any provider message carrying one of the
    /// well-known overflow phrases counts, since some backends only report it
    /// as a generic 400.
    pub fn is_context_overflow(&self) -> bool {
        match self {
            ProviderError::ContextOverflow(_) => true,
            ProviderError::ApiError { message, .. }
            | ProviderError::AuthenticationFailed(message)
            | ProviderError::NotConfigured(message)
            | ProviderError::Timeout(message)
            | ProviderError::Network(message) => mentions_context_overflow(message),
            ProviderError::RateLimited { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
