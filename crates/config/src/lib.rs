//! Configuration loading, validation, and management for Concierge.
//!
//! Loads configuration from `~/.concierge/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.concierge/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per model response (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Context budget limits
    #[serde(default)]
    pub context: ContextConfig,

    /// Session lifecycle
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Dispatch loop bounds
    #[serde(default)]
    pub agent: AgentConfig,

    /// REST travel-data backend
    #[serde(default)]
    pub travel_api: TravelApiConfig,

    /// System prompt settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("gateway", &self.gateway)
            .field("context", &self.context)
            .field("sessions", &self.sessions)
            .field("agent", &self.agent)
            .field("travel_api", &self.travel_api)
            .field("assistant", &self.assistant)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Limits applied to a session's history before every model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Token ceiling for system message + history (estimated)
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,

    /// Tool messages longer than this are compacted
    #[serde(default = "default_max_tool_result_chars")]
    pub max_tool_result_chars: usize,

    /// Exchanges kept before the oldest are dropped (2 messages each)
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Leading result entries kept when a result list is summarized
    #[serde(default = "default_summary_results")]
    pub summary_results: usize,
}

fn default_max_context_tokens() -> usize {
    100_000
}
fn default_max_tool_result_chars() -> usize {
    8_000
}
fn default_max_turns() -> usize {
    10
}
fn default_summary_results() -> usize {
    3
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
            max_tool_result_chars: default_max_tool_result_chars(),
            max_turns: default_max_turns(),
            summary_results: default_summary_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_max_idle")]
    pub max_idle_secs: u64,
}

fn default_sweep_interval() -> u64 {
    300
}
fn default_max_idle() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            max_idle_secs: default_max_idle(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model calls allowed per request before the loop gives up
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    #[serde(default = "default_model_timeout")]
    pub model_timeout_secs: u64,

    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// Write the minimal history back to the session after an overflow retry
    #[serde(default = "default_true")]
    pub persist_overflow_reset: bool,
}

fn default_max_rounds() -> u32 {
    10
}
fn default_model_timeout() -> u64 {
    120
}
fn default_tool_timeout() -> u64 {
    30
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            model_timeout_secs: default_model_timeout(),
            tool_timeout_secs: default_tool_timeout(),
            persist_overflow_reset: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelApiConfig {
    #[serde(default = "default_travel_api_url")]
    pub base_url: String,

    #[serde(default = "default_travel_api_timeout")]
    pub timeout_ms: u64,
}

fn default_travel_api_url() -> String {
    "http://localhost:3001".into()
}
fn default_travel_api_timeout() -> u64 {
    30_000
}

impl Default for TravelApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_travel_api_url(),
            timeout_ms: default_travel_api_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Replace the built-in travel prompt entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.concierge/config.toml).
    ///
    /// Environment variables override file values:
    /// - `CONCIERGE_API_KEY`, then `OPENAI_API_KEY`
    /// - `CONCIERGE_PROVIDER`, `CONCIERGE_MODEL`
    /// - `PORT`
    /// - `REST_API_BASE_URL`, `REST_API_TIMEOUT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`, then re-validate.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("CONCIERGE_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(provider) = lookup("CONCIERGE_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("CONCIERGE_MODEL") {
            self.default_model = model;
        }

        if let Some(port) = lookup("PORT") {
            self.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("PORT is not a valid port: {port}")))?;
        }

        if let Some(url) = lookup("REST_API_BASE_URL") {
            self.travel_api.base_url = url;
        }

        if let Some(timeout) = lookup("REST_API_TIMEOUT") {
            self.travel_api.timeout_ms = timeout.parse().map_err(|_| {
                ConfigError::ValidationError(format!("REST_API_TIMEOUT must be milliseconds: {timeout}"))
            })?;
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".concierge")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.context.max_context_tokens == 0
            || self.context.max_tool_result_chars == 0
            || self.context.max_turns == 0
        {
            return Err(ConfigError::ValidationError(
                "context limits must all be greater than 0".into(),
            ));
        }

        if self.agent.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_rounds must be at least 1".into(),
            ));
        }

        if self.sessions.sweep_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.sweep_interval_secs must be greater than 0".into(),
            ));
        }

        if !self.travel_api.base_url.starts_with("http://")
            && !self.travel_api.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(
                "travel_api.base_url must start with http:// or https://".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: None,
            gateway: GatewayConfig::default(),
            context: ContextConfig::default(),
            sessions: SessionConfig::default(),
            agent: AgentConfig::default(),
            travel_api: TravelApiConfig::default(),
            assistant: AssistantConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
