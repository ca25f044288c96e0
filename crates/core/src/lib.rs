//! # Concierge Core
//!
//! Domain types, traits, and error definitions for the Concierge travel
//! assistant. This crate has **no framework dependencies**: it defines the
//! model that the provider, tool, agent, and gateway crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: conversation messages and per-session state
//! - [`provider`]: the model-invocation abstraction
//! - [`tool`]: tool trait, typed tool outputs, and the registry
//! - [`event`]: broadcast bus for domain events
//! - [`error`]: error taxonomy shared by every crate

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, MessageToolCall, Role, Session, SessionId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolOutput, ToolRegistry};
