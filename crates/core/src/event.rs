//! Domain event system: decoupled observation of the orchestration engine.
//!
//! The agent publishes events as requests move through session resolution,
//! truncation, dispatch, and recovery. Subscribers (logging sinks, tests,
//! the CLI) react without coupling to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A prompt arrived for a session
    RequestReceived {
        session_id: String,
        new_session: bool,
        timestamp: DateTime<Utc>,
    },

    /// The budget manager dropped or compacted history before a model call
    ContextTruncated {
        session_id: String,
        messages_before: usize,
        messages_after: usize,
        estimated_tokens: usize,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The model rejected the history as too large and the request was retried
    OverflowRecovered {
        session_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The agent produced the final answer for a request
    ResponseGenerated {
        session_id: String,
        model: String,
        rounds: u32,
        structured: bool,
        timestamp: DateTime<Utc>,
    },

    /// The sweeper removed idle sessions
    SessionsExpired {
        count: usize,
        remaining: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
