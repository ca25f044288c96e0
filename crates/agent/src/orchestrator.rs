//! Request handling: one prompt in, one reply out.

use chrono::Utc;
use concierge_config::AppConfig;
use concierge_core::error::Error;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::message::{Message, SessionId};
use concierge_core::provider::Provider;
use concierge_core::tool::ToolRegistry;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::context::ContextBudget;
use crate::loop_runner::DispatchLoop;
use crate::prompt::{FixedPrompt, SystemPrompt, TravelPrompt};
use crate::recovery::dispatch_with_recovery;
use crate::session::SessionStore;

/// The answer to one prompt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub session_id: SessionId,
    /// The first successful tool payload when there was one, otherwise the
    /// model's text as a JSON string.
    pub response: Value,
}

pub struct Orchestrator {
    sessions: Arc<SessionStore>,
    budget: ContextBudget,
    dispatch: DispatchLoop,
    persist_overflow_reset: bool,
    event_bus: Arc<EventBus>,
}

impl Orchestrator {
    pub fn new(sessions: Arc<SessionStore>, dispatch: DispatchLoop, event_bus: Arc<EventBus>) -> Self {
        Self {
            sessions,
            budget: ContextBudget::default(),
            dispatch,
            persist_overflow_reset: true,
            event_bus,
        }
    }

    /// Wire everything up from configuration.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let prompt: Arc<dyn SystemPrompt> = match &config.assistant.system_prompt_override {
            Some(text) => Arc::new(FixedPrompt(text.clone())),
            None => Arc::new(TravelPrompt),
        };
        let dispatch = DispatchLoop::new(
            provider,
            config.default_model.clone(),
            config.default_temperature,
            tools,
            event_bus.clone(),
        )
        .with_max_tokens(config.default_max_tokens)
        .with_max_rounds(config.agent.max_rounds)
        .with_model_timeout(Duration::from_secs(config.agent.model_timeout_secs))
        .with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_secs));

        Self::new(Arc::new(SessionStore::new(prompt)), dispatch, event_bus)
            .with_budget(ContextBudget::from_config(&config.context))
            .with_persist_overflow_reset(config.agent.persist_overflow_reset)
    }

    pub fn with_budget(mut self, budget: ContextBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Whether an overflow reset is written back to the session.
    pub fn with_persist_overflow_reset(mut self, persist: bool) -> Self {
        self.persist_overflow_reset = persist;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Answer `prompt` within the session named by `session_id`, creating the
    /// session when needed.
    ///
    /// The user turn is stored before the model is called, so it stays in
    /// the session even when the request fails. Tool traffic is scratch
    /// state and only the closing assistant text is stored.
    pub async fn handle(&self, prompt: &str, session_id: Option<&str>) -> Result<Reply, Error> {
        let (mut session, created) = self.sessions.resolve(session_id).await;
        let session_id = session.id.clone();

        info!(session_id = %session_id, new_session = created, "Handling prompt");
        self.event_bus.publish(DomainEvent::RequestReceived {
            session_id: session_id.to_string(),
            new_session: created,
            timestamp: Utc::now(),
        });

        let user = Message::user(prompt);
        session.push(user.clone());

        let report = self.budget.apply(&mut session.messages);
        if report.changed() {
            info!(
                session_id = %session_id,
                before = report.messages_before,
                after = report.messages_after,
                compacted = report.compacted,
                estimated_tokens = report.estimated_tokens,
                "Session history truncated"
            );
            self.event_bus.publish(DomainEvent::ContextTruncated {
                session_id: session_id.to_string(),
                messages_before: report.messages_before,
                messages_after: report.messages_after,
                estimated_tokens: report.estimated_tokens,
                timestamp: Utc::now(),
            });
        }
        self.sessions.save(session.clone()).await;

        let minimal = session
            .system_message()
            .cloned()
            .into_iter()
            .chain([user])
            .collect();
        let attempt = dispatch_with_recovery(&self.dispatch, &session.messages, minimal).await;

        if let Some(reset) = attempt.reset {
            if attempt.result.is_ok() {
                self.event_bus.publish(DomainEvent::OverflowRecovered {
                    session_id: session_id.to_string(),
                    timestamp: Utc::now(),
                });
            }
            if self.persist_overflow_reset {
                session.messages = reset;
                session.touch();
                self.sessions.save(session.clone()).await;
            }
        }

        let outcome = attempt.result.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Prompt failed");
            Error::Provider(e)
        })?;

        session.push(Message::assistant(outcome.text.clone()));
        self.sessions.save(session).await;

        self.event_bus.publish(DomainEvent::ResponseGenerated {
            session_id: session_id.to_string(),
            model: self.dispatch.model().to_string(),
            rounds: outcome.rounds,
            structured: outcome.structured.is_some(),
            timestamp: Utc::now(),
        });

        let response = outcome.structured.unwrap_or(Value::String(outcome.text));
        Ok(Reply { session_id, response })
    }
}
