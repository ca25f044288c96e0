//! In-memory session store.
//!
//! Sessions live only as long as the process. Each entry is replaced or
//! removed whole under the write lock, so a sweep never sees half a session.

use chrono::{DateTime, Utc};
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::message::{Session, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::prompt::SystemPrompt;

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    prompt: Arc<dyn SystemPrompt>,
}

impl SessionStore {
    pub fn new(prompt: Arc<dyn SystemPrompt>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            prompt,
        }
    }

    /// Fetch a snapshot of the session, creating it when the id is unknown.
    ///
    /// A missing or empty id gets a fresh UUID. An unknown id is adopted as
    /// is. The boolean is `true` when the session was created here.
    pub async fn resolve(&self, id: Option<&str>) -> (Session, bool) {
        let id = match id.filter(|id| !id.is_empty()) {
            Some(id) => SessionId::from(id),
            None => SessionId::new(),
        };

        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(&id) {
            return (session.clone(), false);
        }

        let session = Session::new(id.clone(), self.prompt.render(Utc::now()));
        debug!(session_id = %id, "Session created");
        sessions.insert(id, session.clone());
        (session, true)
    }

    /// Replace the stored session with `session`.
    pub async fn save(&self, session: Session) {
        self.sessions.write().await.insert(session.id.clone(), session);
    }

    /// Mark a session as active now.
    pub async fn touch(&self, id: &SessionId) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.touch();
        }
    }

    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop every session idle for longer than `max_idle`. Returns how many
    /// were removed.
    pub async fn sweep(&self, now: DateTime<Utc>, max_idle: chrono::Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(now, max_idle));
        before - sessions.len()
    }

    /// Run [`sweep`](Self::sweep) every `interval` until the task is aborted.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        max_idle: Duration,
        events: Arc<EventBus>,
    ) -> JoinHandle<()> {
        let max_idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.sweep(Utc::now(), max_idle).await;
                if removed > 0 {
                    let remaining = self.len().await;
                    info!(removed, remaining, "Expired idle sessions");
                    events.publish(DomainEvent::SessionsExpired {
                        count: removed,
                        remaining,
                        timestamp: Utc::now(),
                    });
                }
            }
        })
    }
}
