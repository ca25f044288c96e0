//! One-shot recovery from a context overflow.
//!
//! When the model rejects the history as too large, the dispatch is retried
//! exactly once from a minimal history: the system message and the current
//! user turn. Anything else, or a second failure, goes back to the caller.

use concierge_core::error::ProviderError;
use concierge_core::message::Message;
use tracing::warn;

use crate::loop_runner::{DispatchLoop, DispatchOutcome};

/// The result of a dispatch plus the history it was reset to, if it was.
#[derive(Debug)]
pub struct Attempt {
    pub result: Result<DispatchOutcome, ProviderError>,
    pub reset: Option<Vec<Message>>,
}

/// Run `dispatch` over a copy of `history`, falling back to `minimal` once on
/// overflow.
pub async fn dispatch_with_recovery(
    dispatch: &DispatchLoop,
    history: &[Message],
    minimal: Vec<Message>,
) -> Attempt {
    let mut working = history.to_vec();
    let error = match dispatch.run(&mut working).await {
        Err(e) if e.is_context_overflow() => e,
        result => return Attempt { result, reset: None },
    };

    warn!(
        error = %error,
        history = history.len(),
        "Context overflow, retrying with system prompt and current turn only"
    );
    let mut working = minimal.clone();
    Attempt {
        result: dispatch.run(&mut working).await,
        reset: Some(minimal),
    }
}
