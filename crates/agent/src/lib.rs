//! The request pipeline of the travel concierge.
//!
//! For every prompt:
//!
//! 1. **Resolve** the session (or create one seeded with the system prompt)
//! 2. **Budget** the history: compact tool results, cap turns, evict the
//!    oldest pairs until it fits
//! 3. **Dispatch**: call the model, run requested tools, feed results back,
//!    until it answers in text
//! 4. **Recover** once from a context overflow with a minimal history
//! 5. **Reply** with the first successful tool payload, or the text
//!
//! Idle sessions are swept on a timer.

pub mod context;
pub mod loop_runner;
pub mod orchestrator;
pub mod prompt;
pub mod recovery;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{ContextBudget, TruncationReport};
pub use loop_runner::{DispatchLoop, DispatchOutcome, MAX_ROUNDS_REPLY};
pub use orchestrator::{Orchestrator, Reply};
pub use prompt::{FixedPrompt, SystemPrompt, TravelPrompt};
pub use recovery::{Attempt, dispatch_with_recovery};
pub use session::SessionStore;
