//! Token estimation and the per-session context budget.

pub mod budget;
pub mod token;

pub use budget::{ContextBudget, TRUNCATION_MARKER, TruncationReport};
