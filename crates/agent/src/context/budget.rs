//! Keeps a session's history inside the model's input window.
//!
//! Three passes, always in this order, over everything after the system
//! message:
//!
//! 1. oversized tool results are compacted (summarized when they carry a
//!    known result list, otherwise cut at the ceiling),
//! 2. the suffix is capped at `2 × max_turns` messages,
//! 3. the oldest pair is evicted until the estimate fits or only one pair
//!    remains.
//!
//! The system message is never touched.

use concierge_config::ContextConfig;
use concierge_core::message::{Message, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::token::estimate_messages_tokens;

/// Appended to a tool result that was cut at the ceiling.
pub const TRUNCATION_MARKER: &str = "\n... [truncated]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBudget {
    pub max_context_tokens: usize,
    pub max_tool_result_chars: usize,
    pub max_turns: usize,
    pub summary_results: usize,
}

/// What a budget pass did to a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationReport {
    pub messages_before: usize,
    pub messages_after: usize,
    pub compacted: usize,
    pub estimated_tokens: usize,
}

impl TruncationReport {
    pub fn changed(&self) -> bool {
        self.compacted > 0 || self.messages_before != self.messages_after
    }
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}

impl ContextBudget {
    pub fn from_config(config: &ContextConfig) -> Self {
        Self {
            max_context_tokens: config.max_context_tokens,
            max_tool_result_chars: config.max_tool_result_chars,
            max_turns: config.max_turns,
            summary_results: config.summary_results,
        }
    }

    /// Run all three passes over `messages` in place.
    pub fn apply(&self, messages: &mut Vec<Message>) -> TruncationReport {
        let messages_before = messages.len();
        let start = usize::from(messages.first().is_some_and(|m| m.role == Role::System));

        let mut compacted = 0;
        for message in messages[start..].iter_mut().filter(|m| m.role == Role::Tool) {
            if let Some(content) = self.compact_tool_result(&message.content) {
                message.content = content;
                compacted += 1;
            }
        }

        let cap = (self.max_turns * 2).max(2);
        let suffix = messages.len() - start;
        if suffix > cap {
            messages.drain(start..start + (suffix - cap));
        }

        let mut estimated_tokens = estimate_messages_tokens(messages);
        while estimated_tokens > self.max_context_tokens && messages.len() - start > 2 {
            messages.drain(start..start + 2);
            estimated_tokens = estimate_messages_tokens(messages);
        }

        TruncationReport {
            messages_before,
            messages_after: messages.len(),
            compacted,
            estimated_tokens,
        }
    }

    /// Shrink one tool result. `None` when it is already within the ceiling
    /// or cannot be made shorter.
    pub fn compact_tool_result(&self, content: &str) -> Option<String> {
        if content.len() <= self.max_tool_result_chars {
            return None;
        }

        if let Some(summary) = self.summarize(content)
            && summary.len() <= self.max_tool_result_chars
        {
            return Some(summary);
        }

        let keep = floor_char_boundary(
            content,
            self.max_tool_result_chars.saturating_sub(TRUNCATION_MARKER.len()),
        );
        let cut = format!("{}{TRUNCATION_MARKER}", &content[..keep]);
        (cut.len() < content.len()).then_some(cut)
    }

    fn summarize(&self, content: &str) -> Option<String> {
        let list: ResultList = serde_json::from_str(content).ok()?;
        if !list.success {
            return None;
        }

        let total = list.results_count.unwrap_or(list.results.len());
        let results: Vec<SummaryEntry> = list
            .results
            .into_iter()
            .take(self.summary_results)
            .map(SummaryEntry::from)
            .collect();
        let note = (total > results.len())
            .then(|| format!("Showing {} of {total} results", results.len()));

        let summary = ResultSummary {
            success: true,
            search_id: list.search_id,
            results_count: total,
            results,
            note,
        };
        serde_json::to_string_pretty(&summary).ok()
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// A successful tool payload carrying a list of results.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultList {
    success: bool,
    #[serde(default)]
    search_id: Option<Value>,
    #[serde(default)]
    results_count: Option<usize>,
    results: Vec<ResultEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultEntry {
    #[serde(default)]
    result_id: Option<Value>,
    #[serde(default)]
    hotel_code: Option<Value>,
    #[serde(default)]
    hotel: Option<EntryHotel>,
    #[serde(default)]
    room_name: Option<Value>,
    #[serde(default)]
    total_price: Option<Value>,
    #[serde(default)]
    refundable: Option<Value>,
}

#[derive(Deserialize)]
struct EntryHotel {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    stars: Option<Value>,
    #[serde(default)]
    location: Option<EntryLocation>,
}

#[derive(Deserialize)]
struct EntryLocation {
    #[serde(default)]
    city: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultSummary {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_id: Option<Value>,
    results_count: usize,
    results: Vec<SummaryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    result_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hotel_code: Option<Value>,
    hotel: Option<SummaryHotel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_price: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refundable: Option<Value>,
}

#[derive(Serialize)]
struct SummaryHotel {
    name: Option<Value>,
    stars: Option<Value>,
    city: Option<Value>,
}

impl From<ResultEntry> for SummaryEntry {
    fn from(entry: ResultEntry) -> Self {
        Self {
            result_id: entry.result_id,
            hotel_code: entry.hotel_code,
            hotel: entry.hotel.map(|h| SummaryHotel {
                name: h.name,
                stars: h.stars,
                city: h.location.and_then(|l| l.city),
            }),
            room_name: entry.room_name,
            total_price: entry.total_price,
            refundable: entry.refundable,
        }
    }
}
