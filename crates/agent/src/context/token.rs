//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 bytes of text per token, rounded up,
//! plus a fixed per-message overhead for role and framing. Good enough to
//! keep a conversation comfortably under the model's window; the model's own
//! rejection is the authoritative signal.

use concierge_core::message::Message;
use concierge_core::provider::ToolDefinition;

/// Fixed cost charged for every message on top of its text.
pub const MESSAGE_OVERHEAD: usize = 10;

/// Estimate the token count for a string. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Estimate tokens for a single message, tool-call requests included.
pub fn estimate_message_tokens(message: &Message) -> usize {
    let calls: usize = message
        .tool_calls
        .iter()
        .map(|call| estimate_tokens(&call.name) + estimate_tokens(&call.arguments))
        .sum();
    MESSAGE_OVERHEAD + estimate_tokens(&message.content) + calls
}

/// Estimate tokens for a slice of messages.
pub fn estimate_messages_tokens(messages: &[Message]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}

/// Estimate tokens for the tool catalog sent alongside the history.
pub fn estimate_tools_tokens(tools: &[ToolDefinition]) -> usize {
    tools
        .iter()
        .map(|tool| estimate_tokens(&serde_json::to_string(tool).unwrap_or_default()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::message::MessageToolCall;

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn rounds_up() {
        assert_eq!(estimate_tokens("test"), 1);
        assert_eq!(estimate_tokens("hello"), 2);
        assert_eq!(estimate_tokens(&"a".repeat(100)), 25);
    }

    #[test]
    fn message_includes_overhead() {
        let msg = Message::user("test"); // 1 token + 10 overhead
        assert_eq!(estimate_message_tokens(&msg), 11);
    }

    #[test]
    fn tool_call_arguments_are_counted() {
        let msg = Message::assistant_with_tools(
            "",
            vec![MessageToolCall {
                id: "call_1".into(),
                name: "abcd".into(),
                arguments: "x".repeat(40),
            }],
        );
        assert_eq!(estimate_message_tokens(&msg), 10 + 1 + 10);
    }

    #[test]
    fn multiple_messages() {
        let msgs = vec![Message::user("hello"), Message::assistant("world")];
        assert_eq!(estimate_messages_tokens(&msgs), 24);
    }

    #[test]
    fn tool_catalog_tokens() {
        let tool = ToolDefinition {
            name: "get_accommodation_info".to_string(),
            description: "Details of one hotel".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": { "productCode": { "type": "string" } }
            }),
        };
        assert!(estimate_tools_tokens(&[tool]) > 0);
        assert_eq!(estimate_tools_tokens(&[]), 0);
    }
}
