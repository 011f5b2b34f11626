//! Conversation context - rolling transcript with periodic summarisation.
//!
//! A [`ContextState`] exists only while context collection is enabled for a
//! conversation. Messages accumulate as `"role: content"` lines until
//! [`COMPRESSION_THRESHOLD`] is reached, at which point the caller replaces
//! them with a model-generated summary via [`ContextState::compress`].

use serde::{Deserialize, Serialize};

/// Number of tracked messages that triggers a compression.
pub const COMPRESSION_THRESHOLD: u32 = 10;

const CONTEXT_HEADER: &str = "=== CONVERSATION CONTEXT ===";
const SUMMARY_HEADER: &str = "=== Previous Context Summary ===";
const RECENT_HEADER: &str = "=== Recent Conversation ===";
const CONTEXT_FOOTER: &str = "=== END CONTEXT ===";

/// Per-conversation context transcript.
///
/// Invariant: `message_count == recent_messages.len()` after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextState {
    enabled: bool,
    summary: String,
    recent_messages: Vec<String>,
    message_count: u32,
}

impl ContextState {
    /// Fresh enabled state with no summary and no messages.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            summary: String::new(),
            recent_messages: Vec::new(),
            message_count: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn recent_messages(&self) -> &[String] {
        &self.recent_messages
    }

    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    /// Appends `"role: content"`. Ignored while disabled.
    pub fn add_message(&mut self, role: &str, content: &str) {
        if !self.enabled {
            return;
        }
        self.recent_messages.push(format!("{}: {}", role, content));
        self.message_count += 1;
    }

    /// True once the transcript has reached [`COMPRESSION_THRESHOLD`] messages.
    pub fn should_compress(&self) -> bool {
        self.message_count >= COMPRESSION_THRESHOLD
    }

    /// Replaces the summary and clears the recent transcript.
    pub fn compress(&mut self, new_summary: impl Into<String>) {
        self.summary = new_summary.into();
        self.recent_messages.clear();
        self.message_count = 0;
    }

    /// Renders the context block for a system prompt.
    ///
    /// Returns `None` while disabled or when there is neither a summary nor
    /// any recent message.
    pub fn render(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let mut parts: Vec<&str> = Vec::new();

        if !self.summary.is_empty() {
            parts.push(SUMMARY_HEADER);
            parts.push(&self.summary);
            parts.push("");
        }

        if !self.recent_messages.is_empty() {
            parts.push(RECENT_HEADER);
            parts.extend(self.recent_messages.iter().map(String::as_str));
        }

        if parts.is_empty() {
            return None;
        }

        Some(format!(
            "{}\n{}\n{}",
            CONTEXT_HEADER,
            parts.join("\n"),
            CONTEXT_FOOTER
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_renders_nothing() {
        assert_eq!(ContextState::enabled().render(), None);
    }

    #[test]
    fn add_message_keeps_count_in_sync() {
        let mut state = ContextState::enabled();
        state.add_message("user", "hi");
        state.add_message("assistant", "hello");

        assert_eq!(state.message_count(), 2);
        assert_eq!(state.recent_messages().len(), 2);
        assert_eq!(state.recent_messages()[0], "user: hi");
    }

    #[test]
    fn should_compress_at_threshold() {
        let mut state = ContextState::enabled();
        for i in 0..9 {
            state.add_message("user", &i.to_string());
        }
        assert!(!state.should_compress());

        state.add_message("assistant", "ten");
        assert!(state.should_compress());
    }

    #[test]
    fn compress_replaces_transcript_with_summary() {
        let mut state = ContextState::enabled();
        state.add_message("user", "hi");

        state.compress("they said hi");

        assert_eq!(state.summary(), "they said hi");
        assert!(state.recent_messages().is_empty());
        assert_eq!(state.message_count(), 0);
    }

    #[test]
    fn render_with_recent_messages_only() {
        let mut state = ContextState::enabled();
        state.add_message("user", "hi");
        state.add_message("assistant", "hello");

        assert_eq!(
            state.render().unwrap(),
            "=== CONVERSATION CONTEXT ===\n\
             === Recent Conversation ===\n\
             user: hi\n\
             assistant: hello\n\
             === END CONTEXT ==="
        );
    }

    #[test]
    fn render_with_summary_and_recent_messages() {
        let mut state = ContextState::enabled();
        state.compress("S");
        state.add_message("user", "q");

        assert_eq!(
            state.render().unwrap(),
            "=== CONVERSATION CONTEXT ===\n\
             === Previous Context Summary ===\n\
             S\n\
             \n\
             === Recent Conversation ===\n\
             user: q\n\
             === END CONTEXT ==="
        );
    }

    #[test]
    fn render_with_summary_only_keeps_blank_line() {
        let mut state = ContextState::enabled();
        state.compress("S");

        assert_eq!(
            state.render().unwrap(),
            "=== CONVERSATION CONTEXT ===\n=== Previous Context Summary ===\nS\n\n=== END CONTEXT ==="
        );
    }
}
