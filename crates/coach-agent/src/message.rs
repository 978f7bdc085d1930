//! Messages exchanged inside a team conversation.

use coach_models::TokenUsage;
use serde::{Deserialize, Serialize};

/// Source name used for the task message that opens a run.
pub const TASK_SOURCE: &str = "user";

/// A text message from one participant (or the task giver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    /// Who produced the message.
    pub source: String,

    /// Message text.
    pub content: String,

    /// Tokens the model spent producing this message, if a model was involved.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub models_usage: Option<TokenUsage>,
}

impl TextMessage {
    /// Type tag written to transcripts.
    pub const KIND: &'static str = "TextMessage";

    /// Create a message.
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
            models_usage: None,
        }
    }

    /// Attach model usage.
    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.models_usage = usage;
        self
    }

    /// Type tag of this message.
    pub fn kind(&self) -> &'static str {
        Self::KIND
    }
}

/// Emitted once when a run ends because a stop condition fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopMessage {
    /// Which condition stopped the run.
    pub source: String,

    /// Human-readable stop reason.
    pub content: String,
}

impl StopMessage {
    /// Type tag of stop messages.
    pub const KIND: &'static str = "StopMessage";

    /// Create a stop message.
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    /// Type tag of this message.
    pub fn kind(&self) -> &'static str {
        Self::KIND
    }
}

/// Item yielded by a team's event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamEvent {
    /// A participant (or the task) spoke.
    Message(TextMessage),
    /// The run ended.
    Stop(StopMessage),
}

impl TeamEvent {
    /// The text message, if this event carries one.
    pub fn as_text(&self) -> Option<&TextMessage> {
        match self {
            Self::Message(message) => Some(message),
            Self::Stop(_) => None,
        }
    }
}

impl std::fmt::Display for TeamEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(m) => write!(f, "[{}] => {}", m.source, m.content),
            Self::Stop(s) => write!(f, "[{}] stopped: {}", s.source, s.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(TextMessage::new("a", "b").kind(), "TextMessage");
        assert_eq!(StopMessage::new("a", "b").kind(), "StopMessage");
    }

    #[test]
    fn test_event_display() {
        let event = TeamEvent::Message(TextMessage::new("coaching_agent", "試著寫下三件感恩的事。"));
        assert_eq!(event.to_string(), "[coaching_agent] => 試著寫下三件感恩的事。");
        assert!(event.as_text().is_some());

        let stop = TeamEvent::Stop(StopMessage::new("TextMentionTermination", "done"));
        assert!(stop.as_text().is_none());
    }
}
