//! Conditions that end a team conversation.
//!
//! Conditions are plain values: a team checks them after every new message
//! and stops at the first one that fires. They carry no run state, so one
//! condition can be cloned into many concurrently running teams.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::message::{StopMessage, TextMessage};

/// When a conversation should stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCondition {
    /// A new message contains the given text.
    TextMention {
        /// Text to look for.
        text: String,
        /// Only consider messages from these sources; `None` means any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sources: Option<Vec<String>>,
        /// Whether matching respects case.
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },

    /// The conversation (task message included) holds at least this many
    /// messages.
    MaxMessages(usize),

    /// Any member condition fires. Members are checked in order.
    Any(Vec<TerminationCondition>),
}

fn default_case_sensitive() -> bool {
    true
}

impl TerminationCondition {
    /// Case-sensitive text mention from any source.
    pub fn text_mention(text: impl Into<String>) -> Self {
        Self::TextMention {
            text: text.into(),
            sources: None,
            case_sensitive: true,
        }
    }

    /// Stop after `max` messages.
    pub fn max_messages(max: usize) -> Self {
        Self::MaxMessages(max)
    }

    /// Restrict a text mention to the given sources. No effect on other
    /// variants.
    pub fn from_sources<I, S>(self, only: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self {
            Self::TextMention {
                text,
                case_sensitive,
                ..
            } => Self::TextMention {
                text,
                sources: Some(only.into_iter().map(Into::into).collect()),
                case_sensitive,
            },
            other => other,
        }
    }

    /// Make a text mention ignore case. No effect on other variants.
    pub fn ignore_case(self) -> Self {
        match self {
            Self::TextMention { text, sources, .. } => Self::TextMention {
                text,
                sources,
                case_sensitive: false,
            },
            other => other,
        }
    }

    /// Check the messages added since the last check.
    ///
    /// `total` is the conversation length including `new`.
    pub fn check(&self, new: &[TextMessage], total: usize) -> Option<StopMessage> {
        match self {
            Self::TextMention {
                text,
                sources,
                case_sensitive,
            } => {
                let hit = new.iter().any(|message| {
                    let allowed = sources
                        .as_ref()
                        .map_or(true, |s| s.iter().any(|src| src == &message.source));
                    allowed && mentions(&message.content, text, *case_sensitive)
                });
                hit.then(|| {
                    StopMessage::new(
                        "TextMentionTermination",
                        format!("Text '{}' mentioned", text),
                    )
                })
            }
            Self::MaxMessages(max) => (total >= *max).then(|| {
                StopMessage::new(
                    "MaxMessageTermination",
                    format!(
                        "Maximum number of messages {} reached, current message count: {}",
                        max, total
                    ),
                )
            }),
            Self::Any(conditions) => conditions.iter().find_map(|c| c.check(new, total)),
        }
    }
}

fn mentions(content: &str, text: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        content.contains(text)
    } else {
        content.to_lowercase().contains(&text.to_lowercase())
    }
}

impl BitOr for TerminationCondition {
    type Output = TerminationCondition;

    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::Any(mut left), Self::Any(right)) => {
                left.extend(right);
                Self::Any(left)
            }
            (Self::Any(mut left), rhs) => {
                left.push(rhs);
                Self::Any(left)
            }
            (lhs, rhs) => Self::Any(vec![lhs, rhs]),
        }
    }
}
