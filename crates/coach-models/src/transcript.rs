//! Transcript types.
//!
//! Every text message produced while a batch is discussed becomes one
//! [`TranscriptEntry`], which maps 1:1 to a row in the output CSV.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::batch::Batch;

/// Token counts reported by the model endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
}

impl TokenUsage {
    /// Creates a usage record.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    /// Prompt plus completion tokens.
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// One row of the conversation transcript.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// First row number of the batch being discussed.
    pub batch_start: usize,
    /// Last row number of the batch being discussed (inclusive).
    pub batch_end: usize,
    /// Name of the speaker (`user` for the task prompt).
    pub source: String,
    /// Message text.
    pub content: String,
    /// Message kind, e.g. `TextMessage`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TranscriptEntry {
    /// Creates an entry stamped with the batch's row range.
    pub fn for_batch(
        batch: &Batch,
        source: impl Into<String>,
        content: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            batch_start: batch.start,
            batch_end: batch.end(),
            source: source.into(),
            content: content.into(),
            kind: kind.into(),
        }
    }
}

/// Everything one batch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// First row number of the batch.
    pub batch_start: usize,
    /// Last row number of the batch (inclusive).
    pub batch_end: usize,
    /// Transcript rows in speaking order.
    pub entries: Vec<TranscriptEntry>,
    /// Why the conversation ended, if a termination condition fired.
    pub stop_reason: Option<String>,
    /// Tokens spent on this batch.
    pub usage: TokenUsage,
}

impl BatchOutcome {
    /// Creates an empty outcome for a batch.
    pub fn for_batch(batch: &Batch) -> Self {
        Self {
            batch_start: batch.start,
            batch_end: batch.end(),
            ..Default::default()
        }
    }
}
