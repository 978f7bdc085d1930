//! Core data models for Diary Coach.
//!
//! This crate provides the data types shared by the reader, the batch
//! orchestrator and the transcript writer: diary records, batches of
//! records, and transcript rows.

pub mod batch;
pub mod record;
pub mod transcript;

pub use batch::Batch;
pub use record::DiaryRecord;
pub use transcript::{BatchOutcome, TokenUsage, TranscriptEntry};
