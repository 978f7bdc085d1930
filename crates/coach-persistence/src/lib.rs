//! Persistence layer for Diary Coach.
//!
//! Reads the diary CSV into batches and writes the conversation transcript
//! using atomic file operations (write to temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use coach_persistence::{read_batches, write_transcript};
//! use std::path::Path;
//!
//! let batches = read_batches(Path::new("user_diary.csv"), 500).unwrap();
//! println!("{} batches", batches.len());
//!
//! write_transcript(Path::new("positive_thinking_log.csv"), &[]).unwrap();
//! ```

pub mod atomic;
pub mod diary;
pub mod error;
pub mod transcript;

pub use diary::read_batches;
pub use error::{PersistenceError, Result};
pub use transcript::{encode_transcript, write_transcript, TRANSCRIPT_COLUMNS, UTF8_BOM};
