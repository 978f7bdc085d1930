//! Shared configuration for Diary Coach.
//!
//! Resolves where diary input comes from, where the transcript goes, and how
//! the batch run is shaped. Values come from (lowest to highest priority):
//!
//! 1. Built-in defaults in this module
//! 2. `.env` / `.env.local` files in the working directory
//! 3. Process environment variables
//! 4. Command-line flags (applied by the binary)
//!
//! # Environment Variables
//!
//! - `COACH_INPUT`: Diary CSV to read (default `user_diary.csv`)
//! - `COACH_OUTPUT`: Transcript CSV to write (default `positive_thinking_log.csv`)
//! - `COACH_CHUNK_SIZE`: Rows per batch (default 500)
//! - `COACH_CONCURRENCY`: Maximum batches in flight (default unbounded)
//! - `COACH_MODEL`: Model identifier (default `gemini-2.0-flash`)
//! - `COACH_BASE_URL`: Override the provider's chat-completions base URL

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Environment variable for the diary CSV path.
pub const INPUT_PATH_ENV: &str = "COACH_INPUT";

/// Environment variable for the transcript CSV path.
pub const OUTPUT_PATH_ENV: &str = "COACH_OUTPUT";

/// Environment variable for the batch size.
pub const CHUNK_SIZE_ENV: &str = "COACH_CHUNK_SIZE";

/// Environment variable for the concurrency limit.
pub const CONCURRENCY_ENV: &str = "COACH_CONCURRENCY";

/// Environment variable for the model identifier.
pub const MODEL_ENV: &str = "COACH_MODEL";

/// Environment variable for the chat-completions base URL.
pub const BASE_URL_ENV: &str = "COACH_BASE_URL";

/// Default diary CSV file name.
pub const DEFAULT_INPUT_FILE: &str = "user_diary.csv";

/// Default transcript CSV file name.
pub const DEFAULT_OUTPUT_FILE: &str = "positive_thinking_log.csv";

/// Default number of diary rows per batch.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default keyword that ends a batch conversation.
pub const DEFAULT_TERMINATION_TEXT: &str = "terminate";

// Loaded in order; later files do not override variables set by earlier ones.
const ENV_FILES: [&str; 2] = [".env", ".env.local"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Batch size must be at least one row.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// Concurrency limit must allow at least one batch.
    #[error("concurrency must be greater than zero")]
    InvalidConcurrency,

    /// Termination keyword cannot be empty.
    #[error("termination text must not be empty")]
    EmptyTerminationText,

    /// An env file exists but could not be parsed.
    #[error("failed to load {path}: {message}")]
    EnvFile {
        /// Path to the env file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Diary CSV to read.
    pub input: PathBuf,
    /// Transcript CSV to write.
    pub output: PathBuf,
    /// Diary rows per batch.
    pub chunk_size: usize,
    /// Maximum batches in flight; `None` runs every batch at once.
    pub concurrency: Option<usize>,
    /// Keyword that ends a batch conversation.
    pub termination_text: String,
    /// Upper bound on agent replies per batch.
    pub max_turns: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: None,
            termination_text: DEFAULT_TERMINATION_TEXT.to_string(),
            max_turns: None,
        }
    }
}

impl Settings {
    /// Check that the settings describe a runnable batch job.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }
        if self.concurrency == Some(0) {
            return Err(ConfigError::InvalidConcurrency);
        }
        if self.termination_text.is_empty() {
            return Err(ConfigError::EmptyTerminationText);
        }
        Ok(())
    }
}

/// Load `.env` and `.env.local` from the current directory.
///
/// Returns the files that were found and loaded.
pub fn load_env_files() -> Result<Vec<PathBuf>> {
    load_env_files_from(Path::new("."))
}

/// Load `.env` and `.env.local` from `dir`. Missing files are skipped.
pub fn load_env_files_from(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut loaded = Vec::new();
    for name in ENV_FILES {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        dotenvy::from_path(&path).map_err(|e| ConfigError::EnvFile {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded env file");
        loaded.push(path);
    }
    Ok(loaded)
}
