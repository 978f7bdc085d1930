//! Error types for the persistence crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading diaries or writing transcripts.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    WriteError {
        /// File being written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        /// Directory being created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Malformed CSV or CSV encoding failure.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A row has more fields than the header.
    #[error("{path}: line {line} has {found} fields, expected at most {expected}")]
    TooManyFields {
        /// Input file.
        path: PathBuf,
        /// 1-based line number of the row.
        line: u64,
        /// Number of header columns.
        expected: usize,
        /// Number of fields in the row.
        found: usize,
    },

    /// Input file has no header row.
    #[error("no columns to parse from {0}")]
    EmptyInput(PathBuf),

    /// Batch size of zero was requested.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PersistenceError::EmptyInput(PathBuf::from("user_diary.csv"));
        assert_eq!(err.to_string(), "no columns to parse from user_diary.csv");

        let err = PersistenceError::ReadError {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to read missing.csv: not found");

        let err = PersistenceError::TooManyFields {
            path: PathBuf::from("user_diary.csv"),
            line: 3,
            expected: 2,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "user_diary.csv: line 3 has 3 fields, expected at most 2"
        );
    }

    #[test]
    fn test_csv_error_is_not_double_prefixed() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
        let err = PersistenceError::from(csv::Error::from(io));
        let message = err.to_string();
        assert!(message.starts_with("malformed CSV: "));
        assert!(!message.contains("CSV error: CSV error"));
    }
}
