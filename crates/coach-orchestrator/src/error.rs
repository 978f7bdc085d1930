//! Error types for the orchestrator.

use thiserror::Error;

/// Orchestrator-specific errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Agent error.
    #[error("Agent error: {0}")]
    Agent(#[from] coach_agent::AgentError),

    /// Reading diaries or writing the transcript failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] coach_persistence::PersistenceError),

    /// Invalid run settings.
    #[error("Configuration error: {0}")]
    Config(#[from] coach_core::ConfigError),

    /// Prompt serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// One or more batches failed; their rows are missing from the transcript.
    #[error("{failed} of {total} batches failed")]
    BatchesFailed {
        /// Number of failed batches.
        failed: usize,
        /// Number of batches in the run.
        total: usize,
    },
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
