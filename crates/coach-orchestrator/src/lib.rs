//! Batch orchestration for Diary Coach.
//!
//! Splits a diary into batches, gives each batch its own round-robin team
//! (`data_agent`, `analysis_agent`, `coaching_agent`, `user_proxy`), runs
//! the teams concurrently and gathers their conversations into one
//! transcript.

pub mod error;
pub mod factory;
pub mod orchestrator;
pub mod prompt;

pub use error::{OrchestratorError, Result};
pub use factory::{TeamFactory, ANALYSIS_AGENT, COACHING_AGENT, DATA_AGENT, ROLES, USER_PROXY};
pub use orchestrator::{process_batch, BatchFailure, BatchOrchestrator, RunReport};
pub use prompt::build_prompt;
