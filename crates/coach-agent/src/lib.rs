//! Agents and team conversations for Diary Coach.
//!
//! This crate provides the conversation layer that discusses each batch of
//! diary entries:
//!
//! - [`AssistantAgent`]: answers turns with an LLM completion
//! - [`UserProxyAgent`]: hands turns to a human via an [`InputSource`]
//! - [`RoundRobinGroupChat`]: runs participants in order until a
//!   [`TerminationCondition`] fires
//! - [`OpenAiCompatClient`]: chat-completions client for Gemini, OpenAI and
//!   OpenRouter behind the [`ChatBackend`] trait
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use coach_agent::{
//!     AssistantAgent, ModelConfig, OpenAiCompatClient, RoundRobinGroupChat, ScriptedInput,
//!     TerminationCondition, UserProxyAgent,
//! };
//!
//! let backend = Arc::new(OpenAiCompatClient::from_env(ModelConfig::default())?);
//! let mut team = RoundRobinGroupChat::new(vec![
//!     Box::new(AssistantAgent::new("analysis_agent", backend)),
//!     Box::new(UserProxyAgent::new("user_proxy", Arc::new(ScriptedInput::constant("terminate")))),
//! ])?
//! .with_termination(TerminationCondition::text_mention("terminate"));
//!
//! let result = team.run("How did this week go?").await?;
//! ```

pub mod agent;
pub mod assistant;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod team;
pub mod termination;
pub mod user_proxy;

// Re-export commonly used items
pub use agent::Agent;
pub use assistant::{AssistantAgent, DEFAULT_SYSTEM_MESSAGE};
pub use client::{ChatBackend, ChatMessage, ChatResponse, OpenAiCompatClient};
pub use config::{ModelConfig, Provider};
pub use error::{AgentError, Result};
pub use message::{StopMessage, TeamEvent, TextMessage, TASK_SOURCE};
pub use team::{RoundRobinGroupChat, TaskResult};
pub use termination::TerminationCondition;
pub use user_proxy::{InputSource, ScriptedInput, StdinInput, UserProxyAgent, DEFAULT_INPUT_PROMPT};
