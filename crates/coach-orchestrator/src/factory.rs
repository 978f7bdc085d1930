//! Builds the agent team that works on one batch.

use std::sync::Arc;

use coach_agent::{
    Agent, AssistantAgent, ChatBackend, InputSource, RoundRobinGroupChat, TerminationCondition,
    UserProxyAgent, DEFAULT_INPUT_PROMPT,
};
use coach_models::Batch;
use tracing::debug;

use crate::error::Result;

/// Organises the diary records of the batch.
pub const DATA_AGENT: &str = "data_agent";

/// Analyses emotions and thinking patterns.
pub const ANALYSIS_AGENT: &str = "analysis_agent";

/// Proposes positive-thinking actions and talks with the user.
pub const COACHING_AGENT: &str = "coaching_agent";

/// Stands in for the human at the terminal.
pub const USER_PROXY: &str = "user_proxy";

/// Team members in speaking order.
pub const ROLES: [&str; 4] = [DATA_AGENT, ANALYSIS_AGENT, COACHING_AGENT, USER_PROXY];

/// Creates a fresh four-member team per batch.
///
/// Every team shares the model backend and the input source. Each gets its
/// own copy of the termination condition, so no run state leaks between
/// batches.
#[derive(Clone)]
pub struct TeamFactory {
    backend: Arc<dyn ChatBackend>,
    input: Arc<dyn InputSource>,
    termination: TerminationCondition,
    max_turns: Option<usize>,
}

impl std::fmt::Debug for TeamFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamFactory")
            .field("model", &self.backend.model())
            .field("termination", &self.termination)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

impl TeamFactory {
    /// Create a factory.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        input: Arc<dyn InputSource>,
        termination: TerminationCondition,
    ) -> Self {
        Self {
            backend,
            input,
            termination,
            max_turns: None,
        }
    }

    /// Cap agent replies per batch. `None` removes the cap.
    pub fn with_max_turns(mut self, max_turns: Option<usize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Termination condition given to each team.
    pub fn termination(&self) -> &TerminationCondition {
        &self.termination
    }

    /// Build the team for `batch`.
    pub fn build(&self, batch: &Batch) -> Result<RoundRobinGroupChat> {
        let proxy = UserProxyAgent::new(USER_PROXY, Arc::clone(&self.input))
            .with_prompt(format!("[rows {}] {}", batch.label(), DEFAULT_INPUT_PROMPT));

        let participants: Vec<Box<dyn Agent>> = vec![
            Box::new(AssistantAgent::new(DATA_AGENT, Arc::clone(&self.backend))),
            Box::new(AssistantAgent::new(ANALYSIS_AGENT, Arc::clone(&self.backend))),
            Box::new(AssistantAgent::new(COACHING_AGENT, Arc::clone(&self.backend))),
            Box::new(proxy),
        ];

        let mut team =
            RoundRobinGroupChat::new(participants)?.with_termination(self.termination.clone());
        if let Some(max) = self.max_turns {
            team = team.with_max_turns(max);
        }

        debug!(batch = batch.index, rows = %batch.label(), "Built team");
        Ok(team)
    }
}
