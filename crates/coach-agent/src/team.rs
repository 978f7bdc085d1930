//! Round-robin group chat.
//!
//! Participants speak in a fixed order. Every message is broadcast: when an
//! agent's turn comes it receives everything said since it last spoke. After
//! each message the termination condition is checked, and a turn limit can
//! cap the number of agent replies per run.

use std::collections::HashSet;

use coach_models::TokenUsage;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info};

use crate::agent::Agent;
use crate::error::{AgentError, Result};
use crate::message::{StopMessage, TeamEvent, TextMessage, TASK_SOURCE};
use crate::termination::TerminationCondition;

/// Source name on stop messages produced by the turn limit.
const TEAM_SOURCE: &str = "RoundRobinGroupChat";

/// Result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskResult {
    /// Every text message of the run, task message first.
    pub messages: Vec<TextMessage>,
    /// Why the run stopped.
    pub stop_reason: Option<String>,
}

impl TaskResult {
    /// Sum of model usage over all messages.
    pub fn usage(&self) -> TokenUsage {
        let mut total = TokenUsage::default();
        for usage in self.messages.iter().filter_map(|m| m.models_usage) {
            total += usage;
        }
        total
    }
}

/// Team whose participants take turns in a fixed order.
pub struct RoundRobinGroupChat {
    participants: Vec<Box<dyn Agent>>,
    termination: Option<TerminationCondition>,
    max_turns: Option<usize>,
    history: Vec<TextMessage>,
    // Per participant: index into `history` of the first unseen message.
    cursors: Vec<usize>,
    next_speaker: usize,
}

impl std::fmt::Debug for RoundRobinGroupChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundRobinGroupChat")
            .field("participants", &self.participant_names())
            .field("termination", &self.termination)
            .field("max_turns", &self.max_turns)
            .field("history_len", &self.history.len())
            .finish()
    }
}

enum Phase {
    Task(String),
    Speak,
    Stopping(StopMessage),
    Done,
}

struct RunState<'a> {
    team: &'a mut RoundRobinGroupChat,
    phase: Phase,
    turns: usize,
}

impl RoundRobinGroupChat {
    /// Create a team.
    ///
    /// # Errors
    /// [`AgentError::Configuration`] if there are no participants or two
    /// share a name.
    pub fn new(participants: Vec<Box<dyn Agent>>) -> Result<Self> {
        if participants.is_empty() {
            return Err(AgentError::Configuration(
                "a team needs at least one participant".into(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &participants {
            if !seen.insert(agent.name().to_string()) {
                return Err(AgentError::Configuration(format!(
                    "duplicate participant name: {}",
                    agent.name()
                )));
            }
        }

        let cursors = vec![0; participants.len()];
        Ok(Self {
            participants,
            termination: None,
            max_turns: None,
            history: Vec::new(),
            cursors,
            next_speaker: 0,
        })
    }

    /// Set the termination condition.
    pub fn with_termination(mut self, condition: TerminationCondition) -> Self {
        self.termination = Some(condition);
        self
    }

    /// Cap the number of agent replies per run.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Participant names in speaking order.
    pub fn participant_names(&self) -> Vec<&str> {
        self.participants.iter().map(|a| a.name()).collect()
    }

    /// Every message exchanged so far.
    pub fn history(&self) -> &[TextMessage] {
        &self.history
    }

    /// Clear the conversation and every participant's state.
    pub fn reset(&mut self) {
        self.history.clear();
        self.cursors.iter_mut().for_each(|c| *c = 0);
        self.next_speaker = 0;
        for agent in &mut self.participants {
            agent.reset();
        }
    }

    /// Run the team on `task`, yielding each event as it happens.
    ///
    /// The first item is the task itself as a message from `user`. The
    /// stream ends after a [`TeamEvent::Stop`], or with the first agent
    /// error. A later run continues the conversation and the speaking order
    /// where this one stopped.
    pub fn run_stream(&mut self, task: impl Into<String>) -> BoxStream<'_, Result<TeamEvent>> {
        let state = RunState {
            team: self,
            phase: Phase::Task(task.into()),
            turns: 0,
        };

        stream::try_unfold(state, Self::step).boxed()
    }

    async fn step(mut state: RunState<'_>) -> Result<Option<(TeamEvent, RunState<'_>)>> {
        let event = match std::mem::replace(&mut state.phase, Phase::Done) {
            Phase::Done => return Ok(None),
            Phase::Task(task) => {
                let message = TextMessage::new(TASK_SOURCE, task);
                state.team.history.push(message.clone());
                state.phase = match state.team.check_termination(1) {
                    Some(stop) => Phase::Stopping(stop),
                    None => Phase::Speak,
                };
                TeamEvent::Message(message)
            }
            Phase::Speak => {
                let reply = state.team.next_reply().await?;
                state.turns += 1;
                state.phase = match state.team.check_termination(1) {
                    Some(stop) => Phase::Stopping(stop),
                    None => match state.team.max_turns {
                        Some(max) if state.turns >= max => Phase::Stopping(StopMessage::new(
                            TEAM_SOURCE,
                            format!("Maximum number of turns {} reached.", max),
                        )),
                        _ => Phase::Speak,
                    },
                };
                TeamEvent::Message(reply)
            }
            Phase::Stopping(stop) => {
                info!(
                    source = %stop.source,
                    reason = %stop.content,
                    turns = state.turns,
                    "Team run stopped"
                );
                TeamEvent::Stop(stop)
            }
        };
        Ok(Some((event, state)))
    }

    /// Run the team on `task` to completion and collect the result.
    pub async fn run(&mut self, task: impl Into<String>) -> Result<TaskResult> {
        let mut events = self.run_stream(task);
        let mut result = TaskResult::default();
        while let Some(event) = events.next().await {
            match event? {
                TeamEvent::Message(message) => result.messages.push(message),
                TeamEvent::Stop(stop) => result.stop_reason = Some(stop.content),
            }
        }
        Ok(result)
    }

    fn check_termination(&self, new_count: usize) -> Option<StopMessage> {
        let condition = self.termination.as_ref()?;
        let start = self.history.len().saturating_sub(new_count);
        condition.check(&self.history[start..], self.history.len())
    }

    async fn next_reply(&mut self) -> Result<TextMessage> {
        let speaker = self.next_speaker;
        self.next_speaker = (speaker + 1) % self.participants.len();

        let seen = self.cursors[speaker];
        let agent = &mut self.participants[speaker];
        debug!(
            speaker = %agent.name(),
            unseen = self.history.len() - seen,
            "Next speaker selected"
        );

        let mut reply = agent.on_messages(&self.history[seen..]).await?;
        if reply.source != agent.name() {
            reply.source = agent.name().to_string();
        }

        self.history.push(reply.clone());
        self.cursors[speaker] = self.history.len();
        Ok(reply)
    }
}
