//! Human-in-the-loop participant.
//!
//! [`UserProxyAgent`] hands its turn to an [`InputSource`]: the terminal for
//! interactive runs, or a scripted queue for headless runs and tests.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::agent::Agent;
use crate::error::{AgentError, Result};
use crate::message::TextMessage;

/// Prompt shown when asking for input.
pub const DEFAULT_INPUT_PROMPT: &str = "Enter your response: ";

const DEFAULT_DESCRIPTION: &str = "A human user";

/// Where a user proxy gets its replies from.
#[async_trait]
pub trait InputSource: Send + Sync {
    /// Return one reply. `prompt` is shown to a human, if there is one.
    async fn read_line(&self, prompt: &str) -> Result<String>;
}

/// Reads replies from the process's standard input.
///
/// One instance should be shared by every team of a run: the internal lock
/// makes concurrent teams take turns at the terminal instead of
/// interleaving prompts.
#[derive(Debug, Default)]
pub struct StdinInput {
    lock: tokio::sync::Mutex<()>,
}

impl StdinInput {
    /// Create a stdin reader.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InputSource for StdinInput {
    async fn read_line(&self, prompt: &str) -> Result<String> {
        let _guard = self.lock.lock().await;
        let prompt = prompt.to_string();

        let line = tokio::task::spawn_blocking(move || -> std::io::Result<Option<String>> {
            let mut stdout = std::io::stdout();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;

            let mut line = String::new();
            let read = std::io::stdin().lock().read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        line.ok_or_else(|| AgentError::InputClosed("stdin".into()))
    }
}

/// Replies from a fixed queue, then a fallback reply forever.
///
/// Without a fallback, an exhausted queue reports [`AgentError::InputClosed`].
#[derive(Debug, Default)]
pub struct ScriptedInput {
    replies: Mutex<VecDeque<String>>,
    fallback: Option<String>,
}

impl ScriptedInput {
    /// Queue of replies with no fallback.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fallback: None,
        }
    }

    /// Always answer with the same reply.
    pub fn constant(reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(reply.into()),
        }
    }

    /// Set the reply used once the queue is exhausted.
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn read_line(&self, _prompt: &str) -> Result<String> {
        let next = self
            .replies
            .lock()
            .map_err(|_| AgentError::InputClosed("scripted input".into()))?
            .pop_front();
        next.or_else(|| self.fallback.clone())
            .ok_or_else(|| AgentError::InputClosed("scripted input".into()))
    }
}

/// Agent whose turns are answered by a human (or a script standing in for one).
pub struct UserProxyAgent {
    name: String,
    description: String,
    prompt: String,
    input: Arc<dyn InputSource>,
}

impl UserProxyAgent {
    /// Create a proxy reading from `input`.
    pub fn new(name: impl Into<String>, input: Arc<dyn InputSource>) -> Self {
        Self {
            name: name.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
            prompt: DEFAULT_INPUT_PROMPT.to_string(),
            input,
        }
    }

    /// Replace the input prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The prompt shown when asking for input.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[async_trait]
impl Agent for UserProxyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn on_messages(&mut self, new: &[TextMessage]) -> Result<TextMessage> {
        debug!(agent = %self.name, received = new.len(), "Waiting for human input");
        let reply = self.input.read_line(&self.prompt).await.map_err(|e| match e {
            AgentError::InputClosed(_) => AgentError::InputClosed(self.name.clone()),
            other => other,
        })?;
        Ok(TextMessage::new(&self.name, reply))
    }

    fn reset(&mut self) {}
}
