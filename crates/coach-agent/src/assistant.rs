//! LLM-backed assistant agent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::agent::Agent;
use crate::client::{ChatBackend, ChatMessage};
use crate::error::Result;
use crate::message::TextMessage;

/// System message used when none is configured.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful AI assistant. Solve tasks using your tools. Reply with 'TERMINATE' when the task has been completed.";

const DEFAULT_DESCRIPTION: &str = "An agent that provides assistance with ability to use tools.";

/// Agent that answers each turn with a model completion.
///
/// The agent keeps its own model context: the system message, every message
/// it has received (as `user` messages named after their source) and its own
/// earlier replies (as `assistant` messages).
pub struct AssistantAgent {
    name: String,
    description: String,
    system_message: String,
    backend: Arc<dyn ChatBackend>,
    context: Vec<ChatMessage>,
}

impl AssistantAgent {
    /// Create an assistant with the default system message.
    pub fn new(name: impl Into<String>, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            name: name.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            backend,
            context: Vec::new(),
        }
    }

    /// Replace the system message.
    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    /// Replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// System message sent with every request.
    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Messages accumulated in the model context (system message excluded).
    pub fn context(&self) -> &[ChatMessage] {
        &self.context
    }

    fn request_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.context.len() + 1);
        messages.push(ChatMessage::system(&self.system_message));
        messages.extend(self.context.iter().cloned());
        messages
    }
}

#[async_trait]
impl Agent for AssistantAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn on_messages(&mut self, new: &[TextMessage]) -> Result<TextMessage> {
        for message in new {
            self.context
                .push(ChatMessage::user_named(&message.content, &message.source));
        }

        let response = self.backend.chat(self.request_messages()).await?;
        let content = response.content();
        debug!(
            agent = %self.name,
            received = new.len(),
            reply_len = content.len(),
            "Assistant replied"
        );

        self.context.push(ChatMessage::assistant(&content));
        Ok(TextMessage::new(&self.name, content).with_usage(response.token_usage()))
    }

    fn reset(&mut self) {
        self.context.clear();
    }
}
