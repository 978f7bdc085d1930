//! Core Agent trait definition.
//!
//! Every participant of a group chat implements [`Agent`]: LLM-backed
//! assistants as well as the human-in-the-loop proxy.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::TextMessage;

/// A participant in a team conversation.
///
/// # Object Safety
///
/// This trait is object-safe so teams can hold `Box<dyn Agent>` of mixed
/// kinds.
///
/// # Example
///
/// ```ignore
/// use coach_agent::{Agent, TextMessage};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Agent for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn description(&self) -> &str { "Repeats the last message." }
///     async fn on_messages(&mut self, new: &[TextMessage]) -> Result<TextMessage> {
///         let last = new.last().map(|m| m.content.clone()).unwrap_or_default();
///         Ok(TextMessage::new("echo", last))
///     }
///     fn reset(&mut self) {}
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique name of this agent within its team.
    fn name(&self) -> &str;

    /// Short description of the agent's role.
    fn description(&self) -> &str;

    /// Take a turn.
    ///
    /// `new` holds every message broadcast since this agent last spoke, in
    /// order. The returned message is this agent's reply; its `source` must
    /// be the agent's name.
    async fn on_messages(&mut self, new: &[TextMessage]) -> Result<TextMessage>;

    /// Forget all conversation state.
    fn reset(&mut self);
}
