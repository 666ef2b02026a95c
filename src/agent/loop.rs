//! Conversation loop implementation
//!
//! This module drives one AI-mode conversation: it seeds the system prompt,
//! passes the trimmed window to an [`AgentRuntime`], and appends the produced
//! turns to the session so the window is maintained after every turn.

use tracing::{debug, error};

use crate::config::Config;
use crate::error::{MasgentError, Result};
use crate::session::{ConversationSession, History, Message, Origin};

use super::runtime::AgentRuntime;

/// Processes user input against an [`AgentRuntime`] while keeping the
/// conversation history inside its window.
///
/// # Example
///
/// ```
/// use masgent::agent::{ConversationLoop, EchoRuntime};
///
/// # tokio_test::block_on(async {
/// let mut conversation = ConversationLoop::new(EchoRuntime, 10)
///     .with_system_prompt("You are a materials-simulation assistant.");
///
/// let reply = conversation.process("Generate a POSCAR for NaCl").await.unwrap();
/// assert_eq!(reply, "Generate a POSCAR for NaCl");
/// // system + user + model
/// assert_eq!(conversation.history().len(), 3);
/// # });
/// ```
pub struct ConversationLoop<R: AgentRuntime> {
    runtime: R,
    session: ConversationSession,
    system_prompt: Option<String>,
}

impl<R: AgentRuntime> ConversationLoop<R> {
    /// Create a loop with an empty session and no system prompt.
    pub fn new(runtime: R, window_size: usize) -> Self {
        Self {
            runtime,
            session: ConversationSession::new(window_size),
            system_prompt: None,
        }
    }

    /// Create a loop using the window size and system prompt from `config`.
    pub fn from_config(runtime: R, config: &Config) -> Self {
        let conversation = Self::new(runtime, config.window.size);
        match &config.agent.system_prompt {
            Some(prompt) => conversation.with_system_prompt(prompt.clone()),
            None => conversation,
        }
    }

    /// Seed `prompt` as the system turn of the first exchange.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = if prompt.trim().is_empty() {
            None
        } else {
            Some(prompt)
        };
        self
    }

    /// Process one user input and return the final model reply text.
    ///
    /// On success the user turn and every produced turn are appended to the
    /// session, trimming after each. On failure history is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MasgentError::InvalidMessage`] for blank input or a
    /// malformed produced turn, and [`MasgentError::Runtime`] when the
    /// runtime fails or does not end the exchange with a model reply.
    pub async fn process(&mut self, input: &str) -> Result<String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MasgentError::InvalidMessage("empty user input".into()));
        }

        let mut pending = Vec::with_capacity(2);
        if self.session.is_empty() {
            if let Some(prompt) = &self.system_prompt {
                pending.push(Message::system(prompt));
            }
        }
        pending.push(Message::user(input));

        let mut context = Vec::with_capacity(self.session.len() + pending.len());
        context.extend_from_slice(self.session.history());
        context.extend_from_slice(&pending);

        crate::log_component!(
            info,
            "agent",
            "Processing message",
            session = self.session.key(),
            context_len = context.len(),
        );

        let produced = match self.runtime.run_turn(&context, input).await {
            Ok(produced) => produced,
            Err(e) => {
                error!(session = self.session.key(), error = %e, "Runtime failed");
                return Err(e);
            }
        };
        let reply = Self::check_produced(&produced)?;

        for message in pending.into_iter().chain(produced) {
            self.session.append_turn(message);
        }
        debug!(
            session = self.session.key(),
            total = self.session.len(),
            "Exchange complete"
        );

        Ok(reply)
    }

    /// Validate produced turns and extract the final reply text.
    fn check_produced(produced: &[Message]) -> Result<String> {
        let last = produced
            .last()
            .ok_or_else(|| MasgentError::Runtime("runtime produced no messages".into()))?;

        for message in produced {
            message.validate()?;
            if message.is_system() {
                return Err(MasgentError::InvalidMessage(
                    "runtime may not produce system turns".into(),
                ));
            }
        }

        if last.origin != Origin::Model || last.has_tool_call() {
            return Err(MasgentError::Runtime(
                "exchange did not end with a model reply".into(),
            ));
        }
        Ok(last.text())
    }

    /// The current (trimmed) history.
    pub fn history(&self) -> &History {
        self.session.history()
    }

    /// The underlying session.
    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// The runtime driving this loop.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// End the conversation, discarding history. Returns the number of
    /// messages dropped. The system prompt is seeded again on the next input.
    pub fn end(&mut self) -> usize {
        self.session.end()
    }
}
