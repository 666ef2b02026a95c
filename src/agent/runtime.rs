//! Agent runtime seam.
//!
//! The conversation loop does not talk to a model directly. It hands the
//! current window to an [`AgentRuntime`] and gets back the turns produced for
//! one exchange.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::Message;

/// Produces the turns of one user exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Run one exchange.
    ///
    /// # Arguments
    /// * `context` - The trimmed history followed by the pending user turn
    /// * `input` - The raw user text of the pending turn
    ///
    /// # Returns
    /// The produced turns in order: any model tool-call turns and their
    /// tool-result turns, ending with the final model reply.
    async fn run_turn(&self, context: &[Message], input: &str) -> Result<Vec<Message>>;

    /// Runtime name used in logs.
    fn name(&self) -> &str {
        "runtime"
    }
}

/// Offline runtime that answers with the user's own text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoRuntime;

#[async_trait]
impl AgentRuntime for EchoRuntime {
    async fn run_turn(&self, _context: &[Message], input: &str) -> Result<Vec<Message>> {
        Ok(vec![Message::model(input)])
    }

    fn name(&self) -> &str {
        "echo"
    }
}
