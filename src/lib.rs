//! Masgent - conversation-window core for a materials-simulation AI assistant
//!
//! Keeps an AI-mode conversation inside a bounded window of recent turns
//! without ever separating a tool call from its result.

pub mod agent;
pub mod config;
pub mod error;
pub mod session;
pub mod utils;

pub use agent::{AgentRuntime, ConversationLoop, EchoRuntime, TrimOutcome};
pub use config::Config;
pub use error::{MasgentError, Result};
pub use session::{ConversationSession, History, Message, Origin, Part, SessionManager};
