//! Agent module - Conversation loop and window maintenance
//!
//! This module provides the AI-mode side of Masgent:
//!
//! - [`compaction`] trims a conversation history to a bounded window without
//!   separating a tool call from its result
//! - [`AgentRuntime`] is the seam to whatever produces model turns
//! - [`ConversationLoop`] feeds user input through a runtime and keeps the
//!   session history inside its window
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │  user input │────>│ ConversationLoop │────>│ AgentRuntime │
//! └─────────────┘     └──────────────────┘     └──────────────┘
//!                              │
//!                              ▼
//!                     ┌──────────────────┐     ┌──────────────┐
//!                     │   Conversation   │────>│  compaction  │
//!                     │     Session      │     │    (trim)    │
//!                     └──────────────────┘     └──────────────┘
//! ```

pub mod compaction;
mod r#loop;
pub mod runtime;

pub use compaction::{find_safe_cut, trim, trim_with_report, TrimOutcome, DEFAULT_WINDOW_SIZE};
pub use r#loop::ConversationLoop;
pub use runtime::{AgentRuntime, EchoRuntime};
