//! Message model for Masgent conversations
//!
//! This module defines the structural shape of a conversation: the parts a
//! turn is made of, the origin of each turn, and the history type the window
//! trimmer and the conversation session operate on. Content is opaque here;
//! only the shape (instruction, text, tool call, tool result) matters.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MasgentError, Result};

/// An ordered conversation log, oldest message first.
pub type History = Vec<Message>;

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Standing system directives
    System,
    /// Requests from the user, including tool results handed back to the model
    User,
    /// Replies from the model, including tool invocations
    Model,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::System => write!(f, "system"),
            Origin::User => write!(f, "user"),
            Origin::Model => write!(f, "model"),
        }
    }
}

/// The atomic content unit inside a [`Message`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// A standing system directive.
    Instruction { content: String },
    /// Free-form content authored by the user or the model.
    Text { content: String },
    /// The model asks for a tool to be invoked.
    ToolCall {
        call_id: String,
        name: String,
        /// JSON-encoded arguments
        #[serde(default)]
        arguments: String,
    },
    /// The outcome of an earlier [`Part::ToolCall`] with the same `call_id`.
    ToolResult {
        call_id: String,
        #[serde(default)]
        content: String,
    },
}

impl Part {
    pub fn instruction(content: &str) -> Self {
        Part::Instruction {
            content: content.to_string(),
        }
    }

    pub fn text(content: &str) -> Self {
        Part::Text {
            content: content.to_string(),
        }
    }

    pub fn tool_call(call_id: &str, name: &str, arguments: &str) -> Self {
        Part::ToolCall {
            call_id: call_id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    pub fn tool_result(call_id: &str, content: &str) -> Self {
        Part::ToolResult {
            call_id: call_id.to_string(),
            content: content.to_string(),
        }
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self, Part::ToolCall { .. })
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self, Part::ToolResult { .. })
    }
}

/// One conversational turn: a non-empty sequence of parts plus its origin.
///
/// A system message holds only [`Part::Instruction`] parts and by convention
/// appears at most once, normally first in the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Who authored this turn
    pub origin: Origin,
    /// The parts of this turn, in order
    pub parts: Vec<Part>,
}

impl Message {
    /// Build a message, checking the structural rules of the model.
    ///
    /// # Errors
    ///
    /// Returns [`MasgentError::InvalidMessage`] when `parts` is empty or when
    /// a system message carries anything other than instructions.
    ///
    /// # Example
    /// ```
    /// use masgent::session::{Message, Origin, Part};
    ///
    /// let msg = Message::try_new(Origin::User, vec![Part::text("Generate a POSCAR for NaCl")]).unwrap();
    /// assert_eq!(msg.origin, Origin::User);
    ///
    /// assert!(Message::try_new(Origin::System, vec![Part::text("not an instruction")]).is_err());
    /// ```
    pub fn try_new(origin: Origin, parts: Vec<Part>) -> Result<Self> {
        let msg = Self { origin, parts };
        msg.validate()?;
        Ok(msg)
    }

    /// Create a system message holding a single instruction.
    ///
    /// # Example
    /// ```
    /// use masgent::session::{Message, Origin};
    ///
    /// let msg = Message::system("You are a materials-simulation assistant.");
    /// assert_eq!(msg.origin, Origin::System);
    /// assert!(msg.is_system());
    /// ```
    pub fn system(instruction: &str) -> Self {
        Self {
            origin: Origin::System,
            parts: vec![Part::instruction(instruction)],
        }
    }

    /// Create a user message holding a single text part.
    pub fn user(content: &str) -> Self {
        Self {
            origin: Origin::User,
            parts: vec![Part::text(content)],
        }
    }

    /// Create a model reply holding a single text part.
    pub fn model(content: &str) -> Self {
        Self {
            origin: Origin::Model,
            parts: vec![Part::text(content)],
        }
    }

    /// Create a model turn that invokes one or more tools.
    ///
    /// Empty `content` is omitted so the turn consists of tool calls only.
    ///
    /// # Example
    /// ```
    /// use masgent::session::{Message, Part};
    ///
    /// let msg = Message::model_with_tool_calls(
    ///     "Let me build that structure.",
    ///     vec![Part::tool_call("call_1", "generate_vasp_poscar", r#"{"formula": "NaCl"}"#)],
    /// );
    /// assert!(msg.has_tool_call());
    /// assert_eq!(msg.parts.len(), 2);
    /// ```
    pub fn model_with_tool_calls(content: &str, calls: Vec<Part>) -> Self {
        let mut parts = Vec::with_capacity(calls.len() + 1);
        if !content.is_empty() {
            parts.push(Part::text(content));
        }
        parts.extend(calls);
        Self {
            origin: Origin::Model,
            parts,
        }
    }

    /// Create the user-side turn that hands tool results back to the model.
    ///
    /// Each entry is a `(call_id, content)` pair.
    pub fn tool_results(results: &[(&str, &str)]) -> Self {
        Self {
            origin: Origin::User,
            parts: results
                .iter()
                .map(|(id, content)| Part::tool_result(id, content))
                .collect(),
        }
    }

    /// Check the structural rules of the message model.
    ///
    /// # Errors
    ///
    /// Returns [`MasgentError::InvalidMessage`] describing the first broken rule.
    pub fn validate(&self) -> Result<()> {
        if self.parts.is_empty() {
            return Err(MasgentError::InvalidMessage(format!(
                "{} message has no parts",
                self.origin
            )));
        }
        if self.origin == Origin::System
            && self
                .parts
                .iter()
                .any(|p| !matches!(p, Part::Instruction { .. }))
        {
            return Err(MasgentError::InvalidMessage(
                "system message may only contain instructions".into(),
            ));
        }
        if self.origin != Origin::Model && self.parts.iter().any(Part::is_tool_call) {
            return Err(MasgentError::InvalidMessage(format!(
                "{} message cannot invoke tools",
                self.origin
            )));
        }
        Ok(())
    }

    /// Whether this is the standing system turn.
    pub fn is_system(&self) -> bool {
        self.origin == Origin::System
    }

    /// Whether any part of this message is a tool result.
    pub fn has_tool_result(&self) -> bool {
        self.parts.iter().any(Part::is_tool_result)
    }

    /// Whether any part of this message is a tool call.
    ///
    /// Only model turns invoke tools, so this is meaningful for them alone.
    pub fn has_tool_call(&self) -> bool {
        self.parts.iter().any(Part::is_tool_call)
    }

    /// Call ids of the tool calls in this message, in order.
    pub fn call_ids(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::ToolCall { call_id, .. } => Some(call_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Call ids answered by the tool results in this message, in order.
    pub fn result_ids(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::ToolResult { call_id, .. } => Some(call_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text and instruction content joined by newlines.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { content } | Part::Instruction { content } => Some(content.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Call ids of tool results that are not answered by a tool call in the
/// immediately preceding message.
///
/// An empty return value means the history satisfies the pairing rule. The
/// trimmer does not call this; it is for producers and tooling that want to
/// check their input.
///
/// # Example
/// ```
/// use masgent::session::{find_orphaned_results, Message, Part};
///
/// let history = vec![
///     Message::model_with_tool_calls("", vec![Part::tool_call("call_1", "convert", "{}")]),
///     Message::tool_results(&[("call_1", "ok")]),
/// ];
/// assert!(find_orphaned_results(&history).is_empty());
/// assert_eq!(find_orphaned_results(&history[1..]), vec!["call_1".to_string()]);
/// ```
pub fn find_orphaned_results(history: &[Message]) -> Vec<String> {
    let mut orphaned = Vec::new();
    for (i, msg) in history.iter().enumerate() {
        let answered: HashSet<&str> = match i.checked_sub(1) {
            Some(prev) => history[prev].call_ids().into_iter().collect(),
            None => HashSet::new(),
        };
        for id in msg.result_ids() {
            if !answered.contains(id) {
                orphaned.push(id.to_string());
            }
        }
    }
    orphaned
}

/// Read a JSON history file and validate every message in it.
///
/// Pairing is not checked here; see [`find_orphaned_results`].
///
/// # Errors
///
/// Returns [`MasgentError::Io`] if the file cannot be read,
/// [`MasgentError::Json`] if it is not a JSON array of messages, and
/// [`MasgentError::InvalidMessage`] naming the first malformed message.
pub fn read_history(path: &Path) -> Result<History> {
    let content = std::fs::read_to_string(path)?;
    let history: History = serde_json::from_str(&content)?;
    for (i, message) in history.iter().enumerate() {
        message.validate().map_err(|e| match e {
            MasgentError::InvalidMessage(reason) => {
                MasgentError::InvalidMessage(format!("message at index {}: {}", i, reason))
            }
            other => other,
        })?;
    }
    Ok(history)
}
