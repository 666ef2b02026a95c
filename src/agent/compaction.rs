//! History window trimming for tool-using conversations.
//!
//! Keeps a conversation log within a message budget without breaking the
//! ordering rules a tool-augmented dialogue requires:
//!
//! - A window never starts with a tool result whose call was cut away.
//! - A window never starts at a model turn that invokes tools.
//! - The first system message survives truncation.
//!
//! These are pure functions that operate on `Vec<Message>`. When no safe
//! boundary exists the history is returned untouched; trimming never fails.

use crate::session::{History, Message, Origin};

/// Number of trailing messages kept when no window size is configured.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// What a call to [`trim_with_report`] did to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimOutcome {
    /// The history already fit in the window.
    Unchanged { len: usize },
    /// Messages before `cut` were dropped (except a preserved system turn).
    Trimmed {
        cut: usize,
        before: usize,
        after: usize,
        system_preserved: bool,
    },
    /// The history was over budget but every candidate boundary was unsafe.
    NoSafeCut { len: usize },
}

impl TrimOutcome {
    /// History length before trimming.
    pub fn before(&self) -> usize {
        match *self {
            TrimOutcome::Unchanged { len } | TrimOutcome::NoSafeCut { len } => len,
            TrimOutcome::Trimmed { before, .. } => before,
        }
    }

    /// History length after trimming.
    pub fn after(&self) -> usize {
        match *self {
            TrimOutcome::Unchanged { len } | TrimOutcome::NoSafeCut { len } => len,
            TrimOutcome::Trimmed { after, .. } => after,
        }
    }

    pub fn is_trimmed(&self) -> bool {
        matches!(self, TrimOutcome::Trimmed { .. })
    }
}

/// Whether a window may start at `msg`.
///
/// A message holding a tool result would lose its call. A model turn holding
/// a tool call is also rejected, even though its results would follow it into
/// the window.
pub fn is_safe_cut(msg: &Message) -> bool {
    if msg.has_tool_result() {
        return false;
    }
    !(msg.origin == Origin::Model && msg.has_tool_call())
}

/// Find where a window of `window_size` trailing messages can safely start.
///
/// Scans backward from the index that would leave exactly `window_size`
/// messages and returns the first safe boundary, i.e. the one closest to that
/// index. Returns `None` when the history already fits or when no boundary in
/// range is safe.
///
/// # Example
/// ```
/// use masgent::agent::compaction::find_safe_cut;
/// use masgent::session::{Message, Part};
///
/// let history = vec![
///     Message::user("relax this cell"),
///     Message::model_with_tool_calls("", vec![Part::tool_call("c1", "relax", "{}")]),
///     Message::tool_results(&[("c1", "converged")]),
///     Message::model("Relaxation converged."),
/// ];
/// // Index 2 is a tool result and index 1 invokes a tool, so the window
/// // has to start at the user request.
/// assert_eq!(find_safe_cut(&history, 2), Some(0));
/// assert_eq!(find_safe_cut(&history, 4), None);
/// ```
pub fn find_safe_cut(history: &[Message], window_size: usize) -> Option<usize> {
    if history.len() <= window_size {
        return None;
    }
    // With a zero window the target equals len, which is past the end; start
    // one earlier so the window keeps at least the newest message.
    let target = (history.len() - window_size).min(history.len() - 1);
    (0..=target).rev().find(|&i| is_safe_cut(&history[i]))
}

/// Trim `history` to roughly `window_size` trailing messages.
///
/// See [`trim_with_report`] for the rules; this variant drops the report.
///
/// # Example
/// ```
/// use masgent::session::Message;
/// use masgent::agent::compaction::trim;
///
/// let mut history = vec![Message::system("You are a VASP assistant.")];
/// for i in 0..6 {
///     history.push(Message::user(&format!("question {}", i)));
///     history.push(Message::model(&format!("answer {}", i)));
/// }
/// let trimmed = trim(history, 4);
/// assert_eq!(trimmed.len(), 5); // system + 4 recent
/// assert!(trimmed[0].is_system());
/// ```
pub fn trim(history: History, window_size: usize) -> History {
    trim_with_report(history, window_size).0
}

/// Trim `history` and report what happened.
///
/// 1. A history of at most `window_size` messages is returned as is.
/// 2. Otherwise the window starts at [`find_safe_cut`].
/// 3. If the first system message lies before the cut, it is put back in
///    front of the window, so the result can hold `window_size + 1` messages.
/// 4. If no safe cut exists, the history is returned unchanged.
pub fn trim_with_report(history: History, window_size: usize) -> (History, TrimOutcome) {
    let before = history.len();
    if before <= window_size {
        return (history, TrimOutcome::Unchanged { len: before });
    }

    let Some(cut) = find_safe_cut(&history, window_size) else {
        crate::log_component!(
            warn,
            "window",
            "No safe cut point found, keeping full message history",
            len = before,
            window_size = window_size
        );
        return (history, TrimOutcome::NoSafeCut { len: before });
    };

    let system_index = history
        .iter()
        .position(Message::is_system)
        .filter(|&i| i < cut);

    let mut head = history;
    let tail = head.split_off(cut);
    let trimmed = match system_index {
        Some(i) => {
            let mut out = Vec::with_capacity(tail.len() + 1);
            out.push(head.swap_remove(i));
            out.extend(tail);
            out
        }
        None => tail,
    };

    let after = trimmed.len();
    crate::log_component!(
        info,
        "window",
        "Message history truncated",
        before = before,
        after = after,
        cut = cut
    );

    (
        trimmed,
        TrimOutcome::Trimmed {
            cut,
            before,
            after,
            system_preserved: system_index.is_some(),
        },
    )
}
