//! Session module - Conversation state and window maintenance
//!
//! This module provides the live side of a conversation:
//! - [`ConversationSession`] owns one conversation's history and trims it
//!   after every appended turn
//! - [`SessionManager`] keeps one session per conversation key and hands out
//!   per-session locks so async callers serialize access per conversation
//!
//! History lives in memory only; ending a session discards it.
//!
//! # Example
//!
//! ```
//! use masgent::session::{ConversationSession, Message};
//!
//! let mut session = ConversationSession::new(10);
//! session.append_turn(Message::system("You are a materials-simulation assistant."));
//! session.append_turn(Message::user("Generate a POSCAR file for NaCl."));
//! assert_eq!(session.len(), 2);
//! ```

pub mod types;

pub use types::{find_orphaned_results, read_history, History, Message, Origin, Part};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::agent::compaction::{trim_with_report, TrimOutcome, DEFAULT_WINDOW_SIZE};

/// Lifecycle state of a [`ConversationSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No messages yet, or the session has ended.
    Idle,
    /// At least one turn has been appended.
    Active,
}

/// A single conversation whose history is kept inside a message window.
///
/// The only way history grows is [`append_turn`](Self::append_turn), and the
/// only way it shrinks is the window trimmer run right after each append.
/// Callers must not share one session between concurrent writers; use
/// [`SessionManager`] to get a lock per conversation.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    key: String,
    history: History,
    window_size: usize,
    last_trim: Option<TrimOutcome>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create an idle session with a random key.
    pub fn new(window_size: usize) -> Self {
        Self::with_key(&uuid::Uuid::new_v4().to_string(), window_size)
    }

    /// Create an idle session with the given key.
    ///
    /// # Example
    /// ```
    /// use masgent::session::{ConversationSession, SessionState};
    ///
    /// let session = ConversationSession::with_key("cli:default", 10);
    /// assert_eq!(session.key(), "cli:default");
    /// assert_eq!(session.state(), SessionState::Idle);
    /// ```
    pub fn with_key(key: &str, window_size: usize) -> Self {
        let now = Utc::now();
        Self {
            key: key.to_string(),
            history: Vec::new(),
            window_size,
            last_trim: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append one completed turn and trim the history back into the window.
    ///
    /// Returns the history as it stands after trimming, which is what should
    /// be sent as context with the next model request.
    ///
    /// # Example
    /// ```
    /// use masgent::session::{ConversationSession, Message};
    ///
    /// let mut session = ConversationSession::new(2);
    /// session.append_turn(Message::user("first"));
    /// session.append_turn(Message::model("reply"));
    /// let history = session.append_turn(Message::user("second"));
    /// assert_eq!(history.len(), 2);
    /// assert_eq!(history[0], Message::model("reply"));
    /// ```
    pub fn append_turn(&mut self, message: Message) -> &History {
        let mut history = std::mem::take(&mut self.history);
        history.push(message);

        let (trimmed, outcome) = trim_with_report(history, self.window_size);
        self.history = trimmed;
        self.last_trim = Some(outcome);
        self.updated_at = Utc::now();

        crate::log_component!(
            debug,
            "session",
            "Message history updated",
            key = self.key.as_str(),
            total = self.history.len()
        );

        &self.history
    }

    /// End the conversation and discard its history.
    ///
    /// Returns the number of messages that were dropped.
    pub fn end(&mut self) -> usize {
        let dropped = self.history.len();
        self.history.clear();
        self.last_trim = None;
        self.updated_at = Utc::now();
        crate::log_component!(
            debug,
            "session",
            "Session ended",
            key = self.key.as_str(),
            dropped = dropped
        );
        dropped
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The current (already trimmed) history.
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn state(&self) -> SessionState {
        if self.history.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Active
        }
    }

    /// Outcome of the trim run by the most recent append, if any.
    pub fn last_trim(&self) -> Option<TrimOutcome> {
        self.last_trim
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

/// Keyed registry of live conversations.
///
/// Each conversation gets its own `Arc<Mutex<ConversationSession>>`: appends
/// to one conversation are serialized, different conversations proceed
/// independently. Cloning the manager shares the same registry.
///
/// # Example
/// ```
/// use masgent::session::{Message, SessionManager};
///
/// # tokio_test::block_on(async {
/// let manager = SessionManager::new(10);
/// let session = manager.get_or_create("cli:default").await;
/// session.lock().await.append_turn(Message::user("Hello"));
/// assert_eq!(manager.list().await, vec!["cli:default".to_string()]);
/// # });
/// ```
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<ConversationSession>>>>>,
    window_size: usize,
}

impl SessionManager {
    /// Create an empty registry whose sessions use `window_size`.
    pub fn new(window_size: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            window_size,
        }
    }

    /// Get the session for `key`, creating an idle one if needed.
    pub async fn get_or_create(&self, key: &str) -> Arc<Mutex<ConversationSession>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(key) {
                return Arc::clone(session);
            }
        }

        let mut sessions = self.sessions.write().await;
        // Another task may have created it between the two locks.
        Arc::clone(sessions.entry(key.to_string()).or_insert_with(|| {
            Arc::new(Mutex::new(ConversationSession::with_key(
                key,
                self.window_size,
            )))
        }))
    }

    /// Get the session for `key` without creating it.
    pub async fn get(&self, key: &str) -> Option<Arc<Mutex<ConversationSession>>> {
        let sessions = self.sessions.read().await;
        sessions.get(key).map(Arc::clone)
    }

    /// End the session for `key` and forget it.
    ///
    /// Returns `false` if no such session existed.
    pub async fn end(&self, key: &str) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(key)
        };
        match removed {
            Some(session) => {
                session.lock().await.end();
                true
            }
            None => false,
        }
    }

    /// All live session keys, sorted.
    pub async fn list(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        let mut keys: Vec<String> = sessions.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            window_size: self.window_size,
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new_is_idle() {
        let session = ConversationSession::new(10);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.is_empty());
        assert!(session.last_trim().is_none());
        assert_eq!(session.window_size(), 10);
        assert!(session.created_at() <= session.updated_at());
        assert!(uuid::Uuid::parse_str(session.key()).is_ok());
    }

    #[test]
    fn test_append_turn_activates() {
        let mut session = ConversationSession::new(10);
        session.append_turn(Message::user("Hello"));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.len(), 1);
        assert_eq!(
            session.last_trim(),
            Some(TrimOutcome::Unchanged { len: 1 })
        );
    }

    #[test]
    fn test_append_turn_trims_to_window() {
        let mut session = ConversationSession::new(4);
        session.append_turn(Message::system("sys"));
        for i in 0..10 {
            session.append_turn(Message::user(&format!("u{}", i)));
        }
        let history = session.history();
        assert_eq!(history.len(), 5);
        assert!(history[0].is_system());
        assert_eq!(history[4], Message::user("u9"));
        assert!(session.last_trim().unwrap().is_trimmed());
    }

    #[test]
    fn test_append_turn_keeps_tool_cycle_intact() {
        let mut session = ConversationSession::new(2);
        session.append_turn(Message::user("make NaCl"));
        session.append_turn(Message::model_with_tool_calls(
            "",
            vec![Part::tool_call("c1", "generate_vasp_poscar", "{}")],
        ));
        let history = session.append_turn(Message::tool_results(&[("c1", "POSCAR written")]));

        // A two-message window would start at the tool call, so nothing is cut.
        assert_eq!(history.len(), 3);
        assert!(find_orphaned_results(history).is_empty());

        session.append_turn(Message::model("Done."));
        session.append_turn(Message::user("thanks"));
        assert_eq!(
            session.history(),
            &vec![Message::model("Done."), Message::user("thanks")]
        );
    }

    #[test]
    fn test_end_discards_history() {
        let mut session = ConversationSession::new(10);
        session.append_turn(Message::user("Hello"));
        session.append_turn(Message::model("Hi"));
        assert_eq!(session.end(), 2);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.last_trim().is_none());
    }

    #[test]
    fn test_session_default_window() {
        let session = ConversationSession::default();
        assert_eq!(session.window_size(), DEFAULT_WINDOW_SIZE);
    }

    #[tokio::test]
    async fn test_manager_get_or_create_returns_same_session() {
        let manager = SessionManager::new(10);
        let a = manager.get_or_create("chat").await;
        let b = manager.get_or_create("chat").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.lock().await.key(), "chat");
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_manager_get_nonexistent() {
        let manager = SessionManager::default();
        assert!(manager.get("missing").await.is_none());
        assert!(manager.is_empty().await);
        assert_eq!(manager.window_size(), DEFAULT_WINDOW_SIZE);
    }

    #[tokio::test]
    async fn test_manager_end() {
        let manager = SessionManager::new(10);
        let session = manager.get_or_create("chat").await;
        session.lock().await.append_turn(Message::user("Hello"));

        assert!(manager.end("chat").await);
        assert!(!manager.end("chat").await);
        assert!(manager.get("chat").await.is_none());
        // Holders of the old handle see the ended session.
        assert_eq!(session.lock().await.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_manager_list_sorted() {
        let manager = SessionManager::new(10);
        manager.get_or_create("b").await;
        manager.get_or_create("a").await;
        manager.get_or_create("c").await;
        assert_eq!(manager.list().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_manager_clone_shares_registry() {
        let m1 = SessionManager::new(10);
        let m2 = m1.clone();
        m1.get_or_create("shared")
            .await
            .lock()
            .await
            .append_turn(Message::user("Hi"));
        let session = m2.get("shared").await.unwrap();
        assert_eq!(session.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_serialized() {
        let manager = Arc::new(SessionManager::new(4));
        let mut handles = Vec::new();

        for i in 0..10 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                let session = manager.get_or_create("concurrent").await;
                session
                    .lock()
                    .await
                    .append_turn(Message::user(&format!("Message {}", i)));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let session = manager.get("concurrent").await.unwrap();
        let session = session.lock().await;
        assert_eq!(session.len(), 4);
        assert_eq!(session.last_trim().unwrap().before(), 5);
    }
}
