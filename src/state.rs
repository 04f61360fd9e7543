//! Shared application state.
//!
//! [`AppState`] is the single observable container for the active ids, the
//! operating mode, and the memory policy. It is built on a
//! `tokio::sync::watch` channel so downstream components subscribe
//! explicitly and are notified deterministically, instead of relying on
//! ambient global notification.
//!
//! Writer discipline: user-selected ids go through the public setters; mode
//! and memory policy are written only by the mode controller through a
//! crate-private setter, which is what keeps the mode/policy coupling
//! invariant enforceable in one place.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Operating mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    /// Retrieval-augmented generation against a knowledge base.
    #[serde(rename = "RAG")]
    Rag,
    /// Free-form conversation.
    Chatbot,
}

/// Conversation memory policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPolicy {
    /// No conversation memory. The only policy RAG mode permits.
    Off,
    /// Memory kept for the current session only.
    Session,
    /// Memory persisted across sessions.
    Persisted,
}

/// Point-in-time copy of the application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Currently active knowledge base, if any.
    pub active_knowledge_base_id: Option<String>,
    /// Currently active model, if any.
    pub active_model_id: Option<String>,
    /// Current operating mode.
    pub active_mode: AppMode,
    /// Currently active profile, if any.
    pub active_profile_id: Option<String>,
    /// Current memory policy.
    pub memory_policy: MemoryPolicy,
}

impl Default for StateSnapshot {
    /// Safe startup defaults: chatbot mode with session memory, no ids.
    fn default() -> Self {
        Self {
            active_knowledge_base_id: None,
            active_model_id: None,
            active_mode: AppMode::Chatbot,
            active_profile_id: None,
            memory_policy: MemoryPolicy::Session,
        }
    }
}

/// Shared, observable application state. Created once at startup and lives
/// for the process lifetime.
#[derive(Debug)]
pub struct AppState {
    tx: watch::Sender<StateSnapshot>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create state with startup defaults.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(StateSnapshot::default());
        Self { tx }
    }

    /// Current state as an owned snapshot.
    pub fn snapshot(&self) -> StateSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribe to state changes. The receiver observes every committed
    /// write in order.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.tx.subscribe()
    }

    /// Current operating mode.
    pub fn active_mode(&self) -> AppMode {
        self.tx.borrow().active_mode
    }

    /// Current memory policy.
    pub fn memory_policy(&self) -> MemoryPolicy {
        self.tx.borrow().memory_policy
    }

    /// Currently active model id, if any.
    pub fn active_model_id(&self) -> Option<String> {
        self.tx.borrow().active_model_id.clone()
    }

    /// Select (or clear) the active model.
    pub fn set_active_model_id(&self, id: Option<String>) {
        self.tx.send_modify(|state| state.active_model_id = id);
    }

    /// Select (or clear) the active knowledge base.
    pub fn set_active_knowledge_base_id(&self, id: Option<String>) {
        self.tx.send_modify(|state| state.active_knowledge_base_id = id);
    }

    /// Select (or clear) the active profile.
    pub fn set_active_profile_id(&self, id: Option<String>) {
        self.tx.send_modify(|state| state.active_profile_id = id);
    }

    /// Write mode and memory policy in one committed update.
    ///
    /// Crate-private: only the mode controller may call this, which makes it
    /// the sole writer of these two fields.
    pub(crate) fn set_mode_and_policy(&self, mode: AppMode, policy: MemoryPolicy) {
        self.tx.send_modify(|state| {
            state.active_mode = mode;
            state.memory_policy = policy;
        });
    }
}
