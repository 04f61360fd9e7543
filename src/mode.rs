//! Mode switching and memory policy enforcement.
//!
//! Rules:
//! - RAG mode ALWAYS forces `MemoryPolicy::Off`.
//! - Chatbot mode defaults to `MemoryPolicy::Session`.
//! - If the user previously enabled persisted memory, re-entering Chatbot
//!   mode restores it instead of resetting to the default.
//! - Switching Chatbot -> RAG immediately disables memory usage.
//!
//! The only reachable mode/policy combinations are `(Rag, Off)`,
//! `(Chatbot, Session)` and `(Chatbot, Persisted)`; anything else is a bug.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::state::{AppMode, AppState, MemoryPolicy};

/// Sole authority for transitions between operating mode and memory policy.
///
/// Pure state machine over [`AppState`]: no I/O, no error paths on mode
/// switches, boolean rejection on invalid policy changes.
pub struct ModeController {
    state: Arc<AppState>,
    /// Most recent non-off policy chosen while in Chatbot mode, restored on
    /// RAG -> Chatbot. Always `Session` or `Persisted`, because Chatbot mode
    /// never carries `Off` and `set_memory_policy` rejects `Off`.
    last_chatbot_memory_policy: Mutex<MemoryPolicy>,
}

impl ModeController {
    /// Create a controller over the shared state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            last_chatbot_memory_policy: Mutex::new(MemoryPolicy::Session),
        }
    }

    /// Switch to the given mode, enforcing the memory policy rules. This
    /// transition always succeeds; switching to the mode already active is
    /// an idempotent re-assertion of the same values.
    pub fn switch_to_mode(&self, mode: AppMode) {
        match mode {
            AppMode::Rag => {
                // Snapshot the Chatbot policy before forcing memory off, so
                // it can be restored later.
                if self.state.active_mode() == AppMode::Chatbot {
                    let current = self.state.memory_policy();
                    if current != MemoryPolicy::Off {
                        *self.last_chatbot_memory_policy.lock() = current;
                    }
                }
                self.state.set_mode_and_policy(AppMode::Rag, MemoryPolicy::Off);
            }
            AppMode::Chatbot => {
                let restored = *self.last_chatbot_memory_policy.lock();
                self.state.set_mode_and_policy(AppMode::Chatbot, restored);
            }
        }
        debug!(mode = ?self.state.active_mode(), policy = ?self.state.memory_policy(), "mode switched");
    }

    /// Set the memory policy. Only valid in Chatbot mode and only for real
    /// policies: memory is turned off implicitly by switching to RAG, never
    /// explicitly by the user.
    ///
    /// Returns `false` (with no state change) when rejected.
    pub fn set_memory_policy(&self, policy: MemoryPolicy) -> bool {
        if self.state.active_mode() != AppMode::Chatbot {
            return false;
        }
        if policy == MemoryPolicy::Off {
            return false;
        }

        self.state.set_mode_and_policy(AppMode::Chatbot, policy);
        *self.last_chatbot_memory_policy.lock() = policy;
        true
    }

    /// Current operating mode.
    pub fn current_mode(&self) -> AppMode {
        self.state.active_mode()
    }

    /// Current memory policy.
    pub fn current_memory_policy(&self) -> MemoryPolicy {
        self.state.memory_policy()
    }
}
