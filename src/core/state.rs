//! # Application State
//!
//! Core business state for Grip. Domain logic only, no TUI types.
//! Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── client: ClientState           // current session, lock, typing flag
//! ├── view: View                    // message thread (render sink)
//! ├── sessions: Vec<Session>        // last fetched session list
//! ├── greeting: String              // shown in the session-less view
//! ├── status_message: String        // status bar text
//! ├── pending_send: Option<String>  // message waiting for its session
//! ├── exchange: Option<Exchange>    // the in-flight send → reveal
//! ├── switching_to: Option<String>  // session whose history is loading
//! └── booting: bool                 // bootstrap not finished
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::api::Session;
use crate::core::view::{BubbleId, View};

pub const DEFAULT_GREETING: &str = "Hello! I am Grip. How can I help you today?";

/// The small piece of state the send/switch protocol revolves around.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    /// Persisted across restarts. `None` = session-less greeting view.
    pub current_session_id: Option<String>,
    pub current_session_locked: bool,
    /// Set for the whole send → reveal exchange. Serializes sends and blocks
    /// switching and deleting.
    pub is_typing: bool,
}

impl ClientState {
    pub fn input_enabled(&self) -> bool {
        !self.is_typing && !self.current_session_locked
    }
}

/// Bookkeeping for the exchange in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Placeholder bot bubble the reply is revealed into.
    pub bubble: BubbleId,
    pub session_id: String,
    /// No user bubble existed before this send.
    pub first_message: bool,
    /// Refresh the session list once the reveal completes.
    pub refresh_after: bool,
}

pub struct App {
    pub client: ClientState,
    pub view: View,
    pub sessions: Vec<Session>,
    pub greeting: String,
    pub status_message: String,
    pub pending_send: Option<String>,
    pub exchange: Option<Exchange>,
    pub switching_to: Option<String>,
    pub booting: bool,
}

impl App {
    /// `restored_session` is the pointer persisted by a previous run.
    pub fn new(greeting: impl Into<String>, restored_session: Option<String>) -> Self {
        Self {
            client: ClientState {
                current_session_id: restored_session,
                ..ClientState::default()
            },
            view: View::new(),
            sessions: Vec::new(),
            greeting: greeting.into(),
            status_message: String::from("Welcome to Grip!"),
            pending_send: None,
            exchange: None,
            switching_to: None,
            booting: false,
        }
    }

    pub fn is_current(&self, session_id: &str) -> bool {
        self.client.current_session_id.as_deref() == Some(session_id)
    }

    /// Whether the user may type and send right now.
    pub fn input_enabled(&self) -> bool {
        self.client.input_enabled() && self.switching_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_new_defaults() {
        let app = App::new(DEFAULT_GREETING, Some("s1".into()));
        assert_eq!(app.client.current_session_id.as_deref(), Some("s1"));
        assert!(!app.client.is_typing);
        assert!(!app.client.current_session_locked);
        assert!(app.input_enabled());
        assert!(app.view.items.is_empty());
    }

    #[test]
    fn lock_or_typing_disables_input() {
        let mut state = ClientState::default();
        state.is_typing = true;
        assert!(!state.input_enabled());
        state.is_typing = false;
        state.current_session_locked = true;
        assert!(!state.input_enabled());
    }
}
