//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiError, ChatService, History, Message, Session};

#[derive(Default)]
struct FakeState {
    sessions: Vec<Session>,
    histories: HashMap<String, History>,
    outcomes: VecDeque<Result<String, ApiError>>,
    sent: Vec<(String, String)>,
    created: u32,
}

/// In-memory chat service. Replies are scripted with `push_outcome`;
/// unscripted sends echo the message back.
#[derive(Default)]
pub struct FakeChatService {
    state: Mutex<FakeState>,
}

impl FakeChatService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Adds a stored session with `(user, bot)` exchanges.
    pub fn add_session(&self, id: &str, exchanges: Vec<(&str, &str)>, locked: bool) {
        let messages = exchanges
            .into_iter()
            .flat_map(|(q, a)| [Message::user(q), Message::bot(a)])
            .collect();
        let mut state = self.lock();
        state.sessions.push(Session {
            id: id.to_string(),
            preview: "New Chat".to_string(),
            is_locked: locked,
        });
        state
            .histories
            .insert(id.to_string(), History { messages, locked });
    }

    pub fn push_outcome(&self, outcome: Result<String, ApiError>) {
        self.lock().outcomes.push_back(outcome);
    }

    /// `(message, session_id)` for every `send_message` call so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.lock().sent.clone()
    }
}

#[async_trait]
impl ChatService for FakeChatService {
    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        Ok(self.lock().sessions.clone())
    }

    async fn get_history(&self, session_id: &str) -> Result<History, ApiError> {
        self.lock()
            .histories
            .get(session_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_session(&self) -> Result<String, ApiError> {
        let mut state = self.lock();
        state.created += 1;
        let id = format!("fake-{}", state.created);
        state.sessions.insert(
            0,
            Session {
                id: id.clone(),
                preview: "New Chat".to_string(),
                is_locked: false,
            },
        );
        state.histories.insert(id.clone(), History::default());
        Ok(id)
    }

    async fn send_message(&self, message: &str, session_id: &str) -> Result<String, ApiError> {
        let mut state = self.lock();
        state
            .sent
            .push((message.to_string(), session_id.to_string()));
        let outcome = state
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(format!("echo: {message}")));

        let Some(history) = state.histories.get_mut(session_id) else {
            return Err(ApiError::NotFound);
        };
        match &outcome {
            Ok(reply) | Err(ApiError::Rejected(reply)) => {
                history.messages.push(Message::user(message));
                history.messages.push(Message::bot(reply.clone()));
            }
            Err(ApiError::Locked(_)) => history.locked = true,
            Err(_) => {}
        }
        let locked = history.locked;
        if let Some(session) = state.sessions.iter_mut().find(|s| s.id == session_id) {
            session.preview = message.to_string();
            session.is_locked = locked;
        }
        outcome
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.id != session_id);
        state.histories.remove(session_id);
        if state.sessions.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.sessions.clear();
        state.histories.clear();
        Ok(())
    }
}
