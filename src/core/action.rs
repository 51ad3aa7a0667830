//! # Actions
//!
//! Everything that can happen in Grip becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The service answers? That's `Action::ChatAnswered { .. }`.
//!
//! `update()` takes the current state and an action, mutates the state and
//! returns the `Effect`s the runtime must perform. No I/O happens here; the
//! driver executes effects and feeds their results back as new actions.
//!
//! ```text
//! State + Action  →  update()  →  New State + [Effect]
//!                                        │
//!                        driver ─────────┘──→ Action (result)
//! ```
//!
//! The send exchange as a state machine:
//!
//! ```text
//! Idle ──Submit──▶ (CreateSession) ──▶ Sending ──Ok/400──▶ Revealing ──Done──▶ Idle
//!                                         │
//!                                         ├──423──▶ Locked
//!                                         └──error──▶ Idle (error bubble)
//! ```

use log::{debug, info, warn};

use crate::api::{ApiError, History, Message, Session};
use crate::core::state::{App, Exchange};
use crate::core::view::{BubbleBody, BubbleId};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Start-up: refresh the list, then restore the last session or greet.
    Boot,
    SessionsLoaded(Result<Vec<Session>, ApiError>),
    /// User pressed send.
    Submit(String),
    SessionCreated(Result<String, ApiError>),
    ChatAnswered {
        bubble: BubbleId,
        outcome: Result<String, ApiError>,
    },
    /// One more prefix of the reply became visible.
    RevealFrame { bubble: BubbleId, partial: String },
    /// The reveal finished; render the full text formatted.
    RevealDone { bubble: BubbleId, text: String },
    SwitchSession(String),
    HistoryLoaded {
        session_id: String,
        result: Result<History, ApiError>,
    },
    NewChat,
    DeleteSession(String),
    SessionDeleted {
        session_id: String,
        result: Result<(), ApiError>,
    },
    ClearAll,
    AllCleared(Result<(), ApiError>),
    Quit,
}

/// Side effects requested by `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchSessions,
    CreateSession,
    SendChat {
        bubble: BubbleId,
        message: String,
        session_id: String,
    },
    Reveal { bubble: BubbleId, text: String },
    FetchHistory(String),
    DeleteSession(String),
    ClearAll,
    /// Write (or clear) the persisted current-session pointer.
    PersistPointer(Option<String>),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Boot => {
            info!("Bootstrapping");
            app.booting = true;
            vec![Effect::FetchSessions]
        }
        Action::SessionsLoaded(result) => sessions_loaded(app, result),
        Action::Submit(text) => submit(app, text),
        Action::SessionCreated(result) => session_created(app, result),
        Action::ChatAnswered { bubble, outcome } => chat_answered(app, bubble, outcome),
        Action::RevealFrame { bubble, partial } => {
            // Frames for a bubble that was cleared away are dropped.
            app.view.set_body(bubble, BubbleBody::Revealing(partial));
            vec![]
        }
        Action::RevealDone { bubble, text } => reveal_done(app, bubble, text),
        Action::SwitchSession(id) => {
            if app.client.is_typing {
                debug!("Ignoring switch to {id}: exchange in flight");
                return vec![];
            }
            switch_to(app, id)
        }
        Action::HistoryLoaded { session_id, result } => history_loaded(app, session_id, result),
        Action::NewChat => {
            if app.pending_send.is_some() {
                debug!("Ignoring new chat: session creation pending");
                return vec![];
            }
            reset_to_greeting(app)
        }
        Action::DeleteSession(id) => {
            if app.client.is_typing {
                debug!("Ignoring delete of {id}: exchange in flight");
                return vec![];
            }
            vec![Effect::DeleteSession(id)]
        }
        Action::SessionDeleted { session_id, result } => match result {
            Ok(()) => {
                app.sessions.retain(|s| s.id != session_id);
                if app.is_current(&session_id) {
                    let mut effects = reset_to_greeting(app);
                    effects.push(Effect::FetchSessions);
                    effects
                } else {
                    vec![Effect::FetchSessions]
                }
            }
            Err(e) => {
                warn!("Failed to delete session {session_id}: {e}");
                app.status_message = format!("Delete failed: {e}");
                vec![]
            }
        },
        Action::ClearAll => {
            if app.client.is_typing {
                debug!("Ignoring clear all: exchange in flight");
                return vec![];
            }
            vec![Effect::ClearAll]
        }
        Action::AllCleared(result) => match result {
            Ok(()) => {
                app.sessions.clear();
                let mut effects = reset_to_greeting(app);
                effects.push(Effect::FetchSessions);
                effects
            }
            Err(e) => {
                warn!("Failed to clear sessions: {e}");
                app.status_message = format!("Clear failed: {e}");
                vec![]
            }
        },
        Action::Quit => vec![Effect::Quit],
    }
}

fn sessions_loaded(app: &mut App, result: Result<Vec<Session>, ApiError>) -> Vec<Effect> {
    let mut effects = Vec::new();
    match result {
        Ok(sessions) => {
            debug!("Session list refreshed: {} sessions", sessions.len());
            if sessions.is_empty() && app.client.current_session_id.is_some() {
                app.client.current_session_id = None;
                effects.push(Effect::PersistPointer(None));
            }
            app.sessions = sessions;
        }
        Err(e) => {
            warn!("Failed to load sessions: {e}");
            app.status_message = format!("Could not load sessions: {e}");
        }
    }

    if std::mem::take(&mut app.booting) {
        match app.client.current_session_id.clone() {
            Some(id) => effects.extend(switch_to(app, id)),
            None => app.view.show_greeting(&app.greeting),
        }
    }
    effects
}

fn submit(app: &mut App, text: String) -> Vec<Effect> {
    if app.client.is_typing || app.client.current_session_locked {
        debug!("Ignoring submit: typing={}, locked={}", app.client.is_typing, app.client.current_session_locked);
        return vec![];
    }
    if app.switching_to.is_some() {
        debug!("Ignoring submit: session switch in progress");
        return vec![];
    }
    let text = text.trim().to_string();
    if text.is_empty() {
        return vec![];
    }

    app.client.is_typing = true;
    match app.client.current_session_id.clone() {
        Some(session_id) => begin_exchange(app, text, session_id),
        None => {
            info!("No current session, creating one before sending");
            app.pending_send = Some(text);
            vec![Effect::CreateSession]
        }
    }
}

fn session_created(app: &mut App, result: Result<String, ApiError>) -> Vec<Effect> {
    let Some(text) = app.pending_send.take() else {
        warn!("Session created with no pending message");
        return vec![];
    };
    match result {
        Ok(session_id) => {
            app.client.current_session_id = Some(session_id.clone());
            let mut effects = vec![Effect::PersistPointer(Some(session_id.clone()))];
            effects.extend(begin_exchange(app, text, session_id));
            effects
        }
        Err(e) => {
            warn!("Failed to create session: {e}");
            app.view.remove_greeting();
            app.view.push_message(&Message::user(text));
            app.view.push_error(format!("Error: {e}."));
            app.client.is_typing = false;
            vec![]
        }
    }
}

/// Optimistically shows the user's message plus a typing placeholder and
/// asks the driver to send. The user bubble is never rolled back.
fn begin_exchange(app: &mut App, text: String, session_id: String) -> Vec<Effect> {
    let first_message = !app.view.has_user_bubble();
    app.view.remove_greeting();
    app.view.push_message(&Message::user(text.clone()));
    let bubble = app.view.push_typing();
    app.exchange = Some(Exchange {
        bubble,
        session_id: session_id.clone(),
        first_message,
        refresh_after: false,
    });
    vec![Effect::SendChat {
        bubble,
        message: text,
        session_id,
    }]
}

fn chat_answered(app: &mut App, bubble: BubbleId, outcome: Result<String, ApiError>) -> Vec<Effect> {
    let Some(exchange) = app.exchange.as_mut().filter(|x| x.bubble == bubble) else {
        warn!("Dropping answer for unknown exchange {:?}", bubble);
        return vec![];
    };

    match outcome {
        Ok(reply) => {
            exchange.refresh_after = exchange.first_message;
            start_reveal(app, bubble, reply)
        }
        Err(ApiError::Rejected(reply)) => {
            info!("Message rejected by service, revealing its reply");
            exchange.refresh_after = true;
            start_reveal(app, bubble, reply)
        }
        Err(ApiError::Locked(reason)) => {
            let session_id = exchange.session_id.clone();
            info!("Session {session_id} locked: {reason}");
            // The user may have left for a new chat while waiting.
            if app.is_current(&session_id) {
                app.client.current_session_locked = true;
                app.view.push_locked_notice();
            }
            app.view.remove(bubble);
            finish_exchange(app);
            vec![Effect::FetchSessions]
        }
        Err(e) => {
            if e.is_hard_failure() {
                warn!("Chat request failed: {e}");
            } else {
                info!("Chat request refused: {e}");
            }
            // A session created for this send exists server-side even
            // though the exchange failed.
            let refresh = exchange.first_message;
            app.view.set_body(bubble, BubbleBody::Error(format!("Error: {e}.")));
            finish_exchange(app);
            if refresh {
                vec![Effect::FetchSessions]
            } else {
                vec![]
            }
        }
    }
}

fn start_reveal(app: &mut App, bubble: BubbleId, text: String) -> Vec<Effect> {
    app.view.set_body(bubble, BubbleBody::Revealing(String::new()));
    vec![Effect::Reveal { bubble, text }]
}

fn reveal_done(app: &mut App, bubble: BubbleId, text: String) -> Vec<Effect> {
    app.view.set_body(bubble, BubbleBody::Formatted(text));
    match app.exchange.as_ref() {
        Some(exchange) if exchange.bubble == bubble => {
            let refresh = exchange.refresh_after;
            finish_exchange(app);
            if refresh {
                vec![Effect::FetchSessions]
            } else {
                vec![]
            }
        }
        _ => vec![],
    }
}

/// Exit step of every exchange path: the flag always drops, input comes
/// back unless the session is now locked.
fn finish_exchange(app: &mut App) {
    app.exchange = None;
    app.client.is_typing = false;
    app.view.request_scroll();
}

fn switch_to(app: &mut App, session_id: String) -> Vec<Effect> {
    info!("Switching to session {session_id}");
    app.client.current_session_id = Some(session_id.clone());
    app.view.clear();
    app.switching_to = Some(session_id.clone());
    vec![
        Effect::PersistPointer(Some(session_id.clone())),
        Effect::FetchHistory(session_id),
    ]
}

fn history_loaded(app: &mut App, session_id: String, result: Result<History, ApiError>) -> Vec<Effect> {
    if app.switching_to.as_deref() != Some(session_id.as_str()) {
        debug!("Ignoring stale history for {session_id}");
        return vec![];
    }
    app.switching_to = None;

    match result {
        Ok(history) => {
            app.client.current_session_locked = history.locked;
            if history.messages.is_empty() {
                app.view.show_greeting(&app.greeting);
            } else {
                for message in &history.messages {
                    app.view.push_message(message);
                }
            }
            if history.locked {
                app.view.push_locked_notice();
            }
            vec![]
        }
        Err(e) => {
            // A vanished session and a failed fetch look the same to the user.
            info!("Session {session_id} unavailable ({e}), falling back to greeting");
            app.client.current_session_id = None;
            app.client.current_session_locked = false;
            app.view.show_greeting(&app.greeting);
            vec![Effect::PersistPointer(None)]
        }
    }
}

fn reset_to_greeting(app: &mut App) -> Vec<Effect> {
    app.view.show_greeting(&app.greeting);
    app.client.current_session_locked = false;
    app.client.current_session_id = None;
    app.switching_to = None;
    vec![Effect::PersistPointer(None)]
}
