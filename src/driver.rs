//! # Effect Driver
//!
//! Performs the `Effect`s returned by `update()`. Network calls and reveals
//! run as tokio tasks; each reports back by sending `Action`s on the channel
//! the event loop drains.
//!
//! ```text
//! update() ──Effect──▶ Driver::dispatch ──spawn──▶ task ──Action──▶ channel
//!                                                              │
//! update() ◀───────────────────── event loop try_recv ◀────────┘
//! ```
//!
//! Every spawned task finishes by sending exactly one completion action
//! (anything but `RevealFrame`), which is what [`drive`] counts on.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::api::ChatService;
use crate::core::action::{Action, Effect, update};
use crate::core::pointer::PointerStore;
use crate::core::reveal;
use crate::core::state::App;
use crate::core::view::BubbleId;

/// What `dispatch` did with an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A task was spawned and will report back on the channel.
    Spawned,
    /// Handled synchronously.
    Completed,
    Quit,
}

pub struct Driver {
    service: Arc<dyn ChatService>,
    pointer: PointerStore,
    tx: UnboundedSender<Action>,
    cadence: Duration,
}

impl Driver {
    pub fn new(
        service: Arc<dyn ChatService>,
        pointer: PointerStore,
        tx: UnboundedSender<Action>,
        cadence: Duration,
    ) -> Self {
        Self {
            service,
            pointer,
            tx,
            cadence,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, effect: Effect) -> Dispatch {
        debug!("Dispatching {:?}", effect);
        match effect {
            Effect::FetchSessions => {
                let service = self.service.clone();
                self.spawn("list_sessions", async move {
                    Action::SessionsLoaded(service.list_sessions().await)
                });
            }
            Effect::CreateSession => {
                let service = self.service.clone();
                self.spawn("create_session", async move {
                    Action::SessionCreated(service.create_session().await)
                });
            }
            Effect::SendChat {
                bubble,
                message,
                session_id,
            } => {
                let service = self.service.clone();
                self.spawn("chat", async move {
                    let outcome = service.send_message(&message, &session_id).await;
                    Action::ChatAnswered { bubble, outcome }
                });
            }
            Effect::Reveal { bubble, text } => self.spawn_reveal(bubble, text),
            Effect::FetchHistory(session_id) => {
                let service = self.service.clone();
                self.spawn("get_history", async move {
                    let result = service.get_history(&session_id).await;
                    Action::HistoryLoaded { session_id, result }
                });
            }
            Effect::DeleteSession(session_id) => {
                let service = self.service.clone();
                self.spawn("delete_session", async move {
                    let result = service.delete_session(&session_id).await;
                    Action::SessionDeleted { session_id, result }
                });
            }
            Effect::ClearAll => {
                let service = self.service.clone();
                self.spawn("clear_all", async move {
                    Action::AllCleared(service.clear_all().await)
                });
            }
            Effect::PersistPointer(session_id) => {
                if let Err(e) = self.pointer.save(session_id.as_deref()) {
                    warn!(
                        "Failed to persist session pointer to {}: {}",
                        self.pointer.path().display(),
                        e
                    );
                }
                return Dispatch::Completed;
            }
            Effect::Quit => return Dispatch::Quit,
        }
        Dispatch::Spawned
    }

    fn spawn<F>(&self, what: &'static str, task: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let action = task.await;
            if tx.send(action).is_err() {
                warn!("Failed to send {what} result: receiver dropped");
            }
        });
    }

    fn spawn_reveal(&self, bubble: BubbleId, text: String) {
        info!("Revealing reply ({} chars)", text.chars().count());
        let tx = self.tx.clone();
        let cadence = self.cadence;
        tokio::spawn(async move {
            let mut frames = pin!(reveal::prefixes(text.clone(), cadence));
            while let Some(partial) = frames.next().await {
                if tx.send(Action::RevealFrame { bubble, partial }).is_err() {
                    debug!("Reveal stopped: receiver dropped");
                    return;
                }
            }
            if tx.send(Action::RevealDone { bubble, text }).is_err() {
                warn!("Failed to send reveal completion: receiver dropped");
            }
        });
    }
}

/// Feeds `action` through `update()` and keeps executing effects and applying
/// their results until no task is outstanding. Used by headless callers and
/// tests; the TUI drains the channel from its own loop instead.
pub async fn drive(
    app: &mut App,
    driver: &Driver,
    rx: &mut UnboundedReceiver<Action>,
    action: Action,
) {
    let mut outstanding = 0usize;
    let mut next = Some(action);
    loop {
        let action = match next.take() {
            Some(action) => action,
            None if outstanding == 0 => break,
            None => match rx.recv().await {
                Some(action) => {
                    if !matches!(action, Action::RevealFrame { .. }) {
                        outstanding -= 1;
                    }
                    action
                }
                None => break,
            },
        };
        for effect in update(app, action) {
            match driver.dispatch(effect) {
                Dispatch::Spawned => outstanding += 1,
                Dispatch::Completed => {}
                Dispatch::Quit => return,
            }
        }
    }
}
