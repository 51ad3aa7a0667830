//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! Each iteration draws (if needed), waits for terminal input, routes it to
//! the focused component, then drains the action channel fed by the
//! `Driver`'s background tasks. Every action goes through `update()`, and the
//! effects it returns go straight back to the driver.
//!
//! ## Redraw Strategy
//!
//! - **Busy** (reply pending, reveal running, history loading): polls every
//!   ~50ms so the typing indicator animates and revealed text flows.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, error, info};
use tokio::sync::mpsc::unbounded_channel;

use crate::api::HttpChatService;
use crate::core::action::{Action, update};
use crate::core::config::ResolvedConfig;
use crate::core::pointer::PointerStore;
use crate::core::state::App;
use crate::driver::{Dispatch, Driver};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState, SidebarEvent, SidebarState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const BUSY_POLL: Duration = Duration::from_millis(50);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    /// Shown in the title bar.
    pub server: String,
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub sidebar: SidebarState,
    /// The view asked to jump to its newest item.
    pub scroll_requested: bool,
}

impl TuiState {
    pub fn new(server: String) -> Self {
        Self {
            server,
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            sidebar: SidebarState::new(),
            scroll_requested: false,
        }
    }

    /// Copies the input box props from `app`. Runs before each routed event
    /// as well as each frame, since one batch can hold several key presses.
    pub fn sync_input(&mut self, app: &App) {
        let locked = app.client.current_session_locked;
        self.input_box.locked = locked;
        self.input_box.busy = !app.input_enabled() && !locked;
        self.input_box.focused = !self.sidebar.focused;
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals
        // without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Runs `action` through the reducer and hands its effects to the driver.
/// Returns true when the app should exit.
fn apply(app: &mut App, driver: &Driver, action: Action) -> bool {
    debug!("Applying {:?}", action);
    update(app, action)
        .into_iter()
        .any(|effect| driver.dispatch(effect) == Dispatch::Quit)
}

/// Maps a terminal event to at most one action, updating TUI state on the way.
fn route_event(event: TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::NewChat => {
            tui.sidebar.blur();
            return Some(Action::NewChat);
        }
        TuiEvent::ToggleSidebar => {
            tui.sidebar.visible = !tui.sidebar.visible;
            if !tui.sidebar.visible {
                tui.sidebar.blur();
            }
            return None;
        }
        TuiEvent::FocusSidebar => {
            if tui.sidebar.focused {
                tui.sidebar.blur();
            } else {
                tui.sidebar
                    .focus(&app.sessions, app.client.current_session_id.as_deref());
            }
            return None;
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            return None;
        }
        TuiEvent::Resize => return None,
        _ => {}
    }

    if tui.sidebar.focused {
        return match tui.sidebar.handle_event(&app.sessions, &event)? {
            SidebarEvent::Switch(id) => {
                tui.sidebar.blur();
                Some(Action::SwitchSession(id))
            }
            SidebarEvent::NewChat => {
                tui.sidebar.blur();
                Some(Action::NewChat)
            }
            SidebarEvent::Delete(id) => Some(Action::DeleteSession(id)),
            SidebarEvent::ClearAll => Some(Action::ClearAll),
            SidebarEvent::Leave => {
                tui.sidebar.blur();
                None
            }
        };
    }

    match event {
        // Up/Down scroll the thread while the input box has focus
        TuiEvent::CursorUp => {
            tui.message_list.handle_event(&TuiEvent::ScrollUp);
            None
        }
        TuiEvent::CursorDown => {
            tui.message_list.handle_event(&TuiEvent::ScrollDown);
            None
        }
        _ => {
            tui.sync_input(app);
            match tui.input_box.handle_event(&event)? {
                InputEvent::Submit(text) => Some(Action::Submit(text)),
                InputEvent::ContentChanged => None,
            }
        }
    }
}

pub fn run(config: ResolvedConfig) -> io::Result<()> {
    let service = HttpChatService::new(&config.base_url, config.request_timeout).map_err(|e| {
        error!("Cannot build chat client for {}: {}", config.base_url, e);
        io::Error::other(e.to_string())
    })?;
    let server = service.base_url().to_string();
    let pointer = PointerStore::new(config.state_file.clone());
    let restored = pointer.load();
    info!(
        "Talking to {} (restored session: {:?})",
        config.base_url, restored
    );

    // Channel for actions from background tasks
    let (tx, mut rx) = unbounded_channel();
    let driver = Driver::new(Arc::new(service), pointer, tx, config.reveal_cadence);

    let mut app = App::new(config.greeting.clone(), restored);
    let mut tui = TuiState::new(server);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let mut should_quit = apply(&mut app, &driver, Action::Boot);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    while !should_quit {
        let busy = app.client.is_typing || app.switching_to.is_some() || app.booting;
        if busy {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.scroll_requested |= app.view.take_scroll_request();
            let typing_frame = (start_time.elapsed().as_millis() / 250) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, typing_frame))?;
            needs_redraw = false;
        }

        // Process first event + drain ALL pending events before next draw
        let mut next = poll_event_timeout(if busy { BUSY_POLL } else { IDLE_POLL })?;
        while let Some(event) = next {
            needs_redraw = true;
            if let Some(action) = route_event(event, &app, &mut tui)
                && apply(&mut app, &driver, action)
            {
                should_quit = true;
                break;
            }
            next = poll_event_immediate()?;
        }

        // Handle actions from background tasks
        while !should_quit && let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            should_quit = apply(&mut app, &driver, action);
        }
    }

    info!("Grip shutting down");
    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::DEFAULT_GREETING;

    fn app_in_session(id: &str) -> App {
        let mut app = App::new(DEFAULT_GREETING, Some(id.to_string()));
        app.view.show_greeting(DEFAULT_GREETING);
        app
    }

    /// Routes a batch of events the way the event loop does between frames.
    fn route_batch(events: Vec<TuiEvent>, app: &mut App, tui: &mut TuiState) -> Vec<Action> {
        let mut routed = Vec::new();
        for event in events {
            if let Some(action) = route_event(event, app, tui) {
                update(app, action.clone());
                routed.push(action);
            }
        }
        routed
    }

    #[test]
    fn second_enter_in_one_batch_keeps_the_draft() {
        let mut app = app_in_session("s1");
        let mut tui = TuiState::new("http://chat.local".into());

        let routed = route_batch(
            vec![
                TuiEvent::InputChar('a'),
                TuiEvent::Submit,
                TuiEvent::InputChar('b'),
                TuiEvent::Submit,
            ],
            &mut app,
            &mut tui,
        );

        assert_eq!(routed, vec![Action::Submit("a".into())]);
        assert_eq!(tui.input_box.buffer, "b");
        assert!(tui.input_box.busy);
    }

    #[test]
    fn locked_session_ignores_typing_before_any_frame() {
        let mut app = app_in_session("s1");
        app.client.current_session_locked = true;
        let mut tui = TuiState::new("http://chat.local".into());

        let routed = route_batch(
            vec![TuiEvent::InputChar('x'), TuiEvent::Submit],
            &mut app,
            &mut tui,
        );

        assert!(routed.is_empty());
        assert!(tui.input_box.buffer.is_empty());
    }

    #[test]
    fn sidebar_focus_takes_keys_from_the_input_box() {
        let mut app = app_in_session("s1");
        let mut tui = TuiState::new("http://chat.local".into());

        route_batch(vec![TuiEvent::FocusSidebar], &mut app, &mut tui);
        assert!(tui.sidebar.focused);
        tui.sync_input(&app);
        assert!(!tui.input_box.focused);
        assert!(!tui.input_box.locked);

        route_batch(vec![TuiEvent::FocusSidebar], &mut app, &mut tui);
        tui.sync_input(&app);
        assert!(tui.input_box.focused);
    }
}
