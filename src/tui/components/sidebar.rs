//! # Sidebar Component
//!
//! Session list on the left of the thread. Ctrl+B shows or hides it, Ctrl+O
//! moves keyboard focus into it and Esc hands focus back to the input box.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state and the session list
//!
//! The list itself belongs to `App`; the sidebar only tracks the selection
//! and pending confirmations.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};

use crate::api::Session;
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

/// Below this terminal width the sidebar only appears while focused.
pub const COLLAPSE_WIDTH: u16 = 80;
pub const SIDEBAR_WIDTH: u16 = 32;

const LOCK_MARKER: &str = "⊘ ";

/// A destructive command waiting for its second keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Delete,
    ClearAll,
}

/// Events emitted by the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarEvent {
    Switch(String),
    NewChat,
    Delete(String),
    ClearAll,
    /// Give focus back to the input box.
    Leave,
}

pub struct SidebarState {
    /// Toggled with Ctrl+B.
    pub visible: bool,
    pub focused: bool,
    pub selected: usize,
    pub confirm: Option<Confirm>,
    pub list_state: ListState,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self::new()
    }
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            visible: true,
            focused: false,
            selected: 0,
            confirm: None,
            list_state: ListState::default(),
        }
    }

    /// Columns the sidebar takes out of a terminal `width` wide.
    pub fn width(&self, width: u16) -> u16 {
        if width < COLLAPSE_WIDTH {
            if self.focused { width } else { 0 }
        } else if self.visible || self.focused {
            SIDEBAR_WIDTH
        } else {
            0
        }
    }

    pub fn focus(&mut self, sessions: &[Session], current: Option<&str>) {
        self.focused = true;
        self.confirm = None;
        // Start on the open session when there is one
        self.selected = current
            .and_then(|id| sessions.iter().position(|s| s.id == id))
            .unwrap_or(0);
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.confirm = None;
    }

    /// Keeps the selection inside a list that may have shrunk.
    fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Handle a key while focused, returning a SidebarEvent if the app should act.
    pub fn handle_event(&mut self, sessions: &[Session], event: &TuiEvent) -> Option<SidebarEvent> {
        self.clamp(sessions.len());
        let pending = self.confirm.take();

        match event {
            TuiEvent::Escape => Some(SidebarEvent::Leave),
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                if !sessions.is_empty() {
                    self.selected = (self.selected + 1).min(sessions.len() - 1);
                }
                None
            }
            TuiEvent::Submit => sessions
                .get(self.selected)
                .map(|s| SidebarEvent::Switch(s.id.clone())),
            TuiEvent::InputChar('n') => Some(SidebarEvent::NewChat),
            TuiEvent::InputChar('d') => {
                let session = sessions.get(self.selected)?;
                if pending == Some(Confirm::Delete) {
                    Some(SidebarEvent::Delete(session.id.clone()))
                } else {
                    self.confirm = Some(Confirm::Delete);
                    None
                }
            }
            TuiEvent::InputChar('c') => {
                if pending == Some(Confirm::ClearAll) {
                    Some(SidebarEvent::ClearAll)
                } else {
                    self.confirm = Some(Confirm::ClearAll);
                    None
                }
            }
            _ => None,
        }
    }
}

/// Shortens a preview to `width` columns, breaking at a word when possible.
fn fit_preview(preview: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let flat = preview.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut lines = textwrap::wrap(&flat, width.saturating_sub(1).max(1));
    match lines.len() {
        0 => String::new(),
        1 => lines.remove(0).into_owned(),
        _ => format!("{}…", lines[0]),
    }
}

/// Transient render wrapper for the sidebar.
pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
    sessions: &'a [Session],
    current: Option<&'a str>,
}

impl<'a> Sidebar<'a> {
    pub fn new(state: &'a mut SidebarState, sessions: &'a [Session], current: Option<&'a str>) -> Self {
        Self {
            state,
            sessions,
            current,
        }
    }
}

impl<'a> Component for Sidebar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.clamp(self.sessions.len());

        let help = match (self.state.focused, self.state.confirm) {
            (true, Some(Confirm::Delete)) => " d again to delete ",
            (true, Some(Confirm::ClearAll)) => " c again to clear all ",
            (true, None) => " ⏎ open  n new  d del  c clear ",
            (false, _) => " Ctrl+O focus ",
        };
        let border = if self.state.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Chats ")
            .title_bottom(Line::from(help).centered())
            .padding(Padding::horizontal(1));

        if self.sessions.is_empty() {
            let empty = Paragraph::new("No chats yet.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let inner_width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .sessions
            .iter()
            .map(|session| {
                let is_current = self.current == Some(session.id.as_str());
                let mut style = if is_current {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                if session.is_locked {
                    style = style.add_modifier(Modifier::DIM);
                }
                let marker = if session.is_locked { LOCK_MARKER } else { "" };
                let preview = fit_preview(&session.preview, inner_width.saturating_sub(marker.chars().count()));
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(preview, style),
                ]))
            })
            .collect();

        let highlight = match self.state.confirm {
            Some(Confirm::Delete) => Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            _ => Style::default().add_modifier(Modifier::REVERSED),
        };
        let list = List::new(items).block(block).highlight_style(highlight);

        self.state
            .list_state
            .select(self.state.focused.then_some(self.state.selected));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
