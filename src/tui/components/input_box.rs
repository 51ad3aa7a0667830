//! # InputBox Component
//!
//! Multi-line message editor at the bottom of the screen.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, Ctrl+J newlines)
//! - Handle editing (backspace, delete, cursor movement)
//! - Emit `Submit` on Enter when sending is allowed
//! - Show why input is unavailable: a placeholder when the session is
//!   locked, a greyed border while a reply is pending
//!
//! The buffer and cursor are internal state. `locked`, `busy` and `focused`
//! are props synced from the application state before every event and frame.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border (2) + padding (2) consumed horizontally.
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;
/// Visible text rows before the box scrolls internally.
const MAX_VISIBLE_ROWS: u16 = 5;

pub const PLACEHOLDER: &str = "Send a message...";
pub const LOCKED_PLACEHOLDER: &str = "Session locked - start a new chat";

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    cursor: usize,
    /// The current session no longer accepts messages.
    pub locked: bool,
    /// A reply is pending; editing is allowed but sending is not.
    pub busy: bool,
    /// Owns the terminal cursor. Another pane has focus when false.
    pub focused: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `text` into display rows of at most `width` columns, breaking at
/// newlines and wherever a row is full. Rows are byte ranges into `text`.
fn layout_rows(text: &str, width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut line_start = 0;
    for line in text.split('\n') {
        let mut row_start = line_start;
        let mut row_width = 0;
        for (i, c) in line.char_indices() {
            let w = c.width().unwrap_or(0);
            if row_width + w > width && row_width > 0 {
                rows.push(row_start..line_start + i);
                row_start = line_start + i;
                row_width = 0;
            }
            row_width += w;
        }
        rows.push(row_start..line_start + line.len());
        line_start += line.len() + 1;
    }
    rows
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            locked: false,
            busy: false,
            focused: true,
        }
    }

    fn can_send(&self) -> bool {
        !self.locked && !self.busy
    }

    fn shows_cursor(&self) -> bool {
        self.focused && !self.locked
    }

    fn inner_width(area_width: u16) -> usize {
        area_width.saturating_sub(HORIZONTAL_OVERHEAD) as usize
    }

    /// Height for the current buffer at `area_width`, borders included.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = layout_rows(&self.buffer, Self::inner_width(area_width)).len() as u16;
        rows.clamp(1, MAX_VISIBLE_ROWS) + VERTICAL_OVERHEAD
    }

    /// Row and column of the cursor in `rows`.
    fn cursor_cell(&self, rows: &[Range<usize>]) -> (usize, u16) {
        let row = rows
            .iter()
            .rposition(|r| r.start <= self.cursor)
            .unwrap_or(0);
        let start = rows.get(row).map_or(0, |r| r.start);
        (row, self.buffer[start..self.cursor].width() as u16)
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    fn insert(&mut self, text: &str) -> Option<InputEvent> {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
        Some(InputEvent::ContentChanged)
    }

    fn move_to(&mut self, pos: usize) -> Option<InputEvent> {
        (pos != self.cursor).then(|| {
            self.cursor = pos;
            InputEvent::ContentChanged
        })
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (title, border) = if self.locked {
            (" Locked ", Style::default().fg(Color::Yellow))
        } else if self.busy {
            (" Waiting for reply… ", Style::default().fg(Color::DarkGray))
        } else {
            (
                " Message · Enter send · Ctrl+J newline ",
                Style::default().fg(Color::Green),
            )
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(title)
            .padding(Padding::horizontal(1));

        if self.buffer.is_empty() {
            let placeholder = if self.locked {
                LOCKED_PLACEHOLDER
            } else {
                PLACEHOLDER
            };
            let text = Paragraph::new(placeholder)
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                .block(block);
            frame.render_widget(text, area);
            if self.shows_cursor() {
                frame.set_cursor_position((area.x + 2, area.y + 1));
            }
            return;
        }

        let rows = layout_rows(&self.buffer, Self::inner_width(area.width));
        let (cursor_row, cursor_col) = self.cursor_cell(&rows);
        let visible = MAX_VISIBLE_ROWS as usize;
        let first = cursor_row.saturating_sub(visible - 1);

        let text_style = if self.can_send() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let lines: Vec<Line> = rows
            .iter()
            .skip(first)
            .take(visible)
            .map(|r| Line::styled(self.buffer[r.clone()].to_string(), text_style))
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);

        if self.shows_cursor() {
            let y = area.y + 1 + (cursor_row - first) as u16;
            let x = (area.x + 2 + cursor_col).min(area.right().saturating_sub(2));
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.locked {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            TuiEvent::Paste(text) => self.insert(&text.replace('\r', "")),
            TuiEvent::Backspace => {
                let prev = self.prev_boundary();
                (prev != self.cursor).then(|| {
                    self.buffer.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Delete => {
                let next = self.next_boundary();
                (next != self.cursor).then(|| {
                    self.buffer.replace_range(self.cursor..next, "");
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorLeft => self.move_to(self.prev_boundary()),
            TuiEvent::CursorRight => self.move_to(self.next_boundary()),
            TuiEvent::CursorHome => {
                let start = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                self.move_to(start)
            }
            TuiEvent::CursorEnd => {
                let end = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                self.move_to(end)
            }
            TuiEvent::Submit => {
                if !self.can_send() || self.buffer.trim().is_empty() {
                    return None;
                }
                self.cursor = 0;
                Some(InputEvent::Submit(std::mem::take(&mut self.buffer)))
            }
            _ => None,
        }
    }
}
