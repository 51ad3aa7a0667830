use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::api::Role;
use crate::core::view::{Bubble, BubbleBody, ViewItem};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

pub const LOCKED_NOTICE: &str = "This chat is locked and cannot accept new messages, \
    but you can review previous messages above.";

const TYPING_FRAMES: [&str; 4] = ["●  ", "●● ", "●●●", " ●●"];

fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Cyan),
        Role::Bot => Style::default().fg(Color::Green),
    }
}

/// The styled content of a bubble, before borders.
fn bubble_text(bubble: &Bubble, typing_frame: usize) -> Text<'static> {
    let style = role_style(bubble.role);
    match &bubble.body {
        BubbleBody::Typing => Text::styled(
            TYPING_FRAMES[typing_frame % TYPING_FRAMES.len()],
            style.add_modifier(Modifier::DIM),
        ),
        BubbleBody::Plain(text) => Text::styled(text.clone(), style),
        BubbleBody::Revealing(text) | BubbleBody::Formatted(text) => {
            markdown::format_reply(text, style)
        }
        BubbleBody::Error(text) => Text::styled(
            text.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    }
}

/// A single chat bubble. Transient: created each frame from a `Bubble` in the view.
///
/// User bubbles show their text verbatim; bot bubbles are markdown, including
/// while the reply is still being revealed. Error bubbles are red.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub bubble: &'a Bubble,
    /// Animation frame for the typing indicator.
    pub typing_frame: usize,
}

impl<'a> Message<'a> {
    pub fn new(bubble: &'a Bubble, typing_frame: usize) -> Self {
        Self {
            bubble,
            typing_frame,
        }
    }

    /// Rendered height at `width`, borders included.
    ///
    /// Uses `Paragraph::line_count` on the same paragraph `render` draws, so
    /// wrapped markdown is measured exactly.
    pub fn calculate_height(bubble: &Bubble, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let lines = paragraph(bubble_text(bubble, 0)).line_count(content_width) as u16;
        lines.max(1) + VERTICAL_OVERHEAD
    }
}

fn paragraph(text: Text<'static>) -> Paragraph<'static> {
    Paragraph::new(text).wrap(Wrap { trim: false })
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let (title, border_style) = match (&self.bubble.body, self.bubble.role) {
            (BubbleBody::Error(_), _) => ("error", Style::default().fg(Color::Red)),
            (_, Role::User) => ("you", role_style(Role::User).add_modifier(Modifier::DIM)),
            (_, Role::Bot) => ("grip", role_style(Role::Bot).add_modifier(Modifier::DIM)),
        };

        let block = Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);
        paragraph(bubble_text(self.bubble, self.typing_frame)).render(inner_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

/// Non-bubble thread items: the greeting and the locked notice.
#[derive(Clone, Copy)]
pub struct Notice<'a> {
    pub item: &'a ViewItem,
}

impl<'a> Notice<'a> {
    fn paragraph(item: &ViewItem) -> Paragraph<'static> {
        match item {
            ViewItem::Greeting(text) => Paragraph::new(Text::from(vec![
                Line::default(),
                Line::styled(
                    text.clone(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]))
            .alignment(Alignment::Center),
            _ => Paragraph::new(LOCKED_NOTICE)
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC))
                .block(
                    Block::bordered()
                        .title("locked")
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(Color::Yellow)),
                ),
        }
        .wrap(Wrap { trim: true })
    }

    pub fn calculate_height(item: &ViewItem, width: u16) -> u16 {
        (Self::paragraph(item).line_count(width) as u16).max(1)
    }
}

impl<'a> Widget for Notice<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        Self::paragraph(self.item).render(area, buf);
    }
}
