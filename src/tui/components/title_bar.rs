//! # TitleBar Component
//!
//! Top status bar. Stateless: every field is a prop copied in each frame.
//!
//! The text degrades in priority order so the most important part survives
//! narrow terminals:
//!
//! 1. **Unseen content**: `"Grip (http://host) | Loading... | ↓ New"`
//! 2. **Status message**: `"Grip (http://host) | Loading..."`
//! 3. **Default**: `"Grip (http://host)"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    /// Chat server the client talks to
    pub server: String,
    /// Status message (e.g., "Thinking...", "Session locked")
    pub status_message: String,
    /// Whether there's content below the current scroll position
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(server: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            server,
            status_message,
            has_unseen_content,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("Grip", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" ({})", self.server),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status_message)));
        }
        if self.has_unseen_content {
            spans.push(Span::styled(" | ↓ New", Style::default().fg(Color::Yellow)));
        }
        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(title_bar: &mut TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let mut title_bar = TitleBar::new(
            "http://127.0.0.1:5001".into(),
            "Thinking...".into(),
            true,
        );
        let text = render(&mut title_bar);
        assert!(text.contains("Grip"));
        assert!(text.contains("http://127.0.0.1:5001"));
        assert!(text.contains("Thinking..."));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("http://chat.local".into(), String::new(), false);
        let text = render(&mut title_bar);
        assert!(text.contains("Grip"));
        assert!(!text.contains('|'));
        assert!(!text.contains("↓ New"));
    }
}
