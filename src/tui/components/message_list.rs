//! # MessageList Component
//!
//! Scrollable view of the message thread.
//!
//! ## Responsibilities
//!
//! - Display the greeting, bubbles and the locked notice
//! - Keep the view pinned to the newest item unless the user scrolled away
//! - Cache item heights so long histories don't re-measure every frame
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `View` (props).

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::view::{BubbleBody, View, ViewItem};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{Message, Notice};
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Content continues below the viewport
    pub has_unseen_content: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::default(),
            stick_to_bottom: true,
            has_unseen_content: false,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user is back at the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        if self.scroll_state.offset().y >= self.max_offset() {
            self.stick_to_bottom = true;
            self.clamp_scroll();
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.scroll_state.scroll_to_bottom();
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => self.scroll_to_bottom(),
            _ => {}
        }
        None
    }
}

/// Identity of a measured item. Bubble ids are never reused, so a matching
/// key with the same visible length means the cached height is still right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKey {
    Greeting(usize),
    Bubble { id: u64, kind: u8, len: usize },
    LockedNotice,
}

fn item_key(item: &ViewItem) -> ItemKey {
    match item {
        ViewItem::Greeting(text) => ItemKey::Greeting(text.len()),
        ViewItem::LockedNotice => ItemKey::LockedNotice,
        ViewItem::Bubble(bubble) => ItemKey::Bubble {
            id: bubble.id.raw(),
            kind: match bubble.body {
                BubbleBody::Typing => 0,
                BubbleBody::Plain(_) => 1,
                BubbleBody::Revealing(_) => 2,
                BubbleBody::Formatted(_) => 3,
                BubbleBody::Error(_) => 4,
            },
            len: bubble.text().len(),
        },
    }
}

fn measure(item: &ViewItem, width: u16) -> u16 {
    match item {
        ViewItem::Bubble(bubble) => Message::calculate_height(bubble, width),
        other => Notice::calculate_height(other, width),
    }
}

/// Cached layout measurements
#[derive(Default)]
pub struct LayoutCache {
    keys: Vec<ItemKey>,
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    content_width: u16,
}

impl LayoutCache {
    /// Re-measures every item whose key changed since the last frame.
    /// A width change invalidates everything.
    pub fn update(&mut self, items: &[ViewItem], content_width: u16) {
        if self.content_width != content_width {
            self.keys.clear();
            self.heights.clear();
            self.content_width = content_width;
        }
        self.keys.truncate(items.len());
        self.heights.truncate(items.len());

        for (i, item) in items.iter().enumerate() {
            let key = item_key(item);
            if self.keys.get(i) == Some(&key) {
                continue;
            }
            let height = measure(item, content_width);
            if i < self.keys.len() {
                self.keys[i] = key;
                self.heights[i] = height;
            } else {
                self.keys.push(key);
                self.heights.push(height);
            }
        }

        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Items overlapping the viewport, plus half a screen either side.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

/// Scrollable thread view.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub view: &'a View,
    /// Jump to the newest item this frame.
    pub scroll_requested: bool,
    pub typing_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        view: &'a View,
        scroll_requested: bool,
        typing_frame: usize,
    ) -> Self {
        Self {
            state,
            view,
            scroll_requested,
            typing_frame,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let items = &self.view.items;

        self.state.layout.update(items, content_width);
        let total_height = self.state.layout.total_height();

        self.state.viewport_height = area.height;
        if self.scroll_requested {
            self.state.stick_to_bottom = true;
        }
        if self.state.stick_to_bottom {
            self.state.scroll_state.set_offset(Position {
                x: 0,
                y: self.state.max_offset(),
            });
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset = match visible.start {
            0 => 0,
            start => self.state.layout.prefix_heights[start - 1],
        };
        for i in visible {
            let height = self.state.layout.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            match &items[i] {
                ViewItem::Bubble(bubble) => {
                    scroll_view.render_widget(Message::new(bubble, self.typing_frame), rect)
                }
                item => scroll_view.render_widget(Notice { item }, rect),
            }
            y_offset = y_offset.saturating_add(height);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        let offset = self.state.scroll_state.offset().y;
        self.state.has_unseen_content =
            total_height > area.height && offset < total_height.saturating_sub(area.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Message as ChatMessage;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(view: &View, state: &mut MessageListState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| MessageList::new(state, view, false, 0).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn cache_reuses_unchanged_items() {
        let mut view = View::new();
        view.push_message(&ChatMessage::user("hello"));
        let bot = view.push_typing();

        let mut cache = LayoutCache::default();
        cache.update(&view.items, 40);
        assert_eq!(cache.heights, vec![3, 3]);

        view.set_body(
            bot,
            BubbleBody::Formatted("a reply long enough to wrap at this narrow width".into()),
        );
        cache.update(&view.items, 40);
        assert_eq!(cache.heights[0], 3);
        assert!(cache.heights[1] > 3);
        assert_eq!(cache.total_height(), cache.heights.iter().sum::<u16>());
    }

    #[test]
    fn cache_follows_cleared_view() {
        let mut view = View::new();
        view.push_message(&ChatMessage::user("one"));
        view.push_message(&ChatMessage::bot("two"));
        let mut cache = LayoutCache::default();
        cache.update(&view.items, 40);

        view.show_greeting("Hello!");
        cache.update(&view.items, 40);
        assert_eq!(cache.heights.len(), 1);
    }

    #[test]
    fn width_change_remeasures() {
        let mut view = View::new();
        view.push_message(&ChatMessage::user("abcdefghij"));
        let mut cache = LayoutCache::default();
        cache.update(&view.items, 80);
        assert_eq!(cache.heights, vec![3]);
        cache.update(&view.items, 9);
        assert_eq!(cache.heights, vec![4]);
    }

    #[test]
    fn visible_range_covers_viewport() {
        let mut cache = LayoutCache::default();
        cache.heights = vec![3; 10];
        cache.prefix_heights = (1..=10).map(|i| i * 3).collect();
        let range = cache.visible_range(9, 6);
        assert!(range.contains(&3));
        assert!(range.contains(&4));
        assert!(range.end <= 10);
    }

    #[test]
    fn renders_greeting_and_bubbles() {
        let mut view = View::new();
        view.show_greeting("Hello! I am Grip.");
        let mut state = MessageListState::new();
        let text = render(&view, &mut state, 40, 10);
        assert!(text.contains("Hello! I am Grip."));

        view.remove_greeting();
        view.push_message(&ChatMessage::user("question"));
        view.push_message(&ChatMessage::bot("answer"));
        view.push_locked_notice();
        let text = render(&view, &mut state, 60, 20);
        assert!(text.contains("question"));
        assert!(text.contains("answer"));
        assert!(text.contains("This chat is locked"));
    }

    #[test]
    fn scrolling_up_unpins_and_end_repins() {
        let mut state = MessageListState::new();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        state.handle_event(&TuiEvent::ScrollToBottom);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn long_thread_pinned_to_bottom_shows_newest() {
        let mut view = View::new();
        for i in 0..20 {
            view.push_message(&ChatMessage::user(format!("message {i}")));
        }
        let mut state = MessageListState::new();
        let text = render(&view, &mut state, 40, 9);
        assert!(text.contains("message 19"));
        assert!(!text.contains("message 0 "));
        assert!(!state.has_unseen_content);
    }
}
