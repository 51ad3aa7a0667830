//! # Thread View
//!
//! The message thread as an ordered list of items. This is the render sink
//! the controller writes into; the TUI only reads it.
//!
//! ```text
//! View
//! ├── Greeting("Hello! I am Grip...")     // empty / session-less state
//! ├── Bubble { id, role: User, Plain }
//! ├── Bubble { id, role: Bot, Typing }    // placeholder while waiting
//! └── LockedNotice
//! ```
//!
//! Bubbles are addressed by [`BubbleId`]. Every lookup tolerates the bubble
//! being gone, which is what makes an orphaned reveal harmless after the view
//! has been cleared.

use crate::api::{Message, Role};

/// Stable handle to a bubble, unique for the lifetime of the `View`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BubbleId(u64);

impl BubbleId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BubbleBody {
    /// Animated "typing" dots while the reply is pending.
    Typing,
    /// Verbatim text (user messages).
    Plain(String),
    /// Prefix of a reply still being revealed. Formatted, but may contain
    /// half-open markup.
    Revealing(String),
    /// Complete reply, formatted once more after the last character.
    Formatted(String),
    /// Inline failure in place of a reply.
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub id: BubbleId,
    pub role: Role,
    pub body: BubbleBody,
}

impl Bubble {
    /// The text currently visible in the bubble (empty for the typing indicator).
    pub fn text(&self) -> &str {
        match &self.body {
            BubbleBody::Typing => "",
            BubbleBody::Plain(t)
            | BubbleBody::Revealing(t)
            | BubbleBody::Formatted(t)
            | BubbleBody::Error(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewItem {
    Greeting(String),
    Bubble(Bubble),
    LockedNotice,
}

#[derive(Debug, Default)]
pub struct View {
    pub items: Vec<ViewItem>,
    next_id: u64,
    scroll_requested: bool,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.scroll_requested = true;
    }

    /// Asks the renderer to scroll to the newest item.
    pub fn request_scroll(&mut self) {
        self.touch();
    }

    /// Returns and clears the pending "scroll to bottom" request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// Replaces everything with the greeting.
    pub fn show_greeting(&mut self, greeting: &str) {
        self.items.clear();
        self.items.push(ViewItem::Greeting(greeting.to_string()));
        self.touch();
    }

    pub fn remove_greeting(&mut self) {
        self.items.retain(|item| !matches!(item, ViewItem::Greeting(_)));
    }

    pub fn has_greeting(&self) -> bool {
        self.items.iter().any(|item| matches!(item, ViewItem::Greeting(_)))
    }

    pub fn has_user_bubble(&self) -> bool {
        self.bubbles().any(|b| b.role == Role::User)
    }

    pub fn has_locked_notice(&self) -> bool {
        self.items.iter().any(|item| matches!(item, ViewItem::LockedNotice))
    }

    fn push_bubble(&mut self, role: Role, body: BubbleBody) -> BubbleId {
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        self.items.push(ViewItem::Bubble(Bubble { id, role, body }));
        self.touch();
        id
    }

    /// Appends a stored or just-typed message. Bot text is shown fully formatted.
    pub fn push_message(&mut self, message: &Message) -> BubbleId {
        let body = match message.role {
            Role::User => BubbleBody::Plain(message.content.clone()),
            Role::Bot => BubbleBody::Formatted(message.content.clone()),
        };
        self.push_bubble(message.role, body)
    }

    /// Appends a bot bubble showing the typing indicator.
    pub fn push_typing(&mut self) -> BubbleId {
        self.push_bubble(Role::Bot, BubbleBody::Typing)
    }

    /// Appends a standalone error bubble.
    pub fn push_error(&mut self, message: impl Into<String>) -> BubbleId {
        self.push_bubble(Role::Bot, BubbleBody::Error(message.into()))
    }

    pub fn push_locked_notice(&mut self) {
        self.items.push(ViewItem::LockedNotice);
        self.touch();
    }

    pub fn bubbles(&self) -> impl Iterator<Item = &Bubble> {
        self.items.iter().filter_map(|item| match item {
            ViewItem::Bubble(b) => Some(b),
            _ => None,
        })
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles().find(|b| b.id == id)
    }

    fn bubble_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.items.iter_mut().find_map(|item| match item {
            ViewItem::Bubble(b) if b.id == id => Some(b),
            _ => None,
        })
    }

    /// Replaces a bubble's body. Returns `false` if the bubble is gone.
    pub fn set_body(&mut self, id: BubbleId, body: BubbleBody) -> bool {
        match self.bubble_mut(id) {
            Some(bubble) => {
                bubble.body = body;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Drops a bubble. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: BubbleId) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| !matches!(item, ViewItem::Bubble(b) if b.id == id));
        before != self.items.len()
    }
}
