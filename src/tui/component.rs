use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Something that draws itself into a region of the frame.
///
/// Props are plain struct fields set by the parent before rendering.
/// Stateful components borrow their persistent state (kept in `TuiState`)
/// and may update it while rendering: the message list records its layout
/// cache and scroll position, the sidebar its list selection.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that turns raw `TuiEvent`s into its own higher-level events
/// (`InputEvent::Submit`, for instance) for the event loop to act on.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
