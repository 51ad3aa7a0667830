use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, Sidebar, TitleBar};

/// Lays out one frame:
///
/// ```text
/// ┌ title bar ─────────────────────────────┐
/// │ sidebar │ message list                 │
/// │         ├──────────────────────────────┤
/// │         │ input box                    │
/// └─────────┴──────────────────────────────┘
/// ```
///
/// When the sidebar is focused on a narrow terminal it takes the whole body.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, typing_frame: usize) {
    use Constraint::{Length, Min};

    let [title_area, body_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    let sidebar_width = tui.sidebar.width(body_area.width);
    let [sidebar_area, main_area] =
        Layout::horizontal([Length(sidebar_width), Min(0)]).areas(body_area);

    if sidebar_width > 0 {
        Sidebar::new(
            &mut tui.sidebar,
            &app.sessions,
            app.client.current_session_id.as_deref(),
        )
        .render(frame, sidebar_area);
    }

    tui.sync_input(app);

    if main_area.width > 0 {
        let input_height = tui.input_box.calculate_height(main_area.width);
        let [thread_area, input_area] =
            Layout::vertical([Min(0), Length(input_height)]).areas(main_area);

        let scroll_requested = tui.scroll_requested;
        MessageList::new(&mut tui.message_list, &app.view, scroll_requested, typing_frame)
            .render(frame, thread_area);
        tui.scroll_requested = false;

        tui.input_box.render(frame, input_area);
    }

    TitleBar::new(
        tui.server.clone(),
        app.status_message.clone(),
        tui.message_list.has_unseen_content,
    )
    .render(frame, title_area);
}
