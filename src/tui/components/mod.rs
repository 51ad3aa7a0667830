//! # TUI Components
//!
//! ## Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: server, status message and the "↓ New" indicator
//! - `Message` / `Notice`: a single thread item
//!
//! ## Stateful Components (Event-Driven)
//!
//! - `InputBox`: multi-line editor, emits `Submit`
//! - `MessageList`: scrollable thread with layout caching
//! - `Sidebar`: session list with switch, delete and clear-all commands
//!
//! Stateful components keep their persistent state in `TuiState` and are
//! wrapped by a transient struct each frame that borrows it.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── input_box.rs
//! └── sidebar.rs
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
pub mod sidebar;
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
