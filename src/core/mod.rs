//! # Core Application Logic
//!
//! This module contains Grip's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • View (render sink)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!          ┌────────────┐                ┌────────────┐
//!          │   driver   │ ── Action ──▶  │    TUI     │
//!          │ (HTTP, fs, │                │ (ratatui)  │
//!          │  reveal)   │                │            │
//!          └────────────┘                └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and `update()`, the conversation controller
//! - [`view`]: The message thread the controller renders into
//! - [`reveal`]: Paced character-by-character reveal of replies
//! - [`pointer`]: The persisted current-session pointer
//! - [`config`]: Layered settings

pub mod action;
pub mod config;
pub mod pointer;
pub mod reveal;
pub mod state;
pub mod view;
