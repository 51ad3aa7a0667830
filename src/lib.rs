//! Grip: a terminal client for a JSON chat service.
//!
//! - `api`: wire types and the `ChatService` seam over HTTP
//! - `core`: state, reducer, config and the persisted session pointer
//! - `driver`: runs the reducer's effects on tokio
//! - `tui`: ratatui front end

pub mod api;
pub mod core;
pub mod driver;
pub mod tui;

#[cfg(test)]
pub mod test_support;
