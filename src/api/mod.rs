//! # Chat Service API
//!
//! Typed access to the remote session store and chat endpoint. The
//! [`ChatService`] trait is the seam the rest of the client talks to;
//! [`HttpChatService`] is the real implementation.

pub mod client;
pub mod service;
pub mod types;

pub use client::HttpChatService;
pub use service::{ApiError, ChatService};
pub use types::{History, Message, Role, Session};
