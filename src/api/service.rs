use std::fmt;

use async_trait::async_trait;

use super::types::{History, Session};

/// Errors returned by the chat service.
///
/// `NotFound`, `Locked` and `Rejected` are expected business outcomes the
/// conversation controller recovers from. The remaining variants are hard
/// failures: shown inline, never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The session no longer exists (HTTP 404).
    NotFound,
    /// The session refuses new messages (HTTP 423).
    Locked(String),
    /// The message was rejected but the service sent a displayable reply (HTTP 400).
    Rejected(String),
    /// Any other non-success status.
    Server { status: u16, message: String },
    /// Connection refused, DNS, timeout.
    Network(String),
    /// The body didn't match the contract.
    Parse(String),
}

impl ApiError {
    /// True for the transport/server family that surfaces as an error bubble.
    pub fn is_hard_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Server { .. } | ApiError::Network(_) | ApiError::Parse(_)
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "session not found"),
            ApiError::Locked(msg) => write!(f, "session locked: {msg}"),
            ApiError::Rejected(reply) => write!(f, "message rejected: {reply}"),
            ApiError::Server { message, .. } => write!(f, "{message}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The remote session store and chat endpoint.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// All sessions, in the order the service lists them.
    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError>;

    /// Stored messages of one session. `ApiError::NotFound` if it's gone.
    async fn get_history(&self, session_id: &str) -> Result<History, ApiError>;

    /// Allocates a new empty session and returns its id.
    async fn create_session(&self) -> Result<String, ApiError>;

    /// Sends one user message and returns the reply text.
    async fn send_message(&self, message: &str, session_id: &str) -> Result<String, ApiError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError>;

    async fn clear_all(&self) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_service_message() {
        let err = ApiError::Server {
            status: 503,
            message: "Failed to communicate with the language model".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to communicate with the language model");
        assert!(err.is_hard_failure());
    }

    #[test]
    fn business_outcomes_are_not_hard_failures() {
        assert!(!ApiError::NotFound.is_hard_failure());
        assert!(!ApiError::Locked("x".into()).is_hard_failure());
        assert!(!ApiError::Rejected("x".into()).is_hard_failure());
    }
}
