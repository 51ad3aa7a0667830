//! HTTP implementation of [`ChatService`] against the JSON chat service.
//!
//! ```text
//! GET    /get_sessions
//! GET    /get_session_history/{id}
//! POST   /new_chat
//! POST   /chat                 {message, session_id}
//! DELETE /delete_session/{id}
//! POST   /clear_all_sessions
//! ```

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Response, StatusCode, Url};

use super::service::{ApiError, ChatService};
use super::types::{ChatRequest, ChatResponse, History, HistoryResponse, NewChatResponse, Session};

/// Shown when a failed `/chat` answer has no `error` field of its own.
const GENERIC_FAILURE: &str = "Network response was not ok";

pub struct HttpChatService {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpChatService {
    /// Builds a client for the service at `base_url`. Every request is
    /// bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Network(format!("invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Network(format!("invalid base URL {base_url}")));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Joins path segments onto the base URL, percent-encoding each one so
    /// opaque session ids can't escape their segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

fn network(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

/// Maps 404 to `NotFound` and any other non-success status to `Server`,
/// preferring the body's `error` text as the message.
async fn expect_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ChatResponse>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("server responded with status: {}", status.as_u16()));
    warn!("Chat service error: {} - {}", status, message);
    Err(ApiError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["get_sessions"]))
            .send()
            .await
            .map_err(network)?;
        let sessions: Vec<Session> = Self::read_json(expect_success(response).await?).await?;
        debug!("Listed {} sessions", sessions.len());
        Ok(sessions)
    }

    async fn get_history(&self, session_id: &str) -> Result<History, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["get_session_history", session_id]))
            .send()
            .await
            .map_err(network)?;
        let body: HistoryResponse = Self::read_json(expect_success(response).await?).await?;
        let history = History::from(body);
        debug!(
            "History for {}: {} messages, locked={}",
            session_id,
            history.messages.len(),
            history.locked
        );
        Ok(history)
    }

    async fn create_session(&self) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["new_chat"]))
            .send()
            .await
            .map_err(network)?;
        let body: NewChatResponse = Self::read_json(expect_success(response).await?).await?;
        info!("Created session {}", body.session_id);
        Ok(body.session_id)
    }

    async fn send_message(&self, message: &str, session_id: &str) -> Result<String, ApiError> {
        info!(
            "POST /chat: session={}, message_len={}",
            session_id,
            message.len()
        );
        let response = self
            .client
            .post(self.endpoint(&["chat"]))
            .json(&ChatRequest {
                message,
                session_id,
            })
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        debug!("/chat response status: {}", status);
        let text = response.text().await.map_err(network)?;
        let body: ChatResponse = serde_json::from_str(&text).unwrap_or_default();

        match status {
            StatusCode::LOCKED => Err(ApiError::Locked(
                body.error.unwrap_or_else(|| "session is locked".to_string()),
            )),
            StatusCode::BAD_REQUEST => Err(ApiError::Rejected(
                body.reply.or(body.error).unwrap_or_default(),
            )),
            s if !s.is_success() => {
                warn!("/chat failed: {} - {}", s, text);
                Err(ApiError::Server {
                    status: s.as_u16(),
                    message: body.error.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
                })
            }
            _ => body
                .reply
                .ok_or_else(|| ApiError::Parse("response has no reply".to_string())),
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint(&["delete_session", session_id]))
            .send()
            .await
            .map_err(network)?;
        expect_success(response).await?;
        info!("Deleted session {}", session_id);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["clear_all_sessions"]))
            .send()
            .await
            .map_err(network)?;
        expect_success(response).await?;
        info!("Cleared all sessions");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(base: &str) -> HttpChatService {
        HttpChatService::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn endpoint_joins_segments() {
        let svc = service("http://127.0.0.1:5001");
        assert_eq!(
            svc.endpoint(&["get_session_history", "abc"]).as_str(),
            "http://127.0.0.1:5001/get_session_history/abc"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_and_trailing_slash() {
        let svc = service("http://host/api/");
        assert_eq!(svc.endpoint(&["chat"]).as_str(), "http://host/api/chat");
    }

    #[test]
    fn endpoint_escapes_session_ids() {
        let svc = service("http://host");
        assert_eq!(
            svc.endpoint(&["delete_session", "a/b c"]).as_str(),
            "http://host/delete_session/a%2Fb%20c"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpChatService::new("not a url", Duration::from_secs(1)),
            Err(ApiError::Network(_))
        ));
    }
}
