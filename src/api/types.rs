use serde::{Deserialize, Serialize};

/// Who authored a message.
///
/// The service tags replies with whatever role its model uses (`"assistant"`
/// for the reference server), so anything that isn't `"user"` is a bot.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(other)]
    Bot,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
        }
    }
}

/// One entry of the session list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    #[serde(default = "default_preview")]
    pub preview: String,
    #[serde(default)]
    pub is_locked: bool,
}

fn default_preview() -> String {
    "New Chat".to_string()
}

/// Stored messages of a session plus its lock flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct History {
    pub messages: Vec<Message>,
    pub locked: bool,
}

// ============================================================================
// Wire bodies
// ============================================================================

#[derive(Deserialize, Debug)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub is_locked: bool,
}

impl From<HistoryResponse> for History {
    fn from(body: HistoryResponse) -> Self {
        History {
            messages: body.history,
            locked: body.is_locked,
        }
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct NewChatResponse {
    pub session_id: String,
}

#[derive(Serialize, Debug)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

/// Body of every `/chat` answer. Success carries `reply`; failures carry
/// `error`, and a 400 may carry both.
#[derive(Deserialize, Debug, Default)]
pub(crate) struct ChatResponse {
    pub reply: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_role_maps_to_bot() {
        let msg: Message = serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::Bot);
        let msg: Message = serde_json::from_str(r#"{"role":"bot","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::Bot);
        let msg: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
    }

    #[test]
    fn session_defaults_fill_missing_fields() {
        let session: Session = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(session.preview, "New Chat");
        assert!(!session.is_locked);
    }

    #[test]
    fn history_body_converts() {
        let body: HistoryResponse = serde_json::from_str(
            r#"{"history":[{"role":"user","content":"q"},{"role":"assistant","content":"a"}],"is_locked":true}"#,
        )
        .unwrap();
        let history = History::from(body);
        assert_eq!(history.messages, vec![Message::user("q"), Message::bot("a")]);
        assert!(history.locked);
    }

    #[test]
    fn chat_request_serializes_contract_fields() {
        let body = serde_json::to_value(ChatRequest {
            message: "hi",
            session_id: "s1",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"message": "hi", "session_id": "s1"}));
    }
}
