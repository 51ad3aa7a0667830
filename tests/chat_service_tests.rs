use std::time::Duration;

use grip::api::{ApiError, ChatService, HttpChatService, Message};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn service(server: &MockServer) -> HttpChatService {
    HttpChatService::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_list_sessions_parses_list() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/get_sessions",
        ResponseTemplate::new(200).set_body_json(json!([
            {"id": "s2", "preview": "Newest", "is_locked": false},
            {"id": "s1", "preview": "Older", "is_locked": true}
        ])),
    )
    .await;

    let sessions = service(&server).list_sessions().await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, "s2");
    assert_eq!(sessions[0].preview, "Newest");
    assert!(sessions[1].is_locked);
}

#[tokio::test]
async fn test_list_sessions_server_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/get_sessions",
        ResponseTemplate::new(500).set_body_string("boom"),
    )
    .await;

    let err = service(&server).list_sessions().await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert!(err.is_hard_failure());
}

#[tokio::test]
async fn test_list_sessions_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/get_sessions",
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;

    let err = service(&server).list_sessions().await.unwrap_err();

    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_get_history_with_lock_flag() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/get_session_history/s1",
        ResponseTemplate::new(200).set_body_json(json!({
            "history": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ],
            "is_locked": true
        })),
    )
    .await;

    let history = service(&server).get_history("s1").await.unwrap();

    assert_eq!(
        history.messages,
        vec![Message::user("hi"), Message::bot("hello")]
    );
    assert!(history.locked);
}

#[tokio::test]
async fn test_get_history_missing_session_is_not_found() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/get_session_history/gone",
        ResponseTemplate::new(404).set_body_json(json!({"error": "Session not found"})),
    )
    .await;

    let err = service(&server).get_history("gone").await.unwrap_err();

    assert_eq!(err, ApiError::NotFound);
    assert!(!err.is_hard_failure());
}

#[tokio::test]
async fn test_session_id_is_escaped_in_path() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/get_session_history/a%2Fb%20c",
        ResponseTemplate::new(200).set_body_json(json!({"history": []})),
    )
    .await;

    let history = service(&server).get_history("a/b c").await.unwrap();

    assert!(history.messages.is_empty());
    assert!(!history.locked);
}

#[tokio::test]
async fn test_create_session_returns_id() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/new_chat",
        ResponseTemplate::new(200).set_body_json(json!({"session_id": "fresh"})),
    )
    .await;

    let id = service(&server).create_session().await.unwrap();

    assert_eq!(id, "fresh");
}

#[tokio::test]
async fn test_delete_session_success_and_missing() {
    let server = MockServer::start().await;
    mount(
        &server,
        "DELETE",
        "/delete_session/s1",
        ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})),
    )
    .await;
    mount(
        &server,
        "DELETE",
        "/delete_session/s2",
        ResponseTemplate::new(404),
    )
    .await;

    let svc = service(&server);
    assert_eq!(svc.delete_session("s1").await, Ok(()));
    assert_eq!(svc.delete_session("s2").await, Err(ApiError::NotFound));
}

#[tokio::test]
async fn test_clear_all_sessions() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/clear_all_sessions",
        ResponseTemplate::new(200).set_body_json(json!({"message": "cleared"})),
    )
    .await;

    assert_eq!(service(&server).clear_all().await, Ok(()));
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_send_message_posts_contract_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({"message": "Hello", "session_id": "s1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "Hi there"})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = service(&server).send_message("Hello", "s1").await.unwrap();

    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_send_message_locked() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/chat",
        ResponseTemplate::new(423).set_body_json(json!({"error": "Session is locked"})),
    )
    .await;

    let err = service(&server).send_message("Hello", "s1").await.unwrap_err();

    assert_eq!(err, ApiError::Locked("Session is locked".into()));
}

#[tokio::test]
async fn test_send_message_rejected_carries_reply() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/chat",
        ResponseTemplate::new(400)
            .set_body_json(json!({"reply": "I can't help with that.", "error": "flagged"})),
    )
    .await;

    let err = service(&server).send_message("Hello", "s1").await.unwrap_err();

    assert_eq!(err, ApiError::Rejected("I can't help with that.".into()));
}

#[tokio::test]
async fn test_send_message_server_error_prefers_body_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/chat",
        ResponseTemplate::new(503).set_body_json(json!({"error": "Model overloaded"})),
    )
    .await;

    let err = service(&server).send_message("Hello", "s1").await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Server {
            status: 503,
            message: "Model overloaded".into()
        }
    );
    assert_eq!(err.to_string(), "Model overloaded");
}

#[tokio::test]
async fn test_send_message_server_error_without_body() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/chat",
        ResponseTemplate::new(500).set_body_string("<html>oops</html>"),
    )
    .await;

    let err = service(&server).send_message("Hello", "s1").await.unwrap_err();

    assert_eq!(err.to_string(), "Network response was not ok");
}

#[tokio::test]
async fn test_send_message_success_without_reply_is_parse_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/chat",
        ResponseTemplate::new(200).set_body_json(json!({})),
    )
    .await;

    let err = service(&server).send_message("Hello", "s1").await.unwrap_err();

    assert!(matches!(err, ApiError::Parse(_)));
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_slow_server_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let svc = HttpChatService::new(&server.uri(), Duration::from_millis(100)).unwrap();
    let err = svc.list_sessions().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Grab a free port, then close it so nothing listens there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let svc = HttpChatService::new(&uri, Duration::from_secs(2)).unwrap();
    let err = svc.create_session().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
}
