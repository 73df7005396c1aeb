//! SSE binding over Rocket's local client

use std::sync::Arc;

use mcpfs_domain::AllowedDirectories;
use mcpfs_server::session::SessionTable;
use mcpfs_server::transport::BindingSettings;
use mcpfs_server::transport::sse::{SseState, SseTransport, sse_rocket};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::test_utils::{data_json, read_line_containing};

type Sessions = Arc<SessionTable<SseTransport>>;

async fn create_test_client() -> (Client, Sessions) {
    let state = SseState::new(
        Arc::new(AllowedDirectories::empty()),
        BindingSettings::default(),
    );
    let sessions = Arc::clone(&state.sessions);
    let client = Client::tracked(sse_rocket(state))
        .await
        .expect("valid rocket instance");
    (client, sessions)
}

fn session_id_from(line: &str) -> String {
    line.split("sessionId=")
        .nth(1)
        .expect("endpoint carries sessionId")
        .trim()
        .to_string()
}

#[tokio::test]
async fn test_first_event_announces_message_endpoint() {
    let (client, sessions) = create_test_client().await;

    let response = client.get("/sse").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::EventStream));

    let mut lines = BufReader::new(Box::pin(response)).lines();
    let endpoint = read_line_containing(&mut lines, "/message?sessionId=").await;
    let session_id = session_id_from(&endpoint);

    assert_eq!(sessions.len(), 1);
    assert!(sessions.contains(&session_id));
}

#[tokio::test]
async fn test_posted_request_is_answered_on_stream() {
    let (client, _sessions) = create_test_client().await;
    let response = client.get("/sse").dispatch().await;
    let mut lines = BufReader::new(Box::pin(response)).lines();
    let session_id = session_id_from(&read_line_containing(&mut lines, "sessionId=").await);

    let accepted = client
        .post(format!("/message?sessionId={}", session_id))
        .header(ContentType::JSON)
        .body(json!({ "jsonrpc": "2.0", "id": 11, "method": "ping" }).to_string())
        .dispatch()
        .await;
    assert_eq!(accepted.status(), Status::Accepted);

    let message = data_json(&read_line_containing(&mut lines, "\"result\"").await);
    assert_eq!(message["id"], 11);
    assert_eq!(message["result"], json!({}));
}

#[tokio::test]
async fn test_post_to_unknown_session_is_not_found() {
    let (client, _sessions) = create_test_client().await;

    let response = client
        .post("/message?sessionId=missing")
        .header(ContentType::JSON)
        .body(json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
    let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
    assert_eq!(body["error"]["code"], -32001);
}

#[tokio::test]
async fn test_post_without_session_id_is_bad_request() {
    let (client, _sessions) = create_test_client().await;

    let response = client
        .post("/message")
        .header(ContentType::JSON)
        .body(json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_get_with_session_id_is_rejected() {
    let (client, sessions) = create_test_client().await;

    let response = client.get("/sse?sessionId=abc").dispatch().await;

    assert_eq!(response.status(), Status::BadRequest);
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_close_all_ends_streams() {
    let (client, sessions) = create_test_client().await;
    let response = client.get("/sse").dispatch().await;
    let mut lines = BufReader::new(Box::pin(response)).lines();
    read_line_containing(&mut lines, "sessionId=").await;

    let report = sessions.close_all().await;

    assert_eq!(report.closed, 1);
    assert!(sessions.is_empty());
    let rest = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while let Ok(Some(_)) = lines.next_line().await {}
    })
    .await;
    assert!(rest.is_ok(), "stream should end after close");
}

#[tokio::test]
async fn test_preflight_allows_get_and_post() {
    let (client, _sessions) = create_test_client().await;

    let response = client.options("/message").dispatch().await;

    assert_eq!(response.status(), Status::NoContent);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Methods"),
        Some("GET, POST")
    );
}
