//! Streamable HTTP binding over Rocket's local client

use std::sync::Arc;

use mcpfs_domain::AllowedDirectories;
use mcpfs_server::session::SessionTable;
use mcpfs_server::transport::BindingSettings;
use mcpfs_server::transport::streamable_http::{
    StreamableHttpState, StreamableHttpTransport, streamable_http_rocket,
};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::test_utils::{
    allowed, create_fixture_tree, data_json, initialize_request, read_line_containing,
};

type Sessions = Arc<SessionTable<StreamableHttpTransport>>;

async fn create_test_client(directories: Arc<AllowedDirectories>) -> (Client, Sessions) {
    let state = StreamableHttpState::new(directories, BindingSettings::default());
    let sessions = Arc::clone(&state.sessions);
    let client = Client::tracked(streamable_http_rocket(state))
        .await
        .expect("valid rocket instance");
    (client, sessions)
}

async fn post<'c>(client: &'c Client, session_id: Option<&str>, body: &Value) -> LocalResponse<'c> {
    let mut request = client
        .post("/mcp")
        .header(ContentType::JSON)
        .body(body.to_string());
    if let Some(id) = session_id {
        request = request.header(Header::new("mcp-session-id", id.to_string()));
    }
    request.dispatch().await
}

async fn json_body(response: LocalResponse<'_>) -> Value {
    let body = response.into_string().await.expect("response body");
    serde_json::from_str(&body).expect("JSON body")
}

/// Initialize a session and return its id
async fn initialize(client: &Client) -> String {
    let response = post(client, None, &initialize_request(1)).await;
    assert_eq!(response.status(), Status::Ok);
    response
        .headers()
        .get_one("mcp-session-id")
        .expect("session id header")
        .to_string()
}

#[tokio::test]
async fn test_initialize_registers_exactly_one_session() {
    let (client, sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;

    let response = post(&client, None, &initialize_request(1)).await;

    assert_eq!(response.status(), Status::Ok);
    let session_id = response
        .headers()
        .get_one("mcp-session-id")
        .unwrap()
        .to_string();
    assert_eq!(
        response.headers().get_one("mcp-protocol-version"),
        Some("2025-03-26")
    );
    let body = json_body(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["serverInfo"]["name"], "mcpfs");
    assert_eq!(sessions.len(), 1);
    assert!(sessions.contains(&session_id));
}

#[tokio::test]
async fn test_follow_up_request_reuses_session() {
    let (client, sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;
    let session_id = initialize(&client).await;

    let response = post(
        &client,
        Some(&session_id),
        &json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
    )
    .await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("mcp-session-id"),
        Some(session_id.as_str())
    );
    let body = json_body(response).await;
    assert!(body["result"]["tools"].is_array());
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_notification_is_accepted() {
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;
    let session_id = initialize(&client).await;

    let response = post(
        &client,
        Some(&session_id),
        &json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;

    assert_eq!(response.status(), Status::Accepted);
}

#[tokio::test]
async fn test_first_request_must_be_initialize() {
    let (client, sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;

    let response = post(
        &client,
        None,
        &json!({ "jsonrpc": "2.0", "id": 9, "method": "tools/list" }),
    )
    .await;

    assert_eq!(response.status(), Status::BadRequest);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], -32000);
    assert_eq!(body["error"]["message"], "Bad Request: Server not initialized");
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_unknown_session_is_rejected_with_echoed_id() {
    let (client, sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;

    let response = post(
        &client,
        Some("no-such-session"),
        &json!({ "jsonrpc": "2.0", "id": 5, "method": "ping" }),
    )
    .await;

    assert_eq!(response.status(), Status::BadRequest);
    let body = json_body(response).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["error"]["code"], -32000);
    assert_eq!(
        body["error"]["message"],
        "Bad Request: No valid session ID provided"
    );
    assert_eq!(body["id"], 5);
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_unknown_session_wins_over_unreadable_body() {
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;

    for body in ["{not json", ""] {
        let response = client
            .post("/mcp")
            .header(ContentType::JSON)
            .header(Header::new("mcp-session-id", "no-such-session"))
            .body(body)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest, "body {:?}", body);
        let reply = json_body(response).await;
        assert_eq!(reply["error"]["code"], -32000);
        assert_eq!(reply["id"], Value::Null);
    }
}

#[tokio::test]
async fn test_batch_with_initialize_is_rejected() {
    let (client, sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;
    let batch = json!([
        initialize_request(1),
        { "jsonrpc": "2.0", "id": 2, "method": "ping" }
    ]);

    let response = post(&client, None, &batch).await;

    assert_eq!(response.status(), Status::BadRequest);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], -32600);
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;

    let response = client
        .post("/mcp")
        .header(ContentType::JSON)
        .body("{not json")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_get_without_session_is_rejected() {
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;

    let response = client.get("/mcp").dispatch().await;

    assert_eq!(response.status(), Status::BadRequest);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], -32000);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_delete_terminates_session() {
    let (client, sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;
    let session_id = initialize(&client).await;

    let response = client
        .delete("/mcp")
        .header(Header::new("mcp-session-id", session_id.clone()))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert!(sessions.is_empty());

    let after = post(
        &client,
        Some(&session_id),
        &json!({ "jsonrpc": "2.0", "id": 3, "method": "ping" }),
    )
    .await;
    assert_eq!(after.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_delete_leaves_other_sessions_alone() {
    let (client, sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;
    let first = initialize(&client).await;
    let second = initialize(&client).await;

    client
        .delete("/mcp")
        .header(Header::new("mcp-session-id", first.clone()))
        .dispatch()
        .await;

    assert!(!sessions.contains(&first));
    assert!(sessions.contains(&second));
}

#[tokio::test]
async fn test_second_standalone_stream_conflicts() {
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;
    let session_id = initialize(&client).await;

    let first = client
        .get("/mcp")
        .header(Header::new("mcp-session-id", session_id.clone()))
        .dispatch()
        .await;
    assert_eq!(first.status(), Status::Ok);
    assert_eq!(first.content_type(), Some(ContentType::EventStream));

    let second = client
        .get("/mcp")
        .header(Header::new("mcp-session-id", session_id.clone()))
        .dispatch()
        .await;
    assert_eq!(second.status(), Status::Conflict);
    let body = json_body(second).await;
    assert_eq!(
        body["error"]["message"],
        "Conflict: Only one SSE stream is allowed per session"
    );
    drop(first);
}

#[tokio::test]
async fn test_unknown_last_event_id_is_rejected() {
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;
    let session_id = initialize(&client).await;

    let response = client
        .get("/mcp")
        .header(Header::new("mcp-session-id", session_id))
        .header(Header::new("last-event-id", "never-issued_1"))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_event_stream_response_when_accepted() {
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;

    let response = client
        .post("/mcp")
        .header(ContentType::JSON)
        .header(Header::new("Accept", "application/json, text/event-stream"))
        .body(initialize_request(1).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::EventStream));
    assert!(response.headers().get_one("mcp-session-id").is_some());
    let body = response.into_string().await.unwrap();
    assert!(body.contains("event: message") || body.contains("event:message"));
    assert!(body.contains("serverInfo"));
}

#[tokio::test]
async fn test_preflight_and_cors_headers() {
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;

    let response = client.options("/mcp").dispatch().await;

    assert_eq!(response.status(), Status::NoContent);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Methods"),
        Some("GET, POST, DELETE")
    );
    let exposed = response
        .headers()
        .get_one("Access-Control-Expose-Headers")
        .unwrap();
    assert!(exposed.contains("mcp-session-id"));
}

#[tokio::test]
async fn test_roots_requested_over_standalone_stream() {
    let (_temp, root) = create_fixture_tree();
    let (client, _sessions) = create_test_client(Arc::new(AllowedDirectories::empty())).await;
    let init = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-06-18",
            "capabilities": { "roots": { "listChanged": true } },
            "clientInfo": { "name": "roots-client", "version": "1.0.0" }
        }
    });
    let response = post(&client, None, &init).await;
    let session_id = response
        .headers()
        .get_one("mcp-session-id")
        .unwrap()
        .to_string();

    let stream = client
        .get("/mcp")
        .header(Header::new("mcp-session-id", session_id.clone()))
        .dispatch()
        .await;
    let mut lines = BufReader::new(Box::pin(stream)).lines();

    let accepted = post(
        &client,
        Some(&session_id),
        &json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;
    assert_eq!(accepted.status(), Status::Accepted);

    let request = data_json(&read_line_containing(&mut lines, "roots/list").await);
    let answer = json!({
        "jsonrpc": "2.0",
        "id": request["id"],
        "result": { "roots": [ { "uri": format!("file://{}", root.display()) } ] }
    });
    let accepted = post(&client, Some(&session_id), &answer).await;
    assert_eq!(accepted.status(), Status::Accepted);

    let listing = post(
        &client,
        Some(&session_id),
        &json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": { "name": "list_allowed_directories", "arguments": {} }
        }),
    )
    .await;
    let body = json_body(listing).await;
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains(&root.display().to_string()));
}

#[tokio::test]
async fn test_tool_call_against_startup_directories() {
    let (_temp, root) = create_fixture_tree();
    let (client, _sessions) = create_test_client(allowed(&root)).await;
    let session_id = initialize(&client).await;

    let response = post(
        &client,
        Some(&session_id),
        &json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {
                "name": "read_text_file",
                "arguments": { "path": root.join("notes.txt").display().to_string(), "head": 1 }
            }
        }),
    )
    .await;

    let body = json_body(response).await;
    assert_eq!(body["result"]["content"][0]["text"], "one");
    assert_eq!(body["result"]["isError"], false);
}
