//! Tests for JSON-RPC dispatch and the filesystem tools

use std::sync::{Arc, Mutex};

use mcpfs_domain::AllowedDirectories;
use mcpfs_server::FilesystemServer;
use mcpfs_server::constants::{
    JSONRPC_INVALID_PARAMS, JSONRPC_INVALID_REQUEST, JSONRPC_METHOD_NOT_FOUND,
};
use mcpfs_server::mcp_server::PeerSink;
use mcpfs_server::transport::TransportError;
use mcpfs_server::transport::types::JsonRpcMessage;
use serde_json::{Value, json};

use crate::test_utils::{
    allowed, create_fixture_tree, initialize_with_roots, tool_call, tool_is_error, tool_text,
};

/// Records everything the server sends to its client
#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<Value>>,
}

impl PeerSink for RecordingSink {
    fn send(&self, message: Value) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[tokio::test]
async fn test_initialize_negotiates_version() {
    let server = FilesystemServer::new(Arc::new(AllowedDirectories::empty()));

    let response = server
        .handle_message(initialize_with_roots(1))
        .await
        .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], "2025-06-18");
    assert_eq!(result["serverInfo"]["name"], "mcpfs");
    assert!(result["capabilities"]["tools"].is_object());
    assert_eq!(
        server.negotiated_protocol_version().as_deref(),
        Some("2025-06-18")
    );
}

#[tokio::test]
async fn test_ping_and_unknown_method() {
    let server = FilesystemServer::new(Arc::new(AllowedDirectories::empty()));

    let pong = server
        .handle_message(JsonRpcMessage::request(1, "ping", None))
        .await
        .unwrap();
    assert_eq!(pong.result, Some(json!({})));

    let missing = server
        .handle_message(JsonRpcMessage::request(2, "resources/list", None))
        .await
        .unwrap();
    assert_eq!(missing.error.unwrap().code, JSONRPC_METHOD_NOT_FOUND);
    assert_eq!(missing.id, Some(json!(2)));
}

#[tokio::test]
async fn test_notification_has_no_response() {
    let server = FilesystemServer::new(Arc::new(AllowedDirectories::empty()));

    let response = server
        .handle_message(JsonRpcMessage::notification("notifications/initialized", None))
        .await;

    assert!(response.is_none());
}

#[tokio::test]
async fn test_wrong_jsonrpc_version_is_invalid_request() {
    let server = FilesystemServer::new(Arc::new(AllowedDirectories::empty()));
    let message: JsonRpcMessage =
        serde_json::from_value(json!({ "jsonrpc": "1.0", "id": 3, "method": "ping" })).unwrap();

    let response = server.handle_message(message).await.unwrap();

    assert_eq!(response.error.unwrap().code, JSONRPC_INVALID_REQUEST);
}

#[tokio::test]
async fn test_tools_list_contains_every_tool() {
    let server = FilesystemServer::new(Arc::new(AllowedDirectories::empty()));

    let response = server
        .handle_message(JsonRpcMessage::request(1, "tools/list", None))
        .await
        .unwrap();

    let result = response.result.unwrap();
    let names: Vec<&str> = result["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect();
    for expected in [
        "list_allowed_directories",
        "read_text_file",
        "read_multiple_files",
        "write_file",
        "create_directory",
        "list_directory",
        "move_file",
        "get_file_info",
        "search_files",
    ] {
        assert!(names.contains(&expected), "missing tool {}", expected);
    }
}

#[tokio::test]
async fn test_read_text_file_with_head_and_tail() {
    let (_temp, root) = create_fixture_tree();
    let server = FilesystemServer::new(allowed(&root));
    let path = root.join("notes.txt").display().to_string();

    let head = server
        .handle_message(tool_call(1, "read_text_file", json!({ "path": path, "head": 2 })))
        .await
        .unwrap();
    assert_eq!(tool_text(&head), "one\ntwo");

    let tail = server
        .handle_message(tool_call(2, "read_text_file", json!({ "path": path, "tail": 2 })))
        .await
        .unwrap();
    assert_eq!(tool_text(&tail), "four\nfive");

    let both = server
        .handle_message(tool_call(
            3,
            "read_text_file",
            json!({ "path": path, "head": 1, "tail": 1 }),
        ))
        .await
        .unwrap();
    let error = both.error.unwrap();
    assert_eq!(error.code, JSONRPC_INVALID_PARAMS);
    assert!(error.message.contains("Cannot specify both head and tail"));
}

#[tokio::test]
async fn test_path_outside_allow_list_is_tool_error() {
    let (_temp, root) = create_fixture_tree();
    let (_other_temp, other) = create_fixture_tree();
    let server = FilesystemServer::new(allowed(&root));

    let response = server
        .handle_message(tool_call(
            1,
            "read_text_file",
            json!({ "path": other.join("notes.txt").display().to_string() }),
        ))
        .await
        .unwrap();

    assert!(tool_is_error(&response));
    assert!(tool_text(&response).starts_with("Error: Access denied"));
}

#[tokio::test]
async fn test_write_list_and_move() {
    let (_temp, root) = create_fixture_tree();
    let server = FilesystemServer::new(allowed(&root));
    let created = root.join("docs").join("new.txt");
    let moved = root.join("moved.txt");

    let write = server
        .handle_message(tool_call(
            1,
            "write_file",
            json!({ "path": created.display().to_string(), "content": "hello" }),
        ))
        .await
        .unwrap();
    assert!(!tool_is_error(&write));
    assert_eq!(std::fs::read_to_string(&created).unwrap(), "hello");

    let listing = server
        .handle_message(tool_call(
            2,
            "list_directory",
            json!({ "path": root.display().to_string() }),
        ))
        .await
        .unwrap();
    assert_eq!(tool_text(&listing), "[DIR] docs\n[FILE] notes.txt");

    let mv = server
        .handle_message(tool_call(
            3,
            "move_file",
            json!({
                "source": created.display().to_string(),
                "destination": moved.display().to_string()
            }),
        ))
        .await
        .unwrap();
    assert!(!tool_is_error(&mv));
    assert!(moved.exists());
    assert!(!created.exists());

    let clash = server
        .handle_message(tool_call(
            4,
            "move_file",
            json!({
                "source": root.join("notes.txt").display().to_string(),
                "destination": moved.display().to_string()
            }),
        ))
        .await
        .unwrap();
    assert!(tool_is_error(&clash));
}

#[tokio::test]
async fn test_search_files_with_exclude() {
    let (_temp, root) = create_fixture_tree();
    let server = FilesystemServer::new(allowed(&root));

    let response = server
        .handle_message(tool_call(
            1,
            "search_files",
            json!({
                "path": root.display().to_string(),
                "pattern": "*.*",
                "excludePatterns": ["**/*.tmp"]
            }),
        ))
        .await
        .unwrap();

    let text = tool_text(&response);
    assert!(text.contains("guide.md"));
    assert!(text.contains("notes.txt"));
    assert!(!text.contains("draft.tmp"));
}

#[tokio::test]
async fn test_unknown_tool_and_bad_arguments_are_invalid_params() {
    let (_temp, root) = create_fixture_tree();
    let server = FilesystemServer::new(allowed(&root));

    let unknown = server
        .handle_message(tool_call(1, "delete_everything", json!({})))
        .await
        .unwrap();
    assert_eq!(unknown.error.unwrap().code, JSONRPC_INVALID_PARAMS);

    let bad = server
        .handle_message(tool_call(2, "read_text_file", json!({ "path": 42 })))
        .await
        .unwrap();
    assert_eq!(bad.error.unwrap().code, JSONRPC_INVALID_PARAMS);
}

#[tokio::test]
async fn test_roots_negotiation_sets_session_allow_list() {
    let (_temp, root) = create_fixture_tree();
    let server = FilesystemServer::new(Arc::new(AllowedDirectories::empty()));
    let sink = Arc::new(RecordingSink::default());
    server.connect(sink.clone());

    server.handle_message(initialize_with_roots(1)).await;
    server
        .handle_message(JsonRpcMessage::notification("notifications/initialized", None))
        .await;

    let request = sink.sent.lock().unwrap().first().cloned().unwrap();
    assert_eq!(request["method"], "roots/list");
    let request_id = request["id"].clone();

    let answer: JsonRpcMessage = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": request_id,
        "result": { "roots": [
            { "uri": format!("file://{}", root.display()) },
            { "uri": "file:///definitely/not/here" }
        ] }
    }))
    .unwrap();
    assert!(server.handle_message(answer).await.is_none());

    let listing = server
        .handle_message(tool_call(2, "list_allowed_directories", json!({})))
        .await
        .unwrap();
    assert_eq!(
        tool_text(&listing),
        format!("Allowed directories:\n{}", root.display())
    );
}

#[tokio::test]
async fn test_no_roots_request_with_startup_directories() {
    let (_temp, root) = create_fixture_tree();
    let server = FilesystemServer::new(allowed(&root));
    let sink = Arc::new(RecordingSink::default());
    server.connect(sink.clone());

    server.handle_message(initialize_with_roots(1)).await;
    server
        .handle_message(JsonRpcMessage::notification("notifications/initialized", None))
        .await;

    assert!(sink.sent.lock().unwrap().is_empty());
}
