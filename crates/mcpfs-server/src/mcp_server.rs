//! MCP Server Implementation
//!
//! [`FilesystemServer`] is the per-session protocol server. Each transport
//! owns exactly one; nothing in it is shared between sessions apart from the
//! read-only startup allow-list.
//!
//! Server-to-client requests (`roots/list`) go out through the [`PeerSink`]
//! the transport connects, and the client's answers come back through
//! [`FilesystemServer::handle_message`] like any other message.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rmcp::ServerHandler;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use mcpfs_domain::AllowedDirectories;

use crate::constants::{
    JSONRPC_INTERNAL_ERROR, JSONRPC_INVALID_REQUEST, JSONRPC_METHOD_NOT_FOUND,
    LATEST_PROTOCOL_VERSION, SERVER_NAME, SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::roots::resolve_roots;
use crate::security::PathGuard;
use crate::tools::{ToolCall, ToolHandlers, create_tool_list, route_tool_call};
use crate::transport::TransportError;
use crate::transport::types::{JsonRpcMessage, McpResponse, MessageKind};

/// Outbound channel from a protocol server to its client
pub trait PeerSink: Send + Sync {
    /// Deliver a server-initiated message
    fn send(&self, message: Value) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingRequest {
    ListRoots,
}

#[derive(Debug, Default)]
struct ClientState {
    supports_roots: bool,
    protocol_version: Option<String>,
    name: Option<String>,
}

/// Per-session filesystem protocol server
pub struct FilesystemServer {
    guard: Arc<PathGuard>,
    handlers: ToolHandlers,
    peer: Mutex<Option<Arc<dyn PeerSink>>>,
    client: Mutex<ClientState>,
    pending: Mutex<HashMap<String, PendingRequest>>,
    next_request_id: AtomicU64,
}

impl FilesystemServer {
    /// Create a server over the startup allow-list
    pub fn new(directories: Arc<AllowedDirectories>) -> Self {
        let guard = Arc::new(PathGuard::new(directories));
        let handlers = ToolHandlers::new(&guard);
        Self {
            guard,
            handlers,
            peer: Mutex::new(None),
            client: Mutex::new(ClientState::default()),
            pending: Mutex::new(HashMap::new()),
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Attach the outbound channel
    pub fn connect(&self, sink: Arc<dyn PeerSink>) {
        *self.peer.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    /// The session's path guard
    pub fn guard(&self) -> &Arc<PathGuard> {
        &self.guard
    }

    /// Protocol version agreed during `initialize`
    pub fn negotiated_protocol_version(&self) -> Option<String> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .protocol_version
            .clone()
    }

    /// Process one inbound message
    ///
    /// Returns the response owed to the client, or `None` for notifications
    /// and client responses.
    pub async fn handle_message(&self, message: JsonRpcMessage) -> Option<McpResponse> {
        match message.kind() {
            MessageKind::Request => Some(self.handle_request(message).await),
            MessageKind::Notification => {
                self.handle_notification(&message);
                None
            }
            MessageKind::Response => {
                self.handle_client_response(message).await;
                None
            }
            MessageKind::Invalid => Some(McpResponse::error(
                message.id,
                JSONRPC_INVALID_REQUEST,
                "Invalid Request",
            )),
        }
    }

    /// Drop session-scoped state once the session is gone
    pub fn cleanup(&self, session_id: &str) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.peer.lock().unwrap_or_else(PoisonError::into_inner).take();
        self.guard.clear_session_roots();
        info!("Cleaned up session state for {}", session_id);
    }

    async fn handle_request(&self, message: JsonRpcMessage) -> McpResponse {
        let id = message.id.clone();
        let method = message.method.as_deref().unwrap_or_default();
        match method {
            "initialize" => self.handle_initialize(id, message.params.as_ref()),
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, message.params.as_ref()).await,
            _ => McpResponse::error(
                id,
                JSONRPC_METHOD_NOT_FOUND,
                format!("Unknown method: {}", method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<&Value>) -> McpResponse {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = negotiate_protocol_version(requested);
        let supports_roots = params
            .and_then(|p| p.get("capabilities"))
            .and_then(|c| c.get("roots"))
            .is_some();
        let name = params
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);

        info!(
            client = name.as_deref().unwrap_or("unknown"),
            protocol_version = version,
            supports_roots,
            "Client initializing"
        );
        {
            let mut client = self.client.lock().unwrap_or_else(PoisonError::into_inner);
            client.supports_roots = supports_roots;
            client.protocol_version = Some(version.to_string());
            client.name = name;
        }

        let mut result = match serde_json::to_value(self.get_info()) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "Failed to serialize server info");
                return McpResponse::error(
                    id,
                    JSONRPC_INTERNAL_ERROR,
                    format!("Failed to serialize server info: {}", e),
                );
            }
        };
        if let Some(object) = result.as_object_mut() {
            object.insert("protocolVersion".to_string(), json!(version));
        }
        McpResponse::success(id, result)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<&Value>) -> McpResponse {
        let call = match ToolCall::from_params(params) {
            Ok(call) => call,
            Err(e) => return McpResponse::error(id, e.code.0, e.message.to_string()),
        };
        let tool = call.name.clone();

        match route_tool_call(call, &self.handlers).await {
            Ok(result) => McpResponse::success(id, tool_result_to_json(&result)),
            Err(e) => {
                warn!(tool = %tool, error = %e.message, "Tool call rejected");
                McpResponse::error(id, e.code.0, e.message.to_string())
            }
        }
    }

    fn handle_notification(&self, message: &JsonRpcMessage) {
        match message.method.as_deref() {
            Some("notifications/initialized") => {
                info!("Client initialized");
                if self.should_request_roots() {
                    self.request_roots();
                }
            }
            Some("notifications/roots/list_changed") => {
                if self.should_request_roots() {
                    self.request_roots();
                }
            }
            other => debug!(method = ?other, "Ignoring notification"),
        }
    }

    async fn handle_client_response(&self, message: JsonRpcMessage) {
        let key = message.id.as_ref().map(request_key).unwrap_or_default();
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);

        match pending {
            Some(PendingRequest::ListRoots) => {
                if let Some(error) = message.error {
                    warn!(error = %error, "Client rejected roots/list request");
                    return;
                }
                let roots = message
                    .result
                    .as_ref()
                    .and_then(|r| r.get("roots"))
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let directories = resolve_roots(&roots).await;
                if directories.is_empty() {
                    error!("No valid root directories provided by client");
                    return;
                }
                info!(
                    "Updated allowed directories from MCP roots: {} valid director{}",
                    directories.len(),
                    if directories.len() == 1 { "y" } else { "ies" }
                );
                self.guard.set_session_roots(directories);
            }
            None => debug!(id = %key, "Ignoring response to unknown request"),
        }
    }

    fn should_request_roots(&self) -> bool {
        self.guard.startup_directories().is_empty()
            && self
                .client
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .supports_roots
    }

    fn request_roots(&self) {
        let Some(peer) = self
            .peer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        else {
            debug!("No outbound channel connected, skipping roots/list");
            return;
        };

        let id = format!(
            "roots-{}",
            self.next_request_id.fetch_add(1, Ordering::Relaxed)
        );
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), PendingRequest::ListRoots);

        let request = JsonRpcMessage::request(id.clone(), "roots/list", None);
        let sent = serde_json::to_value(&request)
            .map_err(TransportError::from)
            .and_then(|value| peer.send(value));
        if let Err(e) = sent {
            warn!(error = %e, "Failed to send roots/list request");
            self.pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        }
    }
}

impl ServerHandler for FilesystemServer {
    /// Get server information and capabilities
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "mcpfs - Remote Filesystem Access\n\n\
                 Every path must lie inside an allowed directory; call \
                 list_allowed_directories to see them.\n\n\
                 Tools:\n\
                 - read_text_file / read_multiple_files: Read file contents\n\
                 - write_file / create_directory / move_file: Modify the tree\n\
                 - list_directory / search_files / get_file_info: Inspect the tree\n"
                    .to_string(),
            ),
        }
    }
}

/// Pick the protocol version to answer `initialize` with
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|r| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|v| **v == r))
        .copied()
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

/// Handle the `tools/list` method
fn handle_tools_list(id: Option<Value>) -> McpResponse {
    match create_tool_list() {
        Ok(tools) => {
            let tools_json: Vec<Value> = tools
                .into_iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "inputSchema": serde_json::to_value(tool.input_schema.as_ref()).ok()
                    })
                })
                .collect();
            McpResponse::success(id, json!({ "tools": tools_json }))
        }
        Err(e) => {
            error!(error = ?e, "Failed to list tools");
            McpResponse::error(
                id,
                JSONRPC_INTERNAL_ERROR,
                format!("Failed to list tools: {}", e.message),
            )
        }
    }
}

/// Convert tool call result to JSON response
fn tool_result_to_json(result: &rmcp::model::CallToolResult) -> Value {
    let content_json: Vec<Value> = result
        .content
        .iter()
        .map(|content| {
            serde_json::to_value(content).unwrap_or(json!({
                "type": "text",
                "text": "Error serializing content"
            }))
        })
        .collect();

    json!({
        "content": content_json,
        "isError": result.is_error.unwrap_or(false)
    })
}

fn request_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
