//! MCP Transport Layer
//!
//! Two HTTP bindings share this module's plumbing:
//!
//! | Binding | Endpoints | Session id |
//! |---------|-----------|------------|
//! | [`sse`] | `GET /sse`, `POST /message?sessionId=` | generated when the stream opens |
//! | [`streamable_http`] | `POST`/`GET`/`DELETE /mcp` | assigned when `initialize` is processed |
//!
//! Exactly one binding runs per process. Each owns a
//! [`SessionTable`](crate::session::SessionTable) in Rocket managed state.

pub mod cors;
pub mod error;
pub mod event_store;
pub mod headers;
pub mod reply;
pub mod shutdown;
pub mod sse;
pub mod streamable_http;
pub mod types;

use std::time::Duration;

use rocket::data::{ByteUnit, Data};
use rocket::figment::Figment;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Request, catch};
use serde_json::Value;
use tracing::warn;

use mcpfs_infrastructure::config::AppConfig;
use mcpfs_infrastructure::constants::{DEFAULT_EVENT_STORE_CAPACITY, DEFAULT_MAX_BODY_BYTES};

use crate::constants::{JSONRPC_INTERNAL_ERROR, JSONRPC_INVALID_REQUEST, JSONRPC_PARSE_ERROR};

// Re-export transport types
pub use error::TransportError;
pub use event_store::{EventStore, InMemoryEventStore};
pub use headers::McpHeaders;
pub use reply::McpReply;
pub use types::{JsonRpcMessage, JsonRpcPayload, McpErrorObject, McpResponse};

/// Binding behaviour derived from configuration
#[derive(Debug, Clone)]
pub struct BindingSettings {
    /// Largest accepted request body
    pub max_body_bytes: u64,
    /// SSE keep-alive interval
    pub keep_alive: Option<Duration>,
    /// Events retained per streamable HTTP session
    pub event_store_capacity: usize,
    /// Answer streamable HTTP POSTs with JSON bodies
    pub json_response: bool,
}

impl Default for BindingSettings {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            keep_alive: None,
            event_store_capacity: DEFAULT_EVENT_STORE_CAPACITY,
            json_response: false,
        }
    }
}

impl BindingSettings {
    /// Derive settings from the application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_body_bytes: config.server.max_body_bytes,
            keep_alive: config.session.keep_alive(),
            event_store_capacity: config.session.event_store_capacity,
            json_response: config.session.json_response,
        }
    }
}

/// Rocket configuration for either binding
///
/// Rocket's own logging and signal handling are switched off: tracing
/// carries the logs and the binding drives shutdown itself.
pub fn rocket_figment(config: &AppConfig) -> Figment {
    rocket::Config::figment()
        .merge(("address", config.server.bind_address()))
        .merge(("port", config.server.port))
        .merge(("log_level", "off"))
        .merge(("cli_colors", false))
        .merge(("shutdown.ctrlc", false))
        .merge(("shutdown.signals", Vec::<String>::new()))
}

/// Read and parse a JSON-RPC request body
///
/// The error side is a ready-made reply: 413 when the body exceeds
/// `limit`, 400 / -32700 when it is not valid JSON-RPC.
pub async fn read_payload(data: Data<'_>, limit: u64) -> Result<JsonRpcPayload, McpReply> {
    let body = data
        .open(ByteUnit::from(limit))
        .into_string()
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to read request body");
            McpReply::error(
                Status::BadRequest,
                JSONRPC_PARSE_ERROR,
                "Parse error: unreadable request body",
                None,
            )
        })?;

    if !body.is_complete() {
        return Err(McpReply::error(
            Status::PayloadTooLarge,
            JSONRPC_INVALID_REQUEST,
            format!("Request body exceeds {} bytes", limit),
            None,
        ));
    }

    JsonRpcPayload::parse(&body.into_inner()).map_err(|e| {
        McpReply::error(
            Status::BadRequest,
            JSONRPC_PARSE_ERROR,
            format!("Parse error: {}", e),
            None,
        )
    })
}

/// Structured body for unhandled failures
#[catch(500)]
pub fn internal_error(_request: &Request<'_>) -> (Status, Json<Value>) {
    (
        Status::InternalServerError,
        Json(McpResponse::error(None, JSONRPC_INTERNAL_ERROR, "Internal server error").to_value()),
    )
}
