//! HTTP replies
//!
//! [`McpReply`] is the single responder type of both bindings: a status,
//! an optional `mcp-session-id` header and one of three body shapes.

use std::io::Cursor;

use futures::stream::BoxStream;
use rocket::http::{ContentType, Header, Status};
use rocket::request::Request;
use rocket::response::stream::{Event, EventStream};
use rocket::response::{self, Responder, Response};
use serde_json::Value;

use super::types::McpResponse;
use crate::constants::{
    JSONRPC_INTERNAL_ERROR, JSONRPC_SERVER_ERROR, MCP_PROTOCOL_VERSION_HEADER,
    MCP_SESSION_ID_HEADER,
};

/// Boxed SSE event stream
pub type EventBody = EventStream<BoxStream<'static, Event>>;

/// Body of an [`McpReply`]
pub enum ReplyBody {
    /// No body
    Empty,
    /// JSON document
    Json(Value),
    /// Server-sent events
    Stream(EventBody),
}

/// Response of a binding route
pub struct McpReply {
    status: Status,
    session_id: Option<String>,
    protocol_version: Option<String>,
    body: ReplyBody,
}

impl McpReply {
    /// Reply with status and body
    pub fn new(status: Status, body: ReplyBody) -> Self {
        Self {
            status,
            session_id: None,
            protocol_version: None,
            body,
        }
    }

    /// Empty reply
    pub fn empty(status: Status) -> Self {
        Self::new(status, ReplyBody::Empty)
    }

    /// JSON reply
    pub fn json(status: Status, value: Value) -> Self {
        Self::new(status, ReplyBody::Json(value))
    }

    /// Event stream reply (200)
    pub fn stream(events: EventBody) -> Self {
        Self::new(Status::Ok, ReplyBody::Stream(events))
    }

    /// Structured JSON-RPC error reply
    pub fn error(status: Status, code: i32, message: impl Into<String>, id: Option<Value>) -> Self {
        Self::json(status, McpResponse::error(id, code, message).to_value())
    }

    /// 400 for a missing or unknown streamable HTTP session
    pub fn no_valid_session(id: Option<Value>) -> Self {
        Self::error(
            Status::BadRequest,
            JSONRPC_SERVER_ERROR,
            "Bad Request: No valid session ID provided",
            id,
        )
    }

    /// 500 for an unhandled failure
    pub fn internal_error(id: Option<Value>) -> Self {
        Self::error(
            Status::InternalServerError,
            JSONRPC_INTERNAL_ERROR,
            "Internal server error",
            id,
        )
    }

    /// Attach the `mcp-session-id` header
    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    /// Attach the `mcp-protocol-version` header
    pub fn with_protocol_version(mut self, version: Option<String>) -> Self {
        self.protocol_version = version;
        self
    }

    /// HTTP status
    pub fn status(&self) -> Status {
        self.status
    }

    /// JSON body, if this reply carries one
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ReplyBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl<'r> Responder<'r, 'r> for McpReply {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'r> {
        let mut response = match self.body {
            ReplyBody::Empty => Response::build().finalize(),
            ReplyBody::Json(value) => {
                let bytes = serde_json::to_vec(&value).map_err(|_| Status::InternalServerError)?;
                Response::build()
                    .header(ContentType::JSON)
                    .sized_body(bytes.len(), Cursor::new(bytes))
                    .finalize()
            }
            ReplyBody::Stream(events) => events.respond_to(request)?,
        };

        response.set_status(self.status);
        if let Some(session_id) = self.session_id {
            response.set_header(Header::new(MCP_SESSION_ID_HEADER, session_id));
        }
        if let Some(version) = self.protocol_version {
            response.set_header(Header::new(MCP_PROTOCOL_VERSION_HEADER, version));
        }
        Ok(response)
    }
}
