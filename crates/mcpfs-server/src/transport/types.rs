//! Transport layer types
//!
//! JSON-RPC message types shared by both bindings and the protocol server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::JSONRPC_VERSION;

/// Any JSON-RPC message a client can send
///
/// Requests, notifications and responses share one shape; [`kind`](Self::kind)
/// tells them apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonRpcMessage {
    /// JSON-RPC version, must be `"2.0"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Method name (requests and notifications)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Request ID (requests and responses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Result of a client response to a server request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error of a client response to a server request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Classification of a [`JsonRpcMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Has a method and an id; expects a response
    Request,
    /// Has a method and no id
    Notification,
    /// Answers a request the server sent
    Response,
    /// Anything else
    Invalid,
}

impl JsonRpcMessage {
    /// Build a request
    pub fn request(id: impl Into<Value>, method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            method: Some(method.to_string()),
            params,
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Build a notification
    pub fn notification(method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            method: Some(method.to_string()),
            params,
            ..Default::default()
        }
    }

    /// Classify the message
    pub fn kind(&self) -> MessageKind {
        if self.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
            return MessageKind::Invalid;
        }
        match (&self.method, &self.id) {
            (Some(_), Some(_)) => MessageKind::Request,
            (Some(_), None) => MessageKind::Notification,
            (None, Some(_)) if self.result.is_some() || self.error.is_some() => {
                MessageKind::Response
            }
            _ => MessageKind::Invalid,
        }
    }

    /// Whether the server owes the client an answer to this message
    pub fn expects_response(&self) -> bool {
        matches!(self.kind(), MessageKind::Request | MessageKind::Invalid)
    }

    /// Whether this is an `initialize` request
    pub fn is_initialize_request(&self) -> bool {
        self.kind() == MessageKind::Request && self.method.as_deref() == Some("initialize")
    }
}

/// A POST body: one message or a batch
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcPayload {
    /// JSON array of messages
    Batch(Vec<JsonRpcMessage>),
    /// Single JSON object
    Single(JsonRpcMessage),
}

impl JsonRpcPayload {
    /// Parse a raw request body
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Whether the body was a JSON array
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    /// Messages in arrival order
    pub fn messages(&self) -> &[JsonRpcMessage] {
        match self {
            Self::Batch(messages) => messages,
            Self::Single(message) => std::slice::from_ref(message),
        }
    }

    /// Consume into messages in arrival order
    pub fn into_messages(self) -> Vec<JsonRpcMessage> {
        match self {
            Self::Batch(messages) => messages,
            Self::Single(message) => vec![message],
        }
    }

    /// Id of the first message, echoed in transport-level error bodies
    pub fn first_id(&self) -> Option<Value> {
        self.messages().first().and_then(|m| m.id.clone())
    }

    /// Whether at least one message is owed an answer
    pub fn expects_response(&self) -> bool {
        self.messages().iter().any(JsonRpcMessage::expects_response)
    }

    /// Whether any message is an `initialize` request
    pub fn contains_initialize(&self) -> bool {
        self.messages().iter().any(JsonRpcMessage::is_initialize_request)
    }
}

/// MCP response payload (JSON-RPC format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Response result (if successful)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (if failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<McpErrorObject>,
    /// Request ID, `null` when unknown
    pub id: Option<Value>,
}

/// MCP error object (JSON-RPC format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpErrorObject {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
}

impl McpResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(McpErrorObject {
                code,
                message: message.into(),
            }),
            id,
        }
    }

    /// Serialize for the wire
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
