//! Server-specific constants
//!
//! JSON-RPC error codes, MCP header names and protocol values shared by
//! both HTTP bindings.

// ============================================================================
// JSON-RPC ERROR CODES (Standard)
// ============================================================================

/// JSON-RPC Method not found error code
pub const JSONRPC_METHOD_NOT_FOUND: i32 = -32601;

/// JSON-RPC Parse error code
pub const JSONRPC_PARSE_ERROR: i32 = -32700;

/// JSON-RPC Invalid request error code
pub const JSONRPC_INVALID_REQUEST: i32 = -32600;

/// JSON-RPC Invalid params error code
pub const JSONRPC_INVALID_PARAMS: i32 = -32602;

/// JSON-RPC Internal error code
pub const JSONRPC_INTERNAL_ERROR: i32 = -32603;

// ============================================================================
// JSON-RPC ERROR CODES (Server range)
// ============================================================================

/// Generic transport-level rejection (bad session, not initialised, conflict)
pub const JSONRPC_SERVER_ERROR: i32 = -32000;

/// Session lookup failed on the SSE message endpoint
pub const JSONRPC_SESSION_NOT_FOUND: i32 = -32001;

// ============================================================================
// PROTOCOL
// ============================================================================

/// JSON-RPC version string
pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol versions this server can speak, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

/// Version answered when the client asks for one we do not know
pub const LATEST_PROTOCOL_VERSION: &str = SUPPORTED_PROTOCOL_VERSIONS[0];

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "mcpfs";

// ============================================================================
// HTTP HEADERS
// ============================================================================

/// Session identifier header of the streamable HTTP binding
pub const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

/// Resumption header sent by reconnecting SSE clients
pub const LAST_EVENT_ID_HEADER: &str = "last-event-id";

/// Negotiated protocol version header
pub const MCP_PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";

/// Headers exposed to browser clients
pub const EXPOSED_HEADERS: [&str; 3] = [
    MCP_SESSION_ID_HEADER,
    LAST_EVENT_ID_HEADER,
    MCP_PROTOCOL_VERSION_HEADER,
];

// ============================================================================
// ENDPOINTS
// ============================================================================

/// SSE binding: event stream endpoint
pub const SSE_ENDPOINT: &str = "/sse";

/// SSE binding: client-to-server message endpoint
pub const SSE_MESSAGE_ENDPOINT: &str = "/message";

/// Streamable HTTP binding endpoint
pub const STREAMABLE_HTTP_ENDPOINT: &str = "/mcp";

/// Stream id under which standalone GET stream events are stored
pub const STANDALONE_STREAM_ID: &str = "_GET_stream";
