//! Domain constants

/// Environment variable carrying colon-joined allowed directories
pub const ALLOWED_DIRECTORIES_ENV: &str = "MCP_ALLOWED_DIRECTORIES";

/// Separator used when allowed directories are joined into one string
pub const ALLOWED_DIRECTORIES_SEPARATOR: char = ':';

/// Wire name of the SSE transport
pub const TRANSPORT_SSE: &str = "sse";

/// Wire name of the streamable HTTP transport
pub const TRANSPORT_STREAMABLE_HTTP: &str = "streamableHttp";
