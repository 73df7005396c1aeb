//! # mcpfs
//!
//! Remote Model Context Protocol server exposing filesystem tools over a set
//! of allowed directories, reachable over SSE or streamable HTTP.
//!
//! This crate is the public facade; it re-exports the layers below.
//!
//! ## Architecture
//!
//! - `domain` - Allowed directories, transport selection, error taxonomy
//! - `infrastructure` - Configuration, logging, directory resolution
//! - `server` - Protocol server, session table, HTTP bindings

/// Domain layer - core types and errors
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use mcpfs_domain::*;
}

/// Server layer - MCP bindings, sessions and tools
///
/// Re-exports from the server crate for convenience
pub mod server {
    pub use mcpfs_server::*;
}

/// Infrastructure layer - config, logging and directory resolution
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use mcpfs_infrastructure::*;
}

pub use mcpfs_domain::{AllowedDirectories, Error, Result, TransportKind};
pub use mcpfs_server::run;
