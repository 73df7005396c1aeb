//! # mcpfs Server
//!
//! Remote MCP filesystem server: the protocol server exposing filesystem
//! tools over a set of allowed directories, and the two HTTP bindings that
//! carry it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // streamable HTTP on the configured port, serving /srv/data
//!     mcpfs_server::run(["streamableHttp", "/srv/data"]).await
//! }
//! ```
//!
//! ## Architecture
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`init`] | Launch arguments, transport selection, startup |
//! | [`transport`] | SSE and streamable HTTP bindings (Rocket) |
//! | [`session`] | Session table shared by both bindings |
//! | [`mcp_server`] | Per-session JSON-RPC dispatch and roots negotiation |
//! | [`tools`] | Tool definitions and routing |
//! | [`handlers`] | One handler per filesystem tool |
//! | [`security`] | Path guard confining tools to allowed directories |
//!
//! Each session owns its own [`FilesystemServer`]; sessions share only the
//! read-only startup directory set.

// Allow Rust 2024 compatibility issues from Rocket's EventStream macro
#![allow(rust_2024_compatibility)]

pub mod args;
pub mod constants;
pub mod formatter;
pub mod handlers;
pub mod init;
pub mod mcp_server;
pub mod roots;
pub mod security;
pub mod session;
pub mod tools;
pub mod transport;

// Re-export core types for public API
pub use init::{LaunchArgs, run};
pub use mcp_server::FilesystemServer;
pub use session::{SessionError, SessionTable, SessionTransport};
