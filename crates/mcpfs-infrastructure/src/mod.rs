//! # mcpfs Infrastructure Layer
//!
//! Cross-cutting technical concerns for the remote filesystem server:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based configuration (defaults, TOML, environment) |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`directories`] | Startup resolution and validation of allowed directories |
//! | [`error_ext`] | Context helpers mapping foreign errors into the domain error |

pub mod config;
pub mod constants;
pub mod directories;
pub mod error_ext;
pub mod logging;

pub use config::{AppConfig, ConfigLoader};
pub use directories::resolve_allowed_directories;
