//! Server Initialization
//!
//! Turns launch arguments into a running binding:
//!
//! 1. Load configuration (figment) and install logging
//! 2. Pick the transport: command-line keyword, else `server.transport`
//! 3. Resolve allowed directories: command line, else `MCP_ALLOWED_DIRECTORIES`
//! 4. Serve exactly one binding until a shutdown signal
//!
//! Resolved directories are handed to the binding directly; nothing is
//! passed back through the process environment.

use std::sync::Arc;

use anyhow::Context;
use mcpfs_domain::constants::ALLOWED_DIRECTORIES_ENV;
use mcpfs_domain::{AllowedDirectories, Result, TransportKind};
use mcpfs_infrastructure::config::{AppConfig, ConfigLoader};
use mcpfs_infrastructure::logging::init_logging;
use mcpfs_infrastructure::resolve_allowed_directories;
use tracing::info;

use crate::transport::{sse, streamable_http};

/// Usage text printed when the server is started without arguments
pub const USAGE: &str = "\
Usage: mcpfs [sse|streamableHttp] [allowed-directory...]

Transports:
  sse              GET /sse event stream, POST /message?sessionId=<id>
  streamableHttp   POST/GET/DELETE /mcp (default)

With no directories, MCP_ALLOWED_DIRECTORIES (colon-separated) is used.
With neither, directories are requested from the client via MCP roots.
";

/// Positional launch arguments `[transport] [dir...]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Transport named on the command line
    pub transport: Option<TransportKind>,
    /// Raw directory arguments, unresolved
    pub directories: Vec<String>,
    /// Whether usage help should be printed
    pub show_usage: bool,
}

impl LaunchArgs {
    /// Split positional arguments into an optional transport and directories
    ///
    /// Only an exact transport keyword in first position selects a
    /// transport; anything else is a directory.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Self {
                show_usage: true,
                ..Self::default()
            };
        }

        let transport = match args[0].parse::<TransportKind>() {
            Ok(kind) => {
                args.remove(0);
                Some(kind)
            }
            Err(_) => None,
        };

        Self {
            transport,
            directories: args,
            show_usage: false,
        }
    }

    /// Transport to run: the command-line keyword, else the configured one
    pub fn select_transport(&self, config: &AppConfig) -> Result<TransportKind> {
        match self.transport {
            Some(kind) => Ok(kind),
            None => config.server.transport_kind(),
        }
    }

    /// Raw directories to resolve
    ///
    /// Command-line directories win; otherwise `env_value` (the content of
    /// `MCP_ALLOWED_DIRECTORIES`) is split on `:`.
    pub fn directory_inputs(&self, env_value: Option<String>) -> Vec<String> {
        if !self.directories.is_empty() {
            return self.directories.clone();
        }
        env_value
            .map(|value| AllowedDirectories::split_env_value(&value))
            .unwrap_or_default()
    }
}

/// Run the filesystem server
///
/// Returns once the binding has shut down; every startup failure is an
/// error the caller turns into a non-zero exit.
pub async fn run<I, S>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let launch = LaunchArgs::parse(args);
    if launch.show_usage {
        eprint!("{}", USAGE);
    }

    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    let transport = launch.select_transport(&config)?;
    let inputs = launch.directory_inputs(std::env::var(ALLOWED_DIRECTORIES_ENV).ok());
    let directories = Arc::new(resolve_allowed_directories(&inputs).await?);

    info!(
        transport = %transport,
        host = %config.server.bind_address(),
        port = config.server.port,
        directories = directories.len(),
        "Starting mcpfs server"
    );

    match transport {
        TransportKind::Sse => sse::serve(&config, directories).await,
        TransportKind::StreamableHttp => streamable_http::serve(&config, directories).await,
    }
}
