//! mcpfs - Entry Point
//!
//! Binary entry point for the remote filesystem server.
//!
//! ## Usage
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mcpfs /srv/data` | Streamable HTTP (default) serving `/srv/data` |
//! | `mcpfs sse /srv/a /srv/b` | SSE binding serving two directories |
//! | `mcpfs streamableHttp` | No directories: ask the client for MCP roots |

use std::process::ExitCode;

use clap::Parser;
use mcpfs::run;

/// Command line interface for mcpfs
#[derive(Parser, Debug)]
#[command(name = "mcpfs")]
#[command(about = "mcpfs - Remote MCP filesystem server (SSE or streamable HTTP)")]
#[command(version)]
pub struct Cli {
    /// Optional transport (`sse` or `streamableHttp`) followed by allowed directories
    #[arg(value_name = "TRANSPORT|DIR")]
    pub args: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
