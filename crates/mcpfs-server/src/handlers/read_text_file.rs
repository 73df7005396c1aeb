//! Read Text File Tool Handler
//!
//! Reads a UTF-8 file, optionally limited to its first or last N lines.

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use mcpfs_domain::error::Result;
use mcpfs_infrastructure::error_ext::ErrorContext;

use super::validate_args;
use crate::args::ReadTextFileArgs;
use crate::formatter::ResponseFormatter;
use crate::security::PathGuard;

/// Handler for text file reads
pub struct ReadTextFileHandler {
    guard: Arc<PathGuard>,
}

impl ReadTextFileHandler {
    /// Create a new read_text_file handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the read_text_file tool request
    pub async fn handle(
        &self,
        Parameters(args): Parameters<ReadTextFileArgs>,
    ) -> std::result::Result<CallToolResult, McpError> {
        validate_args(&args)?;
        args.validate_line_limits()
            .map_err(|message| McpError::invalid_params(message, None))?;

        match self.read(&args).await {
            Ok(text) => Ok(ResponseFormatter::text(text)),
            Err(e) => Ok(ResponseFormatter::tool_error(e)),
        }
    }

    async fn read(&self, args: &ReadTextFileArgs) -> Result<String> {
        let path = self.guard.validate_path(&args.path).await?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_io_context(|| format!("Failed to read {}", path.display()))?;

        Ok(match (args.head, args.tail) {
            (Some(n), _) => head_lines(&content, n),
            (_, Some(n)) => tail_lines(&content, n),
            _ => content,
        })
    }
}

/// First `n` lines of `content`
pub fn head_lines(content: &str, n: usize) -> String {
    content.lines().take(n).collect::<Vec<_>>().join("\n")
}

/// Last `n` lines of `content`
pub fn tail_lines(content: &str, n: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
