//! Write File Tool Handler

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use mcpfs_domain::error::Result;
use mcpfs_infrastructure::error_ext::ErrorContext;

use super::validate_args;
use crate::args::WriteFileArgs;
use crate::formatter::ResponseFormatter;
use crate::security::PathGuard;

/// Handler creating or overwriting files
pub struct WriteFileHandler {
    guard: Arc<PathGuard>,
}

impl WriteFileHandler {
    /// Create a new write_file handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the write_file tool request
    pub async fn handle(
        &self,
        Parameters(args): Parameters<WriteFileArgs>,
    ) -> std::result::Result<CallToolResult, McpError> {
        validate_args(&args)?;
        match self.write(&args).await {
            Ok(()) => Ok(ResponseFormatter::text(format!(
                "Successfully wrote to {}",
                args.path
            ))),
            Err(e) => Ok(ResponseFormatter::tool_error(e)),
        }
    }

    async fn write(&self, args: &WriteFileArgs) -> Result<()> {
        let path = self.guard.validate_path(&args.path).await?;
        tokio::fs::write(&path, args.content.as_bytes())
            .await
            .with_io_context(|| format!("Failed to write {}", path.display()))
    }
}
