//! Get File Info Tool Handler

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use mcpfs_infrastructure::error_ext::ErrorContext;

use super::validate_args;
use crate::args::GetFileInfoArgs;
use crate::formatter::ResponseFormatter;
use crate::security::PathGuard;

/// Handler reporting file metadata
pub struct GetFileInfoHandler {
    guard: Arc<PathGuard>,
}

impl GetFileInfoHandler {
    /// Create a new get_file_info handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the get_file_info tool request
    pub async fn handle(
        &self,
        Parameters(args): Parameters<GetFileInfoArgs>,
    ) -> Result<CallToolResult, McpError> {
        validate_args(&args)?;

        let path = match self.guard.validate_path(&args.path).await {
            Ok(path) => path,
            Err(e) => return Ok(ResponseFormatter::tool_error(e)),
        };
        match tokio::fs::metadata(&path)
            .await
            .with_io_context(|| format!("Failed to stat {}", path.display()))
        {
            Ok(metadata) => Ok(ResponseFormatter::format_file_info(&path, &metadata)),
            Err(e) => Ok(ResponseFormatter::tool_error(e)),
        }
    }
}
