//! Move File Tool Handler

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use mcpfs_domain::error::{Error, Result};
use mcpfs_infrastructure::error_ext::ErrorContext;

use super::validate_args;
use crate::args::MoveFileArgs;
use crate::formatter::ResponseFormatter;
use crate::security::PathGuard;

/// Handler moving or renaming files and directories
pub struct MoveFileHandler {
    guard: Arc<PathGuard>,
}

impl MoveFileHandler {
    /// Create a new move_file handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the move_file tool request
    pub async fn handle(
        &self,
        Parameters(args): Parameters<MoveFileArgs>,
    ) -> std::result::Result<CallToolResult, McpError> {
        validate_args(&args)?;
        match self.rename(&args).await {
            Ok(()) => Ok(ResponseFormatter::text(format!(
                "Successfully moved {} to {}",
                args.source, args.destination
            ))),
            Err(e) => Ok(ResponseFormatter::tool_error(e)),
        }
    }

    async fn rename(&self, args: &MoveFileArgs) -> Result<()> {
        let source = self.guard.validate_path(&args.source).await?;
        let destination = self.guard.validate_path(&args.destination).await?;

        if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            return Err(Error::invalid_argument(format!(
                "destination already exists: {}",
                destination.display()
            )));
        }

        tokio::fs::rename(&source, &destination)
            .await
            .with_io_context(|| {
                format!(
                    "Failed to move {} to {}",
                    source.display(),
                    destination.display()
                )
            })
    }
}
