//! Create Directory Tool Handler

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use mcpfs_domain::error::Result;
use mcpfs_infrastructure::error_ext::ErrorContext;

use super::validate_args;
use crate::args::CreateDirectoryArgs;
use crate::formatter::ResponseFormatter;
use crate::security::PathGuard;

/// Handler creating directories (parents included)
pub struct CreateDirectoryHandler {
    guard: Arc<PathGuard>,
}

impl CreateDirectoryHandler {
    /// Create a new create_directory handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the create_directory tool request
    pub async fn handle(
        &self,
        Parameters(args): Parameters<CreateDirectoryArgs>,
    ) -> std::result::Result<CallToolResult, McpError> {
        validate_args(&args)?;
        match self.create(&args.path).await {
            Ok(()) => Ok(ResponseFormatter::text(format!(
                "Successfully created directory {}",
                args.path
            ))),
            Err(e) => Ok(ResponseFormatter::tool_error(e)),
        }
    }

    async fn create(&self, requested: &str) -> Result<()> {
        let path = self.guard.validate_path(requested).await?;
        tokio::fs::create_dir_all(&path)
            .await
            .with_io_context(|| format!("Failed to create {}", path.display()))
    }
}
