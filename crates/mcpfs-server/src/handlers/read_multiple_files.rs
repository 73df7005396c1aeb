//! Read Multiple Files Tool Handler
//!
//! A failure on one file is reported inline and does not stop the others.

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use mcpfs_domain::error::Result;
use mcpfs_infrastructure::error_ext::ErrorContext;

use super::validate_args;
use crate::args::ReadMultipleFilesArgs;
use crate::formatter::ResponseFormatter;
use crate::security::PathGuard;

/// Handler for batched file reads
pub struct ReadMultipleFilesHandler {
    guard: Arc<PathGuard>,
}

impl ReadMultipleFilesHandler {
    /// Create a new read_multiple_files handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the read_multiple_files tool request
    pub async fn handle(
        &self,
        Parameters(args): Parameters<ReadMultipleFilesArgs>,
    ) -> std::result::Result<CallToolResult, McpError> {
        validate_args(&args)?;

        let mut sections = Vec::with_capacity(args.paths.len());
        for requested in &args.paths {
            match self.read(requested).await {
                Ok(content) => sections.push(format!("{}:\n{}\n", requested, content)),
                Err(e) => sections.push(format!("{}: Error - {}", requested, e)),
            }
        }
        Ok(ResponseFormatter::text(sections.join("\n---\n")))
    }

    async fn read(&self, requested: &str) -> Result<String> {
        let path = self.guard.validate_path(requested).await?;
        tokio::fs::read_to_string(&path)
            .await
            .with_io_context(|| format!("Failed to read {}", path.display()))
    }
}
