//! List Directory Tool Handler

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use mcpfs_domain::error::Result;
use mcpfs_infrastructure::error_ext::ErrorContext;

use super::validate_args;
use crate::args::ListDirectoryArgs;
use crate::formatter::{EntryKind, ResponseFormatter};
use crate::security::PathGuard;

/// Handler listing directory entries
pub struct ListDirectoryHandler {
    guard: Arc<PathGuard>,
}

impl ListDirectoryHandler {
    /// Create a new list_directory handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the list_directory tool request
    pub async fn handle(
        &self,
        Parameters(args): Parameters<ListDirectoryArgs>,
    ) -> std::result::Result<CallToolResult, McpError> {
        validate_args(&args)?;
        match self.list(&args.path).await {
            Ok(entries) => Ok(ResponseFormatter::format_listing(entries)),
            Err(e) => Ok(ResponseFormatter::tool_error(e)),
        }
    }

    async fn list(&self, requested: &str) -> Result<Vec<(String, EntryKind)>> {
        let path = self.guard.validate_path(requested).await?;
        let mut reader = tokio::fs::read_dir(&path)
            .await
            .with_io_context(|| format!("Failed to list {}", path.display()))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .with_io_context(|| format!("Failed to list {}", path.display()))?
        {
            let kind = match entry.file_type().await {
                Ok(file_type) if file_type.is_dir() => EntryKind::Directory,
                _ => EntryKind::File,
            };
            entries.push((entry.file_name().to_string_lossy().into_owned(), kind));
        }
        Ok(entries)
    }
}
