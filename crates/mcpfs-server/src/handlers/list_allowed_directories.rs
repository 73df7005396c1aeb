//! List Allowed Directories Tool Handler

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use crate::args::ListAllowedDirectoriesArgs;
use crate::formatter::ResponseFormatter;
use crate::security::PathGuard;

/// Handler reporting the session's effective allow-list
pub struct ListAllowedDirectoriesHandler {
    guard: Arc<PathGuard>,
}

impl ListAllowedDirectoriesHandler {
    /// Create a new list_allowed_directories handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the list_allowed_directories tool request
    pub async fn handle(
        &self,
        Parameters(_args): Parameters<ListAllowedDirectoriesArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(ResponseFormatter::format_allowed_directories(
            &self.guard.effective(),
        ))
    }
}
