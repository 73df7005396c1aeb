//! MCP Tool Handlers
//!
//! One handler per filesystem tool. Each handler validates its arguments,
//! resolves every path through the session's [`PathGuard`](crate::security::PathGuard)
//! and formats the outcome.

pub mod create_directory;
pub mod get_file_info;
pub mod list_allowed_directories;
pub mod list_directory;
pub mod move_file;
pub mod read_multiple_files;
pub mod read_text_file;
pub mod search_files;
pub mod write_file;

// Re-export handlers for convenience
pub use create_directory::CreateDirectoryHandler;
pub use get_file_info::GetFileInfoHandler;
pub use list_allowed_directories::ListAllowedDirectoriesHandler;
pub use list_directory::ListDirectoryHandler;
pub use move_file::MoveFileHandler;
pub use read_multiple_files::ReadMultipleFilesHandler;
pub use read_text_file::ReadTextFileHandler;
pub use search_files::SearchFilesHandler;
pub use write_file::WriteFileHandler;

use rmcp::ErrorData as McpError;
use validator::Validate;

/// Run `validator` checks, mapping failures to JSON-RPC invalid params
pub(crate) fn validate_args<T: Validate>(args: &T) -> Result<(), McpError> {
    args.validate()
        .map_err(|e| McpError::invalid_params(format!("Invalid arguments: {}", e), None))
}
