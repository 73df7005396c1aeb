//! Tool Router Module
//!
//! Routes incoming tool call requests to the appropriate handlers.
//! This module provides a centralized dispatch mechanism for MCP tool calls.

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::args::{
    CreateDirectoryArgs, GetFileInfoArgs, ListAllowedDirectoriesArgs, ListDirectoryArgs,
    MoveFileArgs, ReadMultipleFilesArgs, ReadTextFileArgs, SearchFilesArgs, WriteFileArgs,
};
use crate::handlers::{
    CreateDirectoryHandler, GetFileInfoHandler, ListAllowedDirectoriesHandler,
    ListDirectoryHandler, MoveFileHandler, ReadMultipleFilesHandler, ReadTextFileHandler,
    SearchFilesHandler, WriteFileHandler,
};
use crate::security::PathGuard;

/// A parsed `tools/call` request
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Tool name
    pub name: String,
    /// Tool arguments object
    pub arguments: Option<Map<String, Value>>,
}

impl ToolCall {
    /// Extract the call from `tools/call` params
    pub fn from_params(params: Option<&Value>) -> Result<Self, McpError> {
        let params =
            params.ok_or_else(|| McpError::invalid_params("Missing params for tools/call", None))?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::invalid_params("Missing 'name' parameter for tools/call", None))?
            .to_string();
        let arguments = params.get("arguments").and_then(|v| v.as_object().cloned());
        Ok(Self { name, arguments })
    }
}

/// Handler references for tool routing
pub struct ToolHandlers {
    /// Handler for list_allowed_directories
    pub list_allowed_directories: Arc<ListAllowedDirectoriesHandler>,
    /// Handler for read_text_file
    pub read_text_file: Arc<ReadTextFileHandler>,
    /// Handler for read_multiple_files
    pub read_multiple_files: Arc<ReadMultipleFilesHandler>,
    /// Handler for write_file
    pub write_file: Arc<WriteFileHandler>,
    /// Handler for create_directory
    pub create_directory: Arc<CreateDirectoryHandler>,
    /// Handler for list_directory
    pub list_directory: Arc<ListDirectoryHandler>,
    /// Handler for move_file
    pub move_file: Arc<MoveFileHandler>,
    /// Handler for get_file_info
    pub get_file_info: Arc<GetFileInfoHandler>,
    /// Handler for search_files
    pub search_files: Arc<SearchFilesHandler>,
}

impl ToolHandlers {
    /// Build every handler over one session's path guard
    pub fn new(guard: &Arc<PathGuard>) -> Self {
        Self {
            list_allowed_directories: Arc::new(ListAllowedDirectoriesHandler::new(Arc::clone(
                guard,
            ))),
            read_text_file: Arc::new(ReadTextFileHandler::new(Arc::clone(guard))),
            read_multiple_files: Arc::new(ReadMultipleFilesHandler::new(Arc::clone(guard))),
            write_file: Arc::new(WriteFileHandler::new(Arc::clone(guard))),
            create_directory: Arc::new(CreateDirectoryHandler::new(Arc::clone(guard))),
            list_directory: Arc::new(ListDirectoryHandler::new(Arc::clone(guard))),
            move_file: Arc::new(MoveFileHandler::new(Arc::clone(guard))),
            get_file_info: Arc::new(GetFileInfoHandler::new(Arc::clone(guard))),
            search_files: Arc::new(SearchFilesHandler::new(Arc::clone(guard))),
        }
    }
}

/// Route a tool call request to the appropriate handler
///
/// Parses the request arguments and delegates to the matching handler.
pub async fn route_tool_call(
    request: ToolCall,
    handlers: &ToolHandlers,
) -> Result<CallToolResult, McpError> {
    match request.name.as_str() {
        "list_allowed_directories" => {
            let args = parse_args::<ListAllowedDirectoriesArgs>(&request)?;
            handlers.list_allowed_directories.handle(Parameters(args)).await
        }
        "read_text_file" => {
            let args = parse_args::<ReadTextFileArgs>(&request)?;
            handlers.read_text_file.handle(Parameters(args)).await
        }
        "read_multiple_files" => {
            let args = parse_args::<ReadMultipleFilesArgs>(&request)?;
            handlers.read_multiple_files.handle(Parameters(args)).await
        }
        "write_file" => {
            let args = parse_args::<WriteFileArgs>(&request)?;
            handlers.write_file.handle(Parameters(args)).await
        }
        "create_directory" => {
            let args = parse_args::<CreateDirectoryArgs>(&request)?;
            handlers.create_directory.handle(Parameters(args)).await
        }
        "list_directory" => {
            let args = parse_args::<ListDirectoryArgs>(&request)?;
            handlers.list_directory.handle(Parameters(args)).await
        }
        "move_file" => {
            let args = parse_args::<MoveFileArgs>(&request)?;
            handlers.move_file.handle(Parameters(args)).await
        }
        "get_file_info" => {
            let args = parse_args::<GetFileInfoArgs>(&request)?;
            handlers.get_file_info.handle(Parameters(args)).await
        }
        "search_files" => {
            let args = parse_args::<SearchFilesArgs>(&request)?;
            handlers.search_files.handle(Parameters(args)).await
        }
        _ => Err(McpError::invalid_params(
            format!("Unknown tool: {}", request.name),
            None,
        )),
    }
}

/// Parse request arguments into the expected type
fn parse_args<T: serde::de::DeserializeOwned>(request: &ToolCall) -> Result<T, McpError> {
    let args_value = Value::Object(request.arguments.clone().unwrap_or_default());
    serde_json::from_value(args_value)
        .map_err(|e| McpError::invalid_params(format!("Invalid arguments: {}", e), None))
}
