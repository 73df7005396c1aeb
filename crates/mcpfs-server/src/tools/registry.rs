//! Tool Registry Module
//!
//! Manages tool definitions and schema generation for the MCP protocol.
//! This module centralizes all tool metadata to enable consistent tool listing.

use rmcp::ErrorData as McpError;
use rmcp::model::Tool;
use std::borrow::Cow;
use std::sync::Arc;

use crate::args::{
    CreateDirectoryArgs, GetFileInfoArgs, ListAllowedDirectoriesArgs, ListDirectoryArgs,
    MoveFileArgs, ReadMultipleFilesArgs, ReadTextFileArgs, SearchFilesArgs, WriteFileArgs,
};

/// Tool definitions for MCP protocol
pub struct ToolDefinitions;

impl ToolDefinitions {
    /// Get the list_allowed_directories tool definition
    pub fn list_allowed_directories() -> Result<Tool, McpError> {
        Self::create_tool(
            "list_allowed_directories",
            "List the directories this session is allowed to access",
            schemars::schema_for!(ListAllowedDirectoriesArgs),
        )
    }

    /// Get the read_text_file tool definition
    pub fn read_text_file() -> Result<Tool, McpError> {
        Self::create_tool(
            "read_text_file",
            "Read the complete contents of a text file, or only its first or last N lines",
            schemars::schema_for!(ReadTextFileArgs),
        )
    }

    /// Get the read_multiple_files tool definition
    pub fn read_multiple_files() -> Result<Tool, McpError> {
        Self::create_tool(
            "read_multiple_files",
            "Read several files at once; a failure on one file does not stop the others",
            schemars::schema_for!(ReadMultipleFilesArgs),
        )
    }

    /// Get the write_file tool definition
    pub fn write_file() -> Result<Tool, McpError> {
        Self::create_tool(
            "write_file",
            "Create a new file or completely overwrite an existing one",
            schemars::schema_for!(WriteFileArgs),
        )
    }

    /// Get the create_directory tool definition
    pub fn create_directory() -> Result<Tool, McpError> {
        Self::create_tool(
            "create_directory",
            "Create a directory, including missing parents; succeeds if it already exists",
            schemars::schema_for!(CreateDirectoryArgs),
        )
    }

    /// Get the list_directory tool definition
    pub fn list_directory() -> Result<Tool, McpError> {
        Self::create_tool(
            "list_directory",
            "List directory entries prefixed with [DIR] or [FILE]",
            schemars::schema_for!(ListDirectoryArgs),
        )
    }

    /// Get the move_file tool definition
    pub fn move_file() -> Result<Tool, McpError> {
        Self::create_tool(
            "move_file",
            "Move or rename a file or directory; fails if the destination exists",
            schemars::schema_for!(MoveFileArgs),
        )
    }

    /// Get the get_file_info tool definition
    pub fn get_file_info() -> Result<Tool, McpError> {
        Self::create_tool(
            "get_file_info",
            "Retrieve size, timestamps, type and permissions of a file or directory",
            schemars::schema_for!(GetFileInfoArgs),
        )
    }

    /// Get the search_files tool definition
    pub fn search_files() -> Result<Tool, McpError> {
        Self::create_tool(
            "search_files",
            "Recursively search for files and directories matching a glob pattern",
            schemars::schema_for!(SearchFilesArgs),
        )
    }

    /// Create a tool from schema
    fn create_tool(
        name: &'static str,
        description: &'static str,
        schema: schemars::Schema,
    ) -> Result<Tool, McpError> {
        let schema_value = serde_json::to_value(schema)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let input_schema = schema_value
            .as_object()
            .ok_or_else(|| {
                McpError::internal_error(format!("Schema for {} is not an object", name), None)
            })?
            .clone();

        Ok(Tool {
            name: Cow::Borrowed(name),
            title: None,
            description: Some(Cow::Borrowed(description)),
            input_schema: Arc::new(input_schema),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: Default::default(),
        })
    }
}

/// Create the complete list of available tools
///
/// Returns all tool definitions for the MCP list_tools response.
pub fn create_tool_list() -> Result<Vec<Tool>, McpError> {
    Ok(vec![
        ToolDefinitions::read_text_file()?,
        ToolDefinitions::read_multiple_files()?,
        ToolDefinitions::write_file()?,
        ToolDefinitions::create_directory()?,
        ToolDefinitions::list_directory()?,
        ToolDefinitions::move_file()?,
        ToolDefinitions::search_files()?,
        ToolDefinitions::get_file_info()?,
        ToolDefinitions::list_allowed_directories()?,
    ])
}
