//! Tool argument types
//!
//! Argument structs for every filesystem tool. Schemas published in
//! `tools/list` are generated from these types.

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// Arguments for the list_allowed_directories tool
#[derive(Debug, Default, Deserialize, JsonSchema, Validate)]
#[schemars(description = "No parameters")]
pub struct ListAllowedDirectoriesArgs {}

/// Arguments for the read_text_file tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for reading a text file")]
pub struct ReadTextFileArgs {
    /// File to read
    #[validate(length(min = 1, message = "Path cannot be empty"))]
    #[schemars(description = "Path of the file to read")]
    pub path: String,
    /// Return only the first N lines
    #[validate(range(min = 1, message = "head must be at least 1"))]
    #[schemars(description = "If provided, returns only the first N lines of the file")]
    pub head: Option<usize>,
    /// Return only the last N lines
    #[validate(range(min = 1, message = "tail must be at least 1"))]
    #[schemars(description = "If provided, returns only the last N lines of the file")]
    pub tail: Option<usize>,
}

/// Arguments for the read_multiple_files tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for reading several files at once")]
pub struct ReadMultipleFilesArgs {
    /// Files to read
    #[validate(length(min = 1, message = "At least one path is required"))]
    #[schemars(description = "Paths of the files to read")]
    pub paths: Vec<String>,
}

/// Arguments for the write_file tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for creating or overwriting a file")]
pub struct WriteFileArgs {
    /// File to write
    #[validate(length(min = 1, message = "Path cannot be empty"))]
    #[schemars(description = "Path of the file to write")]
    pub path: String,
    /// New file content
    #[schemars(description = "Complete content of the file")]
    pub content: String,
}

/// Arguments for the create_directory tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for creating a directory")]
pub struct CreateDirectoryArgs {
    /// Directory to create, parents included
    #[validate(length(min = 1, message = "Path cannot be empty"))]
    #[schemars(description = "Path of the directory to create")]
    pub path: String,
}

/// Arguments for the list_directory tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for listing a directory")]
pub struct ListDirectoryArgs {
    /// Directory to list
    #[validate(length(min = 1, message = "Path cannot be empty"))]
    #[schemars(description = "Path of the directory to list")]
    pub path: String,
}

/// Arguments for the move_file tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for moving or renaming a file or directory")]
pub struct MoveFileArgs {
    /// Current location
    #[validate(length(min = 1, message = "Source cannot be empty"))]
    #[schemars(description = "Path to move from")]
    pub source: String,
    /// New location, must not exist
    #[validate(length(min = 1, message = "Destination cannot be empty"))]
    #[schemars(description = "Path to move to; fails if it already exists")]
    pub destination: String,
}

/// Arguments for the get_file_info tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for retrieving file metadata")]
pub struct GetFileInfoArgs {
    /// File or directory to inspect
    #[validate(length(min = 1, message = "Path cannot be empty"))]
    #[schemars(description = "Path of the file or directory")]
    pub path: String,
}

/// Arguments for the search_files tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for recursively searching for files")]
pub struct SearchFilesArgs {
    /// Directory to search under
    #[validate(length(min = 1, message = "Path cannot be empty"))]
    #[schemars(description = "Directory to start the search from")]
    pub path: String,
    /// Glob matched against paths relative to `path`
    #[validate(length(min = 1, message = "Pattern cannot be empty"))]
    #[schemars(description = "Glob pattern such as '*.rs' or '**/test_*'")]
    pub pattern: String,
    /// Globs whose matches are skipped
    #[serde(default, rename = "excludePatterns")]
    #[schemars(description = "Glob patterns to exclude")]
    pub exclude_patterns: Vec<String>,
}

impl ReadTextFileArgs {
    /// `head` and `tail` cannot be combined
    pub fn validate_line_limits(&self) -> Result<(), String> {
        if self.head.is_some() && self.tail.is_some() {
            return Err("Cannot specify both head and tail parameters simultaneously".to_string());
        }
        Ok(())
    }
}
