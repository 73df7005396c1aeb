//! Response formatting for filesystem tools
//!
//! Turns tool outcomes into [`CallToolResult`] values. Failures become
//! results with `isError: true` rather than JSON-RPC errors, so the client
//! model can read and react to them.

use std::fmt::Display;
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use rmcp::model::{CallToolResult, Content};

use mcpfs_domain::AllowedDirectories;

/// Response formatter for filesystem tools
pub struct ResponseFormatter;

/// Kind of a directory entry in a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory
    Directory,
    /// Anything that is not a directory
    File,
}

impl ResponseFormatter {
    /// Plain successful text result
    pub fn text(text: impl Into<String>) -> CallToolResult {
        CallToolResult::success(vec![Content::text(text.into())])
    }

    /// Tool-level failure
    pub fn tool_error(error: impl Display) -> CallToolResult {
        CallToolResult::error(vec![Content::text(format!("Error: {}", error))])
    }

    /// Render the allowed directory list
    pub fn format_allowed_directories(directories: &AllowedDirectories) -> CallToolResult {
        if directories.is_empty() {
            return Self::text(
                "No allowed directories configured. \
                 Directories can be provided by the client through the MCP roots protocol.",
            );
        }
        let lines: Vec<String> = directories.iter().map(ToString::to_string).collect();
        Self::text(format!("Allowed directories:\n{}", lines.join("\n")))
    }

    /// Render a directory listing, sorted by name
    pub fn format_listing(mut entries: Vec<(String, EntryKind)>) -> CallToolResult {
        if entries.is_empty() {
            return Self::text("Directory is empty");
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let lines: Vec<String> = entries
            .into_iter()
            .map(|(name, kind)| match kind {
                EntryKind::Directory => format!("[DIR] {}", name),
                EntryKind::File => format!("[FILE] {}", name),
            })
            .collect();
        Self::text(lines.join("\n"))
    }

    /// Render file metadata as `key: value` lines
    pub fn format_file_info(path: &Path, metadata: &Metadata) -> CallToolResult {
        let lines = [
            format!("path: {}", path.display()),
            format!("size: {}", metadata.len()),
            format!("created: {}", format_time(metadata.created().ok())),
            format!("modified: {}", format_time(metadata.modified().ok())),
            format!("accessed: {}", format_time(metadata.accessed().ok())),
            format!("isDirectory: {}", metadata.is_dir()),
            format!("isFile: {}", metadata.is_file()),
            format!("permissions: {}", format_permissions(metadata)),
        ];
        Self::text(lines.join("\n"))
    }

    /// Render search hits, one absolute path per line
    pub fn format_search_results(matches: &[String]) -> CallToolResult {
        if matches.is_empty() {
            return Self::text("No matches found");
        }
        Self::text(matches.join("\n"))
    }
}

fn format_time(time: Option<SystemTime>) -> String {
    time.map_or_else(
        || "unavailable".to_string(),
        |t| DateTime::<Utc>::from(t).to_rfc3339(),
    )
}

#[cfg(unix)]
fn format_permissions(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn format_permissions(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        "read-only".to_string()
    } else {
        "read-write".to_string()
    }
}
