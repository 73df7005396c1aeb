//! Search Files Tool Handler
//!
//! Walks the tree under a validated root and matches each entry's path,
//! relative to that root, against a glob. Excluded subtrees are pruned
//! rather than walked and filtered.

use globset::{Glob, GlobSet, GlobSetBuilder};
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use mcpfs_domain::error::{Error, Result};

use super::validate_args;
use crate::args::SearchFilesArgs;
use crate::formatter::ResponseFormatter;
use crate::security::PathGuard;

/// Handler for recursive glob search
pub struct SearchFilesHandler {
    guard: Arc<PathGuard>,
}

impl SearchFilesHandler {
    /// Create a new search_files handler
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self { guard }
    }

    /// Handle the search_files tool request
    pub async fn handle(
        &self,
        Parameters(args): Parameters<SearchFilesArgs>,
    ) -> std::result::Result<CallToolResult, McpError> {
        validate_args(&args)?;

        let pattern = Glob::new(&args.pattern)
            .map_err(|e| McpError::invalid_params(format!("Invalid pattern: {}", e), None))?
            .compile_matcher();
        let excludes = build_exclude_set(&args.exclude_patterns)
            .map_err(|e| McpError::invalid_params(format!("Invalid exclude pattern: {}", e), None))?;

        let root = match self.guard.validate_path(&args.path).await {
            Ok(root) => root,
            Err(e) => return Ok(ResponseFormatter::tool_error(e)),
        };

        let search = tokio::task::spawn_blocking(move || search(&root, &pattern, &excludes)).await;
        match search {
            Ok(Ok(matches)) => Ok(ResponseFormatter::format_search_results(&matches)),
            Ok(Err(e)) => Ok(ResponseFormatter::tool_error(e)),
            Err(e) => Err(McpError::internal_error(
                format!("Search task failed: {}", e),
                None,
            )),
        }
    }
}

fn build_exclude_set(patterns: &[String]) -> std::result::Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Paths under `root` whose relative path matches `pattern`
pub fn search(root: &Path, pattern: &globset::GlobMatcher, excludes: &GlobSet) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(Error::invalid_argument(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut matches = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !excludes.is_match(relative(root, entry.path())));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        let rel = relative(root, entry.path());
        let name_matches = entry
            .path()
            .file_name()
            .is_some_and(|name| pattern.is_match(Path::new(name)));
        if pattern.is_match(&rel) || name_matches {
            matches.push(entry.path().display().to_string());
        }
    }
    Ok(matches)
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
