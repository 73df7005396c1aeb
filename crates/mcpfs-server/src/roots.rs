//! Client roots
//!
//! Converts the `roots` array of a `roots/list` response into an allow-list.
//! Roots that do not resolve to an existing directory are dropped.

use serde_json::Value;
use tracing::warn;
use url::Url;

use mcpfs_domain::{AllowedDirectories, AllowedDirectory};
use mcpfs_infrastructure::directories::resolve_path;

/// Turn a root URI into a filesystem path
///
/// `file:` URIs are percent-decoded; plain paths are accepted as they are.
/// Returns `None` for a `file:` URI that names no local path.
pub fn parse_root_uri(uri: &str) -> Option<String> {
    if !uri.starts_with("file:") {
        return Some(uri.to_string());
    }
    let path = Url::parse(uri).ok()?.to_file_path().ok()?;
    Some(path.to_string_lossy().into_owned())
}

/// Resolve and validate the roots a client reported
pub async fn resolve_roots(roots: &[Value]) -> AllowedDirectories {
    let mut entries = Vec::with_capacity(roots.len());
    for root in roots {
        let Some(uri) = root.get("uri").and_then(Value::as_str) else {
            warn!(root = %root, "Skipping root without uri");
            continue;
        };
        let Some(raw) = parse_root_uri(uri) else {
            warn!(uri, "Skipping root that is not a local file URI");
            continue;
        };
        let resolved = match resolve_path(&raw).await {
            Ok(path) => path,
            Err(e) => {
                warn!(uri, error = %e, "Skipping unresolvable root");
                continue;
            }
        };
        match tokio::fs::metadata(&resolved).await {
            Ok(meta) if meta.is_dir() => match AllowedDirectory::new(resolved) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(uri, error = %e, "Skipping invalid root"),
            },
            _ => warn!(uri, "Skipping root that is not an accessible directory"),
        }
    }
    AllowedDirectories::from_entries(entries)
}
