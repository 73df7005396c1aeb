//! Allowed directory resolution
//!
//! Turns raw command-line paths into canonical [`AllowedDirectories`].
//! Each input has `~` expanded, is made absolute against the working
//! directory, lexically normalised, and then canonicalised. When
//! canonicalisation fails the normalised absolute path is kept instead, so
//! symlinks are only resolved for paths that exist at startup.
//!
//! Every resolved candidate must then be an existing directory. The first
//! one that is not aborts the whole resolution: a partial set is never
//! returned.

use std::path::{Component, Path, PathBuf};

use mcpfs_domain::error::{Error, Result};
use mcpfs_domain::{AllowedDirectories, AllowedDirectory};
use tracing::{debug, info, warn};

use crate::error_ext::ErrorContext;

/// Resolve and validate the allowed directories given at launch
///
/// An empty input yields an empty set; that is not an error.
pub async fn resolve_allowed_directories(raw: &[String]) -> Result<AllowedDirectories> {
    if raw.is_empty() {
        return Ok(AllowedDirectories::empty());
    }

    info!(
        "Processing {} allowed director{}...",
        raw.len(),
        if raw.len() == 1 { "y" } else { "ies" }
    );

    let mut resolved = Vec::with_capacity(raw.len());
    for input in raw {
        resolved.push(resolve_path(input).await?);
    }

    let mut entries = Vec::with_capacity(resolved.len());
    for path in resolved {
        validate_directory(&path).await?;
        let entry = AllowedDirectory::new(path.clone())
            .map_err(|e| Error::directory_validation(path.display().to_string(), e.to_string()))?;
        entries.push(entry);
    }

    let directories = AllowedDirectories::from_entries(entries);
    info!("Validated allowed directories: {}", directories);
    Ok(directories)
}

/// Expand, absolutise, normalise and canonicalise one path
///
/// Falls back to the normalised absolute path when the target cannot be
/// canonicalised (typically because it does not exist yet).
pub async fn resolve_path(raw: &str) -> Result<PathBuf> {
    let absolute = normalize_lexically(&absolutize(Path::new(&expand_home(raw)))?);
    match tokio::fs::canonicalize(&absolute).await {
        Ok(real) => {
            debug!(input = raw, resolved = %real.display(), "Resolved directory");
            Ok(real)
        }
        Err(e) => {
            warn!(
                input = raw,
                path = %absolute.display(),
                error = %e,
                "Could not resolve symlinks, using normalised path"
            );
            Ok(absolute)
        }
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(raw: &str) -> String {
    shellexpand::tilde(raw).into_owned()
}

/// Make `path` absolute against the current working directory
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().io_context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

/// Remove `.` and resolve `..` components without touching the filesystem
///
/// `..` never climbs above the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    normalized.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_)) | None
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

async fn validate_directory(path: &Path) -> Result<()> {
    let display = path.display().to_string();
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::directory_validation(display, "not a directory")),
        Err(e) => Err(Error::directory_validation(
            display,
            format!("cannot access directory: {}", e),
        )),
    }
}
