//! Path guard
//!
//! Every path a tool touches goes through [`PathGuard::validate_path`].
//! The effective allow-list is the startup set, or the session's client
//! roots when the startup set was empty and the client provided roots.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use mcpfs_domain::AllowedDirectories;
use mcpfs_domain::error::{Error, Result};
use mcpfs_infrastructure::directories::{absolutize, expand_home, normalize_lexically};

/// Per-session allow-list enforcement
#[derive(Debug)]
pub struct PathGuard {
    startup: Arc<AllowedDirectories>,
    session_roots: RwLock<Option<Arc<AllowedDirectories>>>,
}

impl PathGuard {
    /// Create a guard over the directories resolved at startup
    pub fn new(startup: Arc<AllowedDirectories>) -> Self {
        Self {
            startup,
            session_roots: RwLock::new(None),
        }
    }

    /// Directories resolved at startup
    pub fn startup_directories(&self) -> &AllowedDirectories {
        &self.startup
    }

    /// The allow-list currently in force for this session
    pub fn effective(&self) -> Arc<AllowedDirectories> {
        self.session_roots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.startup))
    }

    /// Replace this session's roots
    pub fn set_session_roots(&self, roots: AllowedDirectories) {
        *self
            .session_roots
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(roots));
    }

    /// Drop this session's roots, falling back to the startup set
    pub fn clear_session_roots(&self) {
        *self
            .session_roots
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Resolve `requested` and require it to lie inside the allow-list
    ///
    /// Existing paths are canonicalised and re-checked so a symlink cannot
    /// point outside. For a path that does not exist yet the parent is
    /// canonicalised and checked instead.
    pub async fn validate_path(&self, requested: &str) -> Result<PathBuf> {
        let allowed = self.effective();
        if allowed.is_empty() {
            return Err(Error::access_denied(format!(
                "no allowed directories configured, cannot access {}. \
                 Pass directories at startup or provide roots through the MCP roots protocol",
                requested
            )));
        }

        let absolute = normalize_lexically(&absolutize(Path::new(&expand_home(requested)))?);
        if !allowed.permits(&absolute) {
            return Err(outside(&absolute, &allowed));
        }

        match tokio::fs::canonicalize(&absolute).await {
            Ok(real) => {
                if allowed.permits(&real) {
                    Ok(real)
                } else {
                    Err(Error::access_denied(format!(
                        "symlink target outside allowed directories: {} -> {}",
                        absolute.display(),
                        real.display()
                    )))
                }
            }
            Err(_) => {
                let parent = absolute.parent().ok_or_else(|| outside(&absolute, &allowed))?;
                let real_parent = tokio::fs::canonicalize(parent).await.map_err(|_| {
                    Error::not_found(format!("parent directory does not exist: {}", parent.display()))
                })?;
                if allowed.permits(&real_parent) {
                    Ok(absolute)
                } else {
                    Err(Error::access_denied(format!(
                        "parent directory outside allowed directories: {}",
                        real_parent.display()
                    )))
                }
            }
        }
    }
}

fn outside(path: &Path, allowed: &AllowedDirectories) -> Error {
    Error::access_denied(format!(
        "path outside allowed directories: {} not in {}",
        path.display(),
        allowed
    ))
}
