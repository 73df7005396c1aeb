//! Allowed directory value objects
//!
//! An [`AllowedDirectory`] is a filesystem root the server may expose.
//! Canonicalisation against the real filesystem is done by the directory
//! resolver in the infrastructure layer; this type only guarantees the
//! path is absolute and free of `.`/`..` components.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::ALLOWED_DIRECTORIES_SEPARATOR;
use crate::error::{Error, Result};

/// A single canonical filesystem root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllowedDirectory {
    path: PathBuf,
}

impl AllowedDirectory {
    /// Wrap an absolute, normalised path
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(Error::invalid_argument(format!(
                "allowed directory must be absolute: {}",
                path.display()
            )));
        }
        // `components()` hides interior `.` segments, so scan the raw text
        if path
            .as_os_str()
            .to_string_lossy()
            .split(std::path::is_separator)
            .any(|segment| segment == "." || segment == "..")
        {
            return Err(Error::invalid_argument(format!(
                "allowed directory must be normalised: {}",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// The underlying path
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Whether `candidate` is this directory or lies beneath it.
    ///
    /// Comparison is component-wise, so `/data/ab` is not inside `/data/a`.
    pub fn contains(&self, candidate: &Path) -> bool {
        candidate.starts_with(&self.path)
    }
}

impl fmt::Display for AllowedDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl AsRef<Path> for AllowedDirectory {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Ordered, de-duplicated set of allowed directories
///
/// May be empty: the protocol server then relies on roots negotiation
/// with the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedDirectories {
    entries: Vec<AllowedDirectory>,
}

impl AllowedDirectories {
    /// Empty set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from resolved entries, keeping the first occurrence of duplicates
    pub fn from_entries(entries: impl IntoIterator<Item = AllowedDirectory>) -> Self {
        let mut unique: Vec<AllowedDirectory> = Vec::new();
        for entry in entries {
            if !unique.contains(&entry) {
                unique.push(entry);
            }
        }
        Self { entries: unique }
    }

    /// Number of directories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no directories were configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &AllowedDirectory> {
        self.entries.iter()
    }

    /// Whether any directory contains `candidate`
    pub fn permits(&self, candidate: &Path) -> bool {
        self.entries.iter().any(|dir| dir.contains(candidate))
    }

    /// Split a colon-joined value into raw path strings.
    ///
    /// Empty segments are dropped; the result still has to go through the
    /// directory resolver.
    pub fn split_env_value(value: &str) -> Vec<String> {
        value
            .split(ALLOWED_DIRECTORIES_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

impl fmt::Display for AllowedDirectories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

impl<'a> IntoIterator for &'a AllowedDirectories {
    type Item = &'a AllowedDirectory;
    type IntoIter = std::slice::Iter<'a, AllowedDirectory>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
