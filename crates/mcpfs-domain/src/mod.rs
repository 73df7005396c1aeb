//! # mcpfs Domain Layer
//!
//! Core types shared by every layer of the remote filesystem server:
//! the error taxonomy, the allowed-directory value objects and the
//! transport selection enum.
//!
//! This crate has no I/O. Resolving directories against the real
//! filesystem happens in `mcpfs-infrastructure`.

pub mod constants;
pub mod error;
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::{AllowedDirectories, AllowedDirectory, TransportKind};
