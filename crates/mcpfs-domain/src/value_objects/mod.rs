//! Value objects
//!
//! Immutable types with validation at construction time.

pub mod allowed_directory;
pub mod transport_kind;

pub use allowed_directory::{AllowedDirectories, AllowedDirectory};
pub use transport_kind::TransportKind;
