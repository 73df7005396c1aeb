//! Application configuration root

use serde::{Deserialize, Serialize};

use super::{LoggingConfig, ServerConfig, SessionConfig};

/// Root of the configuration tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener and transport selection
    pub server: ServerConfig,

    /// Per-session transport behaviour
    pub session: SessionConfig,

    /// Logging output
    pub logging: LoggingConfig,
}
