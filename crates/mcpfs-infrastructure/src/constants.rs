//! Infrastructure layer constants
//!
//! Domain-specific constants are defined in `mcpfs_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "mcpfs.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "mcpfs";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "MCPFS";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "MCPFS_CONFIG";

/// Plain environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";

// ============================================================================
// HTTP SERVER CONSTANTS
// ============================================================================

/// Default listening host
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default listening port for either binding
pub const DEFAULT_SERVER_PORT: u16 = 3002;

/// Default request body limit (4 MiB)
pub const DEFAULT_MAX_BODY_BYTES: u64 = 4 * 1024 * 1024;

/// Smallest accepted request body limit
pub const MIN_MAX_BODY_BYTES: u64 = 1024;

// ============================================================================
// SESSION CONSTANTS
// ============================================================================

/// Default number of events retained for Last-Event-ID replay
pub const DEFAULT_EVENT_STORE_CAPACITY: usize = 1000;

/// Default SSE keep-alive interval in seconds
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 15;

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding a tracing filter directive
pub const LOG_FILTER_ENV: &str = "MCPFS_LOG";
