//! Server configuration types

use crate::constants::*;
use mcpfs_domain::{Result, TransportKind};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on (`PORT` overrides)
    pub port: u16,

    /// Transport used when the command line names none
    pub transport: String,

    /// Largest accepted request body in bytes
    pub max_body_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            transport: TransportKind::default().to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Parse the configured transport name
    pub fn transport_kind(&self) -> Result<TransportKind> {
        self.transport.parse()
    }

    /// Bind address, falling back to loopback when the host does not parse
    pub fn bind_address(&self) -> IpAddr {
        self.host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}
