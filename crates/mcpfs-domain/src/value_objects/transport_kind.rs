//! Transport selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{TRANSPORT_SSE, TRANSPORT_STREAMABLE_HTTP};
use crate::error::Error;

/// Wire transport carrying MCP messages, fixed for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransportKind {
    /// Long-lived event stream plus a side-channel POST endpoint
    #[serde(rename = "sse")]
    Sse,
    /// Unified POST/GET/DELETE endpoint with session headers
    #[default]
    #[serde(rename = "streamableHttp")]
    StreamableHttp,
}

impl TransportKind {
    /// Every selectable transport
    pub const ALL: [TransportKind; 2] = [TransportKind::Sse, TransportKind::StreamableHttp];

    /// Name used on the command line and in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sse => TRANSPORT_SSE,
            Self::StreamableHttp => TRANSPORT_STREAMABLE_HTTP,
        }
    }

    /// Whether `name` is one of the transport keywords
    pub fn is_keyword(name: &str) -> bool {
        Self::ALL.iter().any(|kind| kind.as_str() == name)
    }

    /// Human-readable list of choices, marking the default
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(|kind| {
                if *kind == Self::default() {
                    format!("{} (default)", kind.as_str())
                } else {
                    kind.as_str().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownTransport {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}
