//! Session configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-session transport behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Events retained per session for Last-Event-ID replay
    pub event_store_capacity: usize,

    /// Answer streamable HTTP POSTs with JSON bodies instead of SSE streams
    pub json_response: bool,

    /// SSE keep-alive interval in seconds (0 disables)
    pub keep_alive_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_store_capacity: DEFAULT_EVENT_STORE_CAPACITY,
            json_response: false,
            keep_alive_secs: DEFAULT_KEEP_ALIVE_SECS,
        }
    }
}

impl SessionConfig {
    /// Keep-alive interval, `None` when disabled
    pub fn keep_alive(&self) -> Option<Duration> {
        (self.keep_alive_secs > 0).then(|| Duration::from_secs(self.keep_alive_secs))
    }
}
