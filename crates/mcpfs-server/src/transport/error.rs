//! Transport errors

use thiserror::Error;

/// Failure of a transport operation
#[derive(Error, Debug)]
pub enum TransportError {
    /// `close()` was called on a transport that is already closed
    #[error("Transport already closed")]
    AlreadyClosed,

    /// A second standalone stream was requested for one session
    #[error("Conflict: Only one SSE stream is allowed per session")]
    Conflict,

    /// `Last-Event-ID` does not name a retained event
    #[error("Invalid Last-Event-ID: {event_id}")]
    InvalidLastEventId {
        /// The id the client sent
        event_id: String,
    },

    /// The peer side of the outbound channel is gone
    #[error("Outbound channel closed for session {session_id}")]
    ChannelClosed {
        /// Session whose stream ended
        session_id: String,
    },

    /// A message could not be serialized
    #[error("Serialization error: {source}")]
    Serialization {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },
}
