//! Session Management
//!
//! One [`SessionTable`] per binding maps session identifiers to live
//! transports. Each transport owns its own protocol-server instance, so
//! sessions never share protocol state.
//!
//! Entries are inserted only after a successful handshake and removed on
//! transport close, explicit termination, or shutdown via
//! [`SessionTable::close_all`].

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::transport::TransportError;

/// Session table errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// No transport is registered under this id
    #[error("Session not found: {session_id}")]
    SessionNotFound {
        /// The id that was looked up
        session_id: String,
    },

    /// An entry with this id already exists
    #[error("Duplicate session: {session_id}")]
    DuplicateSession {
        /// The id that was already registered
        session_id: String,
    },

    /// The transport has no id to register under (not yet initialised)
    #[error("Session is closed or has no identifier")]
    SessionClosed,
}

/// A live transport registered in a [`SessionTable`]
#[async_trait]
pub trait SessionTransport: Send + Sync + 'static {
    /// Identifier, once the transport has been assigned one
    fn session_id(&self) -> Option<String>;

    /// Close the transport
    ///
    /// Calling it a second time returns [`TransportError::AlreadyClosed`].
    async fn close(&self) -> Result<(), TransportError>;
}

/// Outcome of [`SessionTable::close_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Transports that closed cleanly
    pub closed: usize,
    /// Transports whose close failed (still removed)
    pub failed: usize,
}

/// Concurrent mapping from session id to live transport
pub struct SessionTable<T: SessionTransport> {
    sessions: DashMap<String, Arc<T>>,
}

impl<T: SessionTransport> Default for SessionTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SessionTransport> SessionTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a transport under `session_id`
    ///
    /// Fails without touching the existing entry if the id is taken.
    pub fn insert(&self, session_id: &str, transport: Arc<T>) -> Result<(), SessionError> {
        match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(_) => Err(SessionError::DuplicateSession {
                session_id: session_id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(transport);
                Ok(())
            }
        }
    }

    /// Look up a transport
    pub fn get(&self, session_id: &str) -> Option<Arc<T>> {
        self.sessions.get(session_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up a transport, failing with [`SessionError::SessionNotFound`]
    pub fn require(&self, session_id: &str) -> Result<Arc<T>, SessionError> {
        self.get(session_id).ok_or_else(|| SessionError::SessionNotFound {
            session_id: session_id.to_string(),
        })
    }

    /// Remove a transport
    pub fn remove(&self, session_id: &str) -> Option<Arc<T>> {
        self.sessions.remove(session_id).map(|(_, transport)| transport)
    }

    /// Whether a session is registered
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of the registered ids
    pub fn ids(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Close and remove every session
    ///
    /// Each transport is removed whether or not its close failed. Failures
    /// are logged and counted; they never stop the sweep.
    pub async fn close_all(&self) -> ShutdownReport {
        let snapshot: Vec<(String, Arc<T>)> = self
            .sessions
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut report = ShutdownReport::default();
        for (session_id, transport) in snapshot {
            info!("Closing transport for session {}", session_id);
            match transport.close().await {
                Ok(()) => report.closed += 1,
                Err(e) => {
                    error!(
                        session_id = %session_id,
                        error = %e,
                        "Error closing transport for session"
                    );
                    report.failed += 1;
                }
            }
            self.sessions.remove(&session_id);
        }
        report
    }
}
