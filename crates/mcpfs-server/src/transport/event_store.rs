//! Event store for resumable streams
//!
//! Every event written to a streamable HTTP SSE stream is recorded here
//! under `<stream id>_<counter>`. A client reconnecting with
//! `Last-Event-ID` gets the events of the same stream that came after that
//! id. The log is bounded: once it holds `capacity` events the oldest is
//! evicted, after which its id is no longer a valid resumption point.

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::TransportError;

/// One stored event
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    /// Event id sent as the SSE `id:` field
    pub event_id: String,
    /// JSON-RPC message carried by the event
    pub message: Value,
}

/// Result of [`EventStore::replay_events_after`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayedEvents {
    /// Stream the resumption id belongs to
    pub stream_id: String,
    /// Events after the resumption id, oldest first
    pub events: Vec<StoredEvent>,
}

/// Storage for resumable stream events
pub trait EventStore: Send + Sync {
    /// Record `message` on `stream_id`, returning the new event id
    fn store_event(&self, stream_id: &str, message: Value) -> String;

    /// Events of the same stream stored after `last_event_id`
    fn replay_events_after(&self, last_event_id: &str) -> Result<ReplayedEvents, TransportError>;
}

#[derive(Debug)]
struct Entry {
    stream_id: String,
    event: StoredEvent,
}

#[derive(Debug, Default)]
struct EventLog {
    entries: VecDeque<Entry>,
    counter: u64,
}

/// Bounded in-memory [`EventStore`]
#[derive(Debug)]
pub struct InMemoryEventStore {
    capacity: usize,
    log: Mutex<EventLog>,
}

impl InMemoryEventStore {
    /// Create a store retaining at most `capacity` events (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            log: Mutex::new(EventLog::default()),
        }
    }

    /// Maximum number of retained events
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    /// Whether nothing is retained
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventStore for InMemoryEventStore {
    fn store_event(&self, stream_id: &str, message: Value) -> String {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.counter += 1;
        let event_id = format!("{}_{}", stream_id, log.counter);

        while log.entries.len() >= self.capacity {
            log.entries.pop_front();
        }
        log.entries.push_back(Entry {
            stream_id: stream_id.to_string(),
            event: StoredEvent {
                event_id: event_id.clone(),
                message,
            },
        });
        event_id
    }

    fn replay_events_after(&self, last_event_id: &str) -> Result<ReplayedEvents, TransportError> {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        let position = log
            .entries
            .iter()
            .position(|entry| entry.event.event_id == last_event_id)
            .ok_or_else(|| TransportError::InvalidLastEventId {
                event_id: last_event_id.to_string(),
            })?;

        let stream_id = log.entries[position].stream_id.clone();
        let events = log
            .entries
            .iter()
            .skip(position + 1)
            .filter(|entry| entry.stream_id == stream_id)
            .map(|entry| entry.event.clone())
            .collect();

        Ok(ReplayedEvents { stream_id, events })
    }
}
