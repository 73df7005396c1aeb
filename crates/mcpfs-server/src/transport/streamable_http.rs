//! Streamable HTTP Binding
//!
//! A single `/mcp` endpoint:
//!
//! | Method | Header `mcp-session-id` | Effect |
//! |--------|-------------------------|--------|
//! | POST | absent | new transport; registered once `initialize` is processed |
//! | POST | known | messages routed to that session |
//! | GET | known | standalone server-to-client stream (one per session) |
//! | DELETE | known | session terminated |
//!
//! Any other combination answers 400 with a structured JSON-RPC error.
//!
//! Registration is two-step: the route builds the transport, and the
//! transport inserts itself into the table through its
//! `on_session_initialized` hook once it has assigned a session id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use rocket::data::Data;
use rocket::http::Status;
use rocket::response::stream::{Event, EventStream};
use rocket::{Build, Rocket, State, catchers, delete, get, post, routes};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use mcpfs_domain::AllowedDirectories;
use mcpfs_infrastructure::config::AppConfig;

use super::cors::{Cors, preflight};
use super::event_store::{EventStore, InMemoryEventStore, StoredEvent};
use super::headers::McpHeaders;
use super::reply::McpReply;
use super::shutdown::launch_with_shutdown;
use super::types::{JsonRpcPayload, McpResponse};
use super::{BindingSettings, TransportError, internal_error, read_payload, rocket_figment};
use crate::constants::{
    JSONRPC_INTERNAL_ERROR, JSONRPC_INVALID_REQUEST, JSONRPC_SERVER_ERROR, STANDALONE_STREAM_ID,
};
use crate::mcp_server::{FilesystemServer, PeerSink};
use crate::session::{SessionError, SessionTable, SessionTransport};

/// Hook run when the transport assigns its session id
pub type SessionInitializedHook =
    Box<dyn Fn(Arc<StreamableHttpTransport>) -> Result<(), SessionError> + Send + Sync>;

/// Hook run once when the transport closes
pub type CloseHook = Box<dyn Fn(&str) + Send + Sync>;

/// Construction options for [`StreamableHttpTransport`]
pub struct StreamableHttpOptions {
    /// Produces the session id at `initialize`
    pub session_id_generator: Box<dyn Fn() -> String + Send + Sync>,
    /// Where streamed events are recorded for resumption
    pub event_store: Arc<dyn EventStore>,
    /// Answer POSTs with JSON bodies instead of SSE streams
    pub json_response: bool,
    /// Keep-alive interval of the standalone stream
    pub keep_alive: Option<Duration>,
    /// Registration hook
    pub on_session_initialized: Option<SessionInitializedHook>,
    /// Close hook
    pub on_close: Option<CloseHook>,
}

impl Default for StreamableHttpOptions {
    fn default() -> Self {
        Self {
            session_id_generator: Box::new(|| Uuid::new_v4().to_string()),
            event_store: Arc::new(InMemoryEventStore::new(
                BindingSettings::default().event_store_capacity,
            )),
            json_response: false,
            keep_alive: None,
            on_session_initialized: None,
            on_close: None,
        }
    }
}

/// One streamable HTTP session
pub struct StreamableHttpTransport {
    server: Arc<FilesystemServer>,
    options: StreamableHttpOptions,
    session_id: OnceLock<String>,
    dispatch: tokio::sync::Mutex<()>,
    standalone: Mutex<Option<mpsc::UnboundedSender<StoredEvent>>>,
    cancel: CancellationToken,
    closed: AtomicBool,
}

/// Server-initiated messages go to the standalone stream
struct StandaloneSink {
    transport: Weak<StreamableHttpTransport>,
}

impl PeerSink for StandaloneSink {
    fn send(&self, message: Value) -> Result<(), TransportError> {
        match self.transport.upgrade() {
            Some(transport) => transport.send_standalone(message),
            None => Err(TransportError::AlreadyClosed),
        }
    }
}

impl StreamableHttpTransport {
    /// Create a transport and connect `server` to it
    pub fn new(server: Arc<FilesystemServer>, options: StreamableHttpOptions) -> Arc<Self> {
        Arc::new_cyclic(|me| {
            server.connect(Arc::new(StandaloneSink {
                transport: me.clone(),
            }));
            Self {
                server,
                options,
                session_id: OnceLock::new(),
                dispatch: tokio::sync::Mutex::new(()),
                standalone: Mutex::new(None),
                cancel: CancellationToken::new(),
                closed: AtomicBool::new(false),
            }
        })
    }

    /// Whether `initialize` has been processed
    pub fn is_initialized(&self) -> bool {
        self.session_id.get().is_some()
    }

    /// Whether the transport has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The protocol server owned by this session
    pub fn server(&self) -> &Arc<FilesystemServer> {
        &self.server
    }

    fn reply_headers(&self, reply: McpReply) -> McpReply {
        reply
            .with_session_id(self.session_id.get().cloned())
            .with_protocol_version(self.server.negotiated_protocol_version())
    }

    /// Record a server-initiated message and forward it to the standalone
    /// stream if one is open
    pub fn send_standalone(&self, message: Value) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::AlreadyClosed);
        }
        let event_id = self
            .options
            .event_store
            .store_event(STANDALONE_STREAM_ID, message.clone());

        let slot = self.standalone.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = slot.as_ref() {
            if sender.send(StoredEvent { event_id, message }).is_err() {
                debug!("Standalone stream disconnected; event kept for replay");
            }
        }
        Ok(())
    }

    /// Handle a POST body
    pub async fn handle_post(
        self: &Arc<Self>,
        headers: &McpHeaders,
        payload: JsonRpcPayload,
    ) -> McpReply {
        let first_id = payload.first_id();
        if self.is_closed() {
            return McpReply::no_valid_session(first_id);
        }
        if payload.messages().is_empty() {
            return McpReply::error(
                Status::BadRequest,
                JSONRPC_INVALID_REQUEST,
                "Invalid Request: empty batch",
                None,
            );
        }

        if payload.contains_initialize() {
            if let Err(reply) = self.initialize(&payload) {
                return reply;
            }
        } else if !self.is_initialized() {
            return McpReply::error(
                Status::BadRequest,
                JSONRPC_SERVER_ERROR,
                "Bad Request: Server not initialized",
                first_id,
            );
        }

        let is_batch = payload.is_batch();
        let expects_response = payload.expects_response();
        let responses = {
            let _order = self.dispatch.lock().await;
            let mut responses = Vec::new();
            for message in payload.into_messages() {
                if let Some(response) = self.server.handle_message(message).await {
                    responses.push(response);
                }
            }
            responses
        };

        if !expects_response {
            return self.reply_headers(McpReply::empty(Status::Accepted));
        }

        if self.options.json_response || !headers.accepts_event_stream {
            let body = match responses.as_slice() {
                [single] if !is_batch => single.to_value(),
                all => Value::Array(all.iter().map(McpResponse::to_value).collect()),
            };
            return self.reply_headers(McpReply::json(Status::Ok, body));
        }

        let stream_id = Uuid::new_v4().to_string();
        let events: Vec<Event> = responses
            .iter()
            .map(|response| {
                let message = response.to_value();
                let event_id = self.options.event_store.store_event(&stream_id, message.clone());
                to_event(StoredEvent { event_id, message })
            })
            .collect();
        let stream: BoxStream<'static, Event> = Box::pin(futures::stream::iter(events));
        self.reply_headers(McpReply::stream(EventStream::from(stream)))
    }

    fn initialize(self: &Arc<Self>, payload: &JsonRpcPayload) -> Result<(), McpReply> {
        let already = || {
            McpReply::error(
                Status::BadRequest,
                JSONRPC_INVALID_REQUEST,
                "Invalid Request: Server already initialized",
                payload.first_id(),
            )
        };
        if self.is_initialized() {
            return Err(already());
        }
        if payload.messages().len() > 1 {
            return Err(McpReply::error(
                Status::BadRequest,
                JSONRPC_INVALID_REQUEST,
                "Invalid Request: Only one initialization request is allowed",
                payload.first_id(),
            ));
        }

        let session_id = (self.options.session_id_generator)();
        if self.session_id.set(session_id.clone()).is_err() {
            return Err(already());
        }
        if let Some(hook) = &self.options.on_session_initialized {
            hook(Arc::clone(self)).map_err(|e| {
                error!(session_id = %session_id, error = %e, "Failed to register session");
                McpReply::internal_error(payload.first_id())
            })?;
        }
        Ok(())
    }

    /// Open the standalone server-to-client stream
    ///
    /// With `last-event-id`, the retained events after that id are sent
    /// first. Resuming a POST response stream only replays it.
    pub fn handle_get(&self, headers: &McpHeaders) -> McpReply {
        if self.is_closed() {
            return McpReply::no_valid_session(None);
        }
        let session_id = self.session_id.get().cloned().unwrap_or_default();

        let mut replayed = Vec::new();
        if let Some(last_event_id) = &headers.last_event_id {
            info!("Client reconnecting with Last-Event-ID: {}", last_event_id);
            match self.options.event_store.replay_events_after(last_event_id) {
                Ok(replay) if replay.stream_id != STANDALONE_STREAM_ID => {
                    let events = replay.events.into_iter().map(to_event).collect::<Vec<_>>();
                    let stream: BoxStream<'static, Event> = Box::pin(futures::stream::iter(events));
                    return self.reply_headers(McpReply::stream(EventStream::from(stream)));
                }
                Ok(replay) => replayed = replay.events,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Rejected stream resumption");
                    return McpReply::error(
                        Status::BadRequest,
                        JSONRPC_SERVER_ERROR,
                        format!("Bad Request: {}", e),
                        None,
                    );
                }
            }
        } else {
            info!("Establishing new SSE stream for session {}", session_id);
        }

        let mut receiver = {
            let mut slot = self.standalone.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.as_ref().is_some_and(|sender| !sender.is_closed()) {
                return McpReply::error(
                    Status::Conflict,
                    JSONRPC_SERVER_ERROR,
                    TransportError::Conflict.to_string(),
                    None,
                );
            }
            let (sender, receiver) = mpsc::unbounded_channel();
            *slot = Some(sender);
            receiver
        };

        let cancel = self.cancel.clone();
        let stream: BoxStream<'static, Event> = Box::pin(async_stream::stream! {
            for event in replayed {
                yield to_event(event);
            }
            loop {
                let next = tokio::select! {
                    () = cancel.cancelled() => None,
                    event = receiver.recv() => event,
                };
                match next {
                    Some(event) => yield to_event(event),
                    None => break,
                }
            }
        });
        self.reply_headers(McpReply::stream(
            EventStream::from(stream).heartbeat(self.options.keep_alive),
        ))
    }

    /// Terminate the session
    pub async fn handle_delete(&self) -> McpReply {
        let session_id = self.session_id.get().cloned();
        info!(
            "Session termination request for {}",
            session_id.as_deref().unwrap_or("<uninitialized>")
        );
        match self.close().await {
            Ok(()) => McpReply::empty(Status::Ok).with_session_id(session_id),
            Err(e) => {
                error!(error = %e, "Error handling session termination");
                McpReply::error(
                    Status::InternalServerError,
                    JSONRPC_INTERNAL_ERROR,
                    "Error handling session termination",
                    None,
                )
            }
        }
    }
}

#[async_trait]
impl SessionTransport for StreamableHttpTransport {
    fn session_id(&self) -> Option<String> {
        self.session_id.get().cloned()
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(TransportError::AlreadyClosed);
        }
        self.cancel.cancel();
        self.standalone
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(session_id) = self.session_id.get() {
            info!(
                "Transport closed for session {}, removing from session table",
                session_id
            );
            if let Some(hook) = &self.options.on_close {
                hook(session_id);
            }
        }
        Ok(())
    }
}

fn to_event(event: StoredEvent) -> Event {
    Event::json(&event.message)
        .event("message")
        .id(event.event_id)
}

/// Shared state of the streamable HTTP binding
pub struct StreamableHttpState {
    /// Live sessions
    pub sessions: Arc<SessionTable<StreamableHttpTransport>>,
    /// Startup allow-list handed to every new protocol server
    pub directories: Arc<AllowedDirectories>,
    /// Binding behaviour
    pub settings: BindingSettings,
}

impl StreamableHttpState {
    /// Create state with an empty session table
    pub fn new(directories: Arc<AllowedDirectories>, settings: BindingSettings) -> Self {
        Self {
            sessions: Arc::new(SessionTable::new()),
            directories,
            settings,
        }
    }

    /// Build an uninitialised transport wired to this binding's table
    pub fn new_transport(&self) -> Arc<StreamableHttpTransport> {
        let server = Arc::new(FilesystemServer::new(Arc::clone(&self.directories)));

        let table = Arc::downgrade(&self.sessions);
        let on_session_initialized: SessionInitializedHook =
            Box::new(move |transport: Arc<StreamableHttpTransport>| {
                let table = table.upgrade().ok_or(SessionError::SessionClosed)?;
                let session_id = transport.session_id().ok_or(SessionError::SessionClosed)?;
                table.insert(&session_id, transport)?;
                info!("Session initialized with ID: {}", session_id);
                Ok(())
            });

        let table = Arc::downgrade(&self.sessions);
        let closing_server = Arc::clone(&server);
        let on_close: CloseHook = Box::new(move |session_id: &str| {
            if let Some(table) = table.upgrade() {
                table.remove(session_id);
            }
            closing_server.cleanup(session_id);
        });

        StreamableHttpTransport::new(
            server,
            StreamableHttpOptions {
                session_id_generator: Box::new(|| Uuid::new_v4().to_string()),
                event_store: Arc::new(InMemoryEventStore::new(self.settings.event_store_capacity)),
                json_response: self.settings.json_response,
                keep_alive: self.settings.keep_alive,
                on_session_initialized: Some(on_session_initialized),
                on_close: Some(on_close),
            },
        )
    }

    fn lookup(&self, headers: &McpHeaders, method: &str) -> Option<Arc<StreamableHttpTransport>> {
        let session_id = headers.session_id.as_deref()?;
        self.sessions
            .require(session_id)
            .map_err(|e| warn!(error = %e, method, "Rejected request for unknown session"))
            .ok()
    }
}

/// Client-to-server messages
#[post("/mcp", data = "<body>")]
async fn handle_post(
    state: &State<StreamableHttpState>,
    headers: McpHeaders,
    body: Data<'_>,
) -> McpReply {
    debug!("MCP POST request");
    let limit = state.settings.max_body_bytes;

    // An unknown session is rejected whatever the body holds; the body is
    // only read to echo the request id
    let transport = if headers.session_id.is_some() {
        match state.lookup(&headers, "POST") {
            Some(transport) => Some(transport),
            None => {
                let id = read_payload(body, limit)
                    .await
                    .ok()
                    .and_then(|payload| payload.first_id());
                return McpReply::no_valid_session(id);
            }
        }
    } else {
        None
    };

    let payload = match read_payload(body, limit).await {
        Ok(payload) => payload,
        Err(reply) => return reply,
    };
    let transport = transport.unwrap_or_else(|| state.new_transport());
    transport.handle_post(&headers, payload).await
}

/// Standalone server-to-client stream
#[get("/mcp")]
fn handle_get(state: &State<StreamableHttpState>, headers: McpHeaders) -> McpReply {
    debug!(session_id = ?headers.session_id, "MCP GET request");
    match state.lookup(&headers, "GET") {
        Some(transport) => transport.handle_get(&headers),
        None => McpReply::no_valid_session(None),
    }
}

/// Session termination
#[delete("/mcp")]
async fn handle_delete(state: &State<StreamableHttpState>, headers: McpHeaders) -> McpReply {
    match state.lookup(&headers, "DELETE") {
        Some(transport) => transport.handle_delete().await,
        None => McpReply::no_valid_session(None),
    }
}

/// Build the Rocket application for the streamable HTTP binding
pub fn streamable_http_rocket(state: StreamableHttpState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![handle_post, handle_get, handle_delete, preflight])
        .register("/", catchers![internal_error])
        .attach(Cors::streamable_http())
}

/// Run the streamable HTTP binding until a shutdown signal
pub async fn serve(config: &AppConfig, directories: Arc<AllowedDirectories>) -> anyhow::Result<()> {
    if directories.is_empty() {
        info!("Starting Streamable HTTP server (will use MCP roots protocol for directories)");
    } else {
        info!(
            "Starting Streamable HTTP server with allowed directories: {}",
            directories
        );
    }

    let state = StreamableHttpState::new(directories, BindingSettings::from_config(config));
    let sessions = Arc::clone(&state.sessions);
    let rocket = streamable_http_rocket(state).configure(rocket_figment(config));

    info!(
        "Streamable HTTP server listening on {}:{}",
        config.server.bind_address(),
        config.server.port
    );
    launch_with_shutdown(rocket, sessions, "Streamable HTTP").await
}
