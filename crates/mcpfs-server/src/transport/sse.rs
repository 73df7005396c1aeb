//! SSE Binding
//!
//! `GET /sse` opens one long-lived event stream per session. Its first event
//! is `endpoint`, carrying the URL the client must POST its messages to:
//! `/message?sessionId=<id>`. Responses to those POSTs, and any
//! server-initiated requests, arrive on the stream as `message` events.
//!
//! The session lives exactly as long as the stream. When the client goes
//! away (or [`close`](SessionTransport::close) ends the stream), the session
//! is removed from the table and the protocol server is cleaned up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream::BoxStream;
use rocket::data::Data;
use rocket::http::Status;
use rocket::response::stream::{Event, EventStream};
use rocket::{Build, FromForm, Rocket, State, catchers, get, post, routes};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use mcpfs_domain::AllowedDirectories;
use mcpfs_infrastructure::config::AppConfig;

use super::cors::{Cors, preflight};
use super::reply::McpReply;
use super::shutdown::launch_with_shutdown;
use super::types::JsonRpcPayload;
use super::{BindingSettings, TransportError, internal_error, read_payload, rocket_figment};
use crate::constants::{
    JSONRPC_INTERNAL_ERROR, JSONRPC_SERVER_ERROR, JSONRPC_SESSION_NOT_FOUND, SSE_MESSAGE_ENDPOINT,
};
use crate::mcp_server::{FilesystemServer, PeerSink};
use crate::session::{SessionTable, SessionTransport};

/// Shared state of the SSE binding
pub struct SseState {
    /// Live sessions
    pub sessions: Arc<SessionTable<SseTransport>>,
    /// Startup allow-list handed to every new protocol server
    pub directories: Arc<AllowedDirectories>,
    /// Binding behaviour
    pub settings: BindingSettings,
}

impl SseState {
    /// Create state with an empty session table
    pub fn new(directories: Arc<AllowedDirectories>, settings: BindingSettings) -> Self {
        Self {
            sessions: Arc::new(SessionTable::new()),
            directories,
            settings,
        }
    }
}

/// `sessionId` query parameter
#[derive(Debug, FromForm)]
pub struct SessionQuery {
    /// Session the request belongs to
    #[field(name = "sessionId")]
    pub session_id: Option<String>,
}

/// One SSE session
pub struct SseTransport {
    session_id: String,
    endpoint: String,
    server: Arc<FilesystemServer>,
    outbound: mpsc::UnboundedSender<Value>,
    dispatch: Mutex<()>,
    cancel: CancellationToken,
    closed: AtomicBool,
}

struct ChannelSink {
    session_id: String,
    outbound: mpsc::UnboundedSender<Value>,
}

impl PeerSink for ChannelSink {
    fn send(&self, message: Value) -> Result<(), TransportError> {
        self.outbound
            .send(message)
            .map_err(|_| TransportError::ChannelClosed {
                session_id: self.session_id.clone(),
            })
    }
}

impl SseTransport {
    /// Create a transport with a fresh session id
    ///
    /// Returns the receiving end of the outbound channel; whoever builds
    /// the event stream consumes it.
    pub fn new(server: Arc<FilesystemServer>) -> (Arc<Self>, mpsc::UnboundedReceiver<Value>) {
        let session_id = Uuid::new_v4().to_string();
        let (outbound, receiver) = mpsc::unbounded_channel();
        server.connect(Arc::new(ChannelSink {
            session_id: session_id.clone(),
            outbound: outbound.clone(),
        }));

        let transport = Arc::new(Self {
            endpoint: format!("{}?sessionId={}", SSE_MESSAGE_ENDPOINT, session_id),
            session_id,
            server,
            outbound,
            dispatch: Mutex::new(()),
            cancel: CancellationToken::new(),
            closed: AtomicBool::new(false),
        });
        (transport, receiver)
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Message endpoint announced in the first event
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether the transport has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Route a POSTed body to the protocol server
    ///
    /// Responses are pushed onto the event stream, not returned.
    pub async fn handle_post_message(&self, payload: JsonRpcPayload) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::AlreadyClosed);
        }

        let _order = self.dispatch.lock().await;
        for message in payload.into_messages() {
            if let Some(response) = self.server.handle_message(message).await {
                self.outbound
                    .send(response.to_value())
                    .map_err(|_| TransportError::ChannelClosed {
                        session_id: self.session_id.clone(),
                    })?;
            }
        }
        Ok(())
    }

    fn event_stream(
        &self,
        mut receiver: mpsc::UnboundedReceiver<Value>,
        guard: SessionGuard,
    ) -> BoxStream<'static, Event> {
        let endpoint = self.endpoint.clone();
        let cancel = self.cancel.clone();

        Box::pin(async_stream::stream! {
            let _guard = guard;
            yield Event::data(endpoint).event("endpoint");
            loop {
                let next = tokio::select! {
                    () = cancel.cancelled() => None,
                    message = receiver.recv() => message,
                };
                match next {
                    Some(message) => yield Event::json(&message).event("message"),
                    None => break,
                }
            }
        })
    }
}

#[async_trait]
impl SessionTransport for SseTransport {
    fn session_id(&self) -> Option<String> {
        Some(self.session_id.clone())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(TransportError::AlreadyClosed);
        }
        self.cancel.cancel();
        Ok(())
    }
}

/// Removes the session once its event stream is dropped
struct SessionGuard {
    sessions: Arc<SessionTable<SseTransport>>,
    transport: Arc<SseTransport>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let session_id = self.transport.id();
        self.transport.closed.store(true, Ordering::SeqCst);
        self.sessions.remove(session_id);
        info!("Client disconnected: {}", session_id);
        self.transport.server.cleanup(session_id);
    }
}

/// Open a new session stream
#[get("/sse?<query..>")]
fn sse_connect(state: &State<SseState>, query: SessionQuery) -> McpReply {
    if let Some(session_id) = query.session_id {
        warn!(
            session_id = %session_id,
            "Client reconnecting with a sessionId; GET /sse does not resume sessions"
        );
        return McpReply::error(
            Status::BadRequest,
            JSONRPC_SERVER_ERROR,
            "Bad Request: GET /sse does not resume sessions; open a new stream without sessionId",
            None,
        );
    }

    let server = Arc::new(FilesystemServer::new(Arc::clone(&state.directories)));
    let (transport, receiver) = SseTransport::new(server);
    if let Err(e) = state.sessions.insert(transport.id(), Arc::clone(&transport)) {
        error!(error = %e, "Failed to register SSE session");
        return McpReply::internal_error(None);
    }
    info!("Client connected: {}", transport.id());

    let guard = SessionGuard {
        sessions: Arc::clone(&state.sessions),
        transport: Arc::clone(&transport),
    };
    let events = transport.event_stream(receiver, guard);
    McpReply::stream(EventStream::from(events).heartbeat(state.settings.keep_alive))
}

/// Client-to-server messages
#[post("/message?<query..>", data = "<body>")]
async fn sse_message(state: &State<SseState>, query: SessionQuery, body: Data<'_>) -> McpReply {
    let Some(session_id) = query.session_id else {
        return McpReply::error(
            Status::BadRequest,
            JSONRPC_SERVER_ERROR,
            "Bad Request: sessionId query parameter is required",
            None,
        );
    };
    let transport = match state.sessions.require(&session_id) {
        Ok(transport) => transport,
        Err(e) => {
            warn!(error = %e, "No transport found for sessionId {}", session_id);
            return McpReply::error(
                Status::NotFound,
                JSONRPC_SESSION_NOT_FOUND,
                format!("Session not found: {}", session_id),
                None,
            );
        }
    };
    debug!("Client message from {}", session_id);

    let payload = match read_payload(body, state.settings.max_body_bytes).await {
        Ok(payload) => payload,
        Err(reply) => return reply,
    };
    let id = payload.first_id();

    match transport.handle_post_message(payload).await {
        Ok(()) => McpReply::empty(Status::Accepted),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to handle SSE message");
            McpReply::error(
                Status::InternalServerError,
                JSONRPC_INTERNAL_ERROR,
                format!("Failed to handle message: {}", e),
                id,
            )
        }
    }
}

/// Build the Rocket application for the SSE binding
pub fn sse_rocket(state: SseState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![sse_connect, sse_message, preflight])
        .register("/", catchers![internal_error])
        .attach(Cors::sse())
}

/// Run the SSE binding until a shutdown signal
pub async fn serve(config: &AppConfig, directories: Arc<AllowedDirectories>) -> anyhow::Result<()> {
    if directories.is_empty() {
        info!("Starting SSE server (will use MCP roots protocol for directories)");
    } else {
        info!("Starting SSE server with allowed directories: {}", directories);
    }

    let state = SseState::new(directories, BindingSettings::from_config(config));
    let sessions = Arc::clone(&state.sessions);
    let rocket = sse_rocket(state).configure(rocket_figment(config));

    info!(
        "SSE server listening on {}:{}",
        config.server.bind_address(),
        config.server.port
    );
    launch_with_shutdown(rocket, sessions, "SSE").await
}
