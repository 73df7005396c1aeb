//! Request guard for MCP headers

use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::constants::{LAST_EVENT_ID_HEADER, MCP_SESSION_ID_HEADER};

/// MCP-relevant request headers
///
/// Never fails; absent headers are `None`.
#[derive(Debug, Clone, Default)]
pub struct McpHeaders {
    /// `mcp-session-id`
    pub session_id: Option<String>,
    /// `last-event-id`
    pub last_event_id: Option<String>,
    /// Whether `Accept` lists `text/event-stream`
    pub accepts_event_stream: bool,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for McpHeaders {
    type Error = Status;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let headers = request.headers();
        let non_empty = |name: &str| {
            headers
                .get_one(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Outcome::Success(McpHeaders {
            session_id: non_empty(MCP_SESSION_ID_HEADER),
            last_event_id: non_empty(LAST_EVENT_ID_HEADER),
            accepts_event_stream: headers
                .get("Accept")
                .any(|value| value.contains("text/event-stream")),
        })
    }
}
