//! CORS Fairing for Rocket
//!
//! Any origin is allowed. The method list differs per binding, and the
//! MCP headers are exposed so browser clients can read them.

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{Request, Response, options};

use crate::constants::EXPOSED_HEADERS;

/// CORS headers on every response
pub struct Cors {
    allow_methods: &'static str,
    expose_headers: bool,
}

impl Cors {
    /// CORS for the SSE binding
    pub fn sse() -> Self {
        Self {
            allow_methods: "GET, POST",
            expose_headers: false,
        }
    }

    /// CORS for the streamable HTTP binding
    pub fn streamable_http() -> Self {
        Self {
            allow_methods: "GET, POST, DELETE",
            expose_headers: true,
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS Headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            self.allow_methods,
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        if self.expose_headers {
            response.set_header(Header::new(
                "Access-Control-Expose-Headers",
                EXPOSED_HEADERS.join(", "),
            ));
        }
    }
}

/// Preflight requests on any path
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
